use std::collections::HashMap;

use log::warn;

/// Stripe rejects metadata values longer than this many characters.
pub const METADATA_VALUE_LIMIT: usize = 500;
/// Stripe allows 50 metadata keys per object. A few are kept free for correlation ids.
pub const MAX_METADATA_PARTS: usize = 45;

/// Splits a value into metadata entries that each fit Stripe's length limit.
///
/// A short value is stored under `key` as is. A longer one is cut into `{key}_0`, `{key}_1`, ... on character
/// boundaries. Values that would need more than [`MAX_METADATA_PARTS`] entries are omitted.
pub fn split_metadata_value(key: &str, value: &str) -> Vec<(String, String)> {
    let chars = value.chars().collect::<Vec<char>>();
    if chars.len() <= METADATA_VALUE_LIMIT {
        return vec![(key.to_string(), value.to_string())];
    }
    let parts = chars.chunks(METADATA_VALUE_LIMIT).collect::<Vec<_>>();
    if parts.len() > MAX_METADATA_PARTS {
        warn!(
            "Metadata value '{key}' is {} characters long and would need {} entries. Omitting it.",
            chars.len(),
            parts.len()
        );
        return Vec::new();
    }
    parts.iter().enumerate().map(|(i, part)| (format!("{key}_{i}"), part.iter().collect())).collect()
}

/// The inverse of [`split_metadata_value`]. Returns `None` if neither `key` nor `{key}_0` is present.
pub fn join_metadata_value(metadata: &HashMap<String, String>, key: &str) -> Option<String> {
    if let Some(value) = metadata.get(key) {
        return Some(value.clone());
    }
    let mut joined = metadata.get(&format!("{key}_0"))?.clone();
    let rest = (1..).map_while(|i| metadata.get(&format!("{key}_{i}")));
    rest.for_each(|part| joined.push_str(part));
    Some(joined)
}

/// Extracts the human-readable message from a Stripe error response body, falling back to the raw body.
pub fn stripe_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}
