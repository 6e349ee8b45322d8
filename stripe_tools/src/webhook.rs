//! `Stripe-Signature` verification.
//!
//! Stripe signs every webhook call with the endpoint's signing secret. The header looks like
//! `t=1492774577,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd`, where `v1` is the hex-encoded
//! HMAC-SHA256 of `"{t}.{raw request body}"`. Several `v1` entries may be present while a secret is being rolled.
//!
//! The signature covers the exact bytes that were sent, so it must be checked against the raw body, before any JSON
//! parsing takes place.
use hmac::{Hmac, Mac};
use log::{debug, trace};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
/// Maximum age, in seconds, of a signed timestamp. This is the default used by Stripe's own libraries.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("The signature header is missing.")]
    MissingHeader,
    #[error("The signature header is malformed. {0}")]
    MalformedHeader(String),
    #[error("The signature header does not contain a v1 signature.")]
    NoSignatures,
    #[error("The signature timestamp is outside the tolerance window.")]
    TimestampOutsideTolerance,
    #[error("No signature matches the expected signature for the payload.")]
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or_else(|| SignatureError::MalformedHeader(format!("'{part}' is not a key=value pair")))?;
        match key {
            "t" => {
                let t = value
                    .parse::<i64>()
                    .map_err(|e| SignatureError::MalformedHeader(format!("Invalid timestamp. {e}")))?;
                timestamp = Some(t);
            },
            "v1" => match hex::decode(value) {
                Ok(sig) => signatures.push(sig),
                Err(e) => debug!("Ignoring undecodable v1 signature. {e}"),
            },
            other => trace!("Ignoring signature scheme '{other}'"),
        }
    }
    let timestamp = timestamp.ok_or_else(|| SignatureError::MalformedHeader("No timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(SignatureError::NoSignatures);
    }
    Ok(SignatureHeader { timestamp, signatures })
}

fn signing_mac(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Computes the hex-encoded `v1` signature for the given payload.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    hex::encode(signing_mac(secret, timestamp, payload).finalize().into_bytes())
}

/// Builds a complete header value. Useful for tests and for replaying events locally.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={timestamp},v1={}", compute_signature(secret, timestamp, payload))
}

/// Verifies `header` against the raw `payload`.
///
/// `now` is the current unix time in seconds. A `tolerance_secs` of zero disables the timestamp check.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    let header = parse_header(header)?;
    let mac = signing_mac(secret, header.timestamp, payload);
    let matched = header.signatures.iter().any(|sig| mac.clone().verify_slice(sig).is_ok());
    if !matched {
        return Err(SignatureError::Mismatch);
    }
    if tolerance_secs > 0 && now.abs_diff(header.timestamp) > tolerance_secs.unsigned_abs() {
        return Err(SignatureError::TimestampOutsideTolerance);
    }
    Ok(())
}
