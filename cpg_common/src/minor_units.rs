use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

/// The number of minor units in one major unit. Only two-decimal currencies are supported.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

//--------------------------------------     MinorUnits       ---------------------------------------------------------
/// An exact monetary amount, expressed in the smallest denomination of its currency (e.g. cents).
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct MinorUnits(i64);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Value cannot be represented in minor units: {0}")]
pub struct MinorUnitsConversionError(String);

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for MinorUnits {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for MinorUnits {}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_major = MINOR_UNITS_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per_major, abs % per_major)
    }
}

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts a major-unit amount (e.g. `4.20` euros) into minor units, rounding to the nearest minor unit.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn from_major(major: f64) -> Result<Self, MinorUnitsConversionError> {
        if !major.is_finite() {
            return Err(MinorUnitsConversionError(format!("{major} is not a finite number")));
        }
        let scaled = (major * MINOR_UNITS_PER_MAJOR as f64).round();
        if scaled >= i64::MAX as f64 || scaled <= i64::MIN as f64 {
            return Err(MinorUnitsConversionError(format!("{major} is out of range")));
        }
        Ok(Self(scaled as i64))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}
