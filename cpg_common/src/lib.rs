pub mod helpers;
mod minor_units;
mod secret;

pub use minor_units::{MinorUnits, MinorUnitsConversionError, MINOR_UNITS_PER_MAJOR};
pub use secret::Secret;
