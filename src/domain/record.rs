// ============================================================
// Layer 3 — CarRecord Domain Type
// ============================================================
// Represents one car description with the 11 fields the models
// were fitted on: 6 numeric, 5 categorical.
//
// Every field is REQUIRED. A record arriving over any boundary
// (CLI flags, CSV row, JSON) with a field missing fails before
// it ever reaches the models — missing inputs are rejected, not
// silently imputed with training-time statistics.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

use crate::domain::error::ValuationError;

/// Canonical numeric column names, in fitted feature order.
pub const NUMERIC_COLUMNS: [&str; 6] =
    ["year", "km_driven", "seats", "max_power", "Mileage", "Engine"];

/// Canonical categorical column names, in fitted feature order.
pub const CATEGORICAL_COLUMNS: [&str; 5] =
    ["name", "fuel", "seller_type", "transmission", "owner"];

/// A single car to be valued (or a single cleaned training row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarRecord {
    /// Manufacturing year, e.g. 2018
    pub year: i32,

    /// Kilometers driven
    pub km_driven: u32,

    /// Seating capacity (typically 4, 5 or 7)
    pub seats: u32,

    /// Max power in BHP
    pub max_power: f64,

    /// Mileage in kmpl
    pub mileage: f64,

    /// Engine capacity in CC
    pub engine: f64,

    /// Brand name, e.g. "Maruti"
    pub name: String,

    /// Fuel type, e.g. "Petrol"
    pub fuel: String,

    /// Seller category, e.g. "Individual"
    pub seller_type: String,

    /// Transmission type, e.g. "Manual"
    pub transmission: String,

    /// Ownership history, e.g. "First Owner"
    pub owner: String,
}

impl CarRecord {
    /// The 6 numeric values in fitted feature order.
    /// Must stay aligned with NUMERIC_COLUMNS.
    pub fn numeric_values(&self) -> [f64; 6] {
        [
            self.year as f64,
            self.km_driven as f64,
            self.seats as f64,
            self.max_power,
            self.mileage,
            self.engine,
        ]
    }

    /// The 5 categorical values in fitted feature order.
    /// Must stay aligned with CATEGORICAL_COLUMNS.
    pub fn categorical_values(&self) -> [&str; 5] {
        [
            &self.name,
            &self.fuel,
            &self.seller_type,
            &self.transmission,
            &self.owner,
        ]
    }

    /// Reject records that could not have come from a well-formed
    /// request: non-finite numerics or empty categorical strings.
    /// Out-of-range but finite numbers pass — the fitted models
    /// degrade gracefully on them, they do not reject.
    pub fn validate(&self) -> Result<(), ValuationError> {
        for (name, value) in NUMERIC_COLUMNS.iter().zip(self.numeric_values()) {
            if !value.is_finite() {
                return Err(ValuationError::InvalidRecord(format!(
                    "field '{name}' is not a finite number"
                )));
            }
        }
        for (name, value) in CATEGORICAL_COLUMNS.iter().zip(self.categorical_values()) {
            if value.trim().is_empty() {
                return Err(ValuationError::InvalidRecord(format!(
                    "field '{name}' is empty"
                )));
            }
        }
        Ok(())
    }
}

// ─── RawRow ───────────────────────────────────────────────────────────────────
/// One dataset row exactly as observed, before cleaning.
/// Every field is optional: the raw CSV has gaps, and cells that
/// fail to parse are treated the same as absent cells. The cleaner
/// turns a batch of these into complete CarRecords (or drops them).
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub year:          Option<f64>,
    pub km_driven:     Option<f64>,
    pub seats:         Option<f64>,
    pub max_power:     Option<f64>,
    pub mileage:       Option<f64>,
    pub engine:        Option<f64>,
    pub name:          Option<String>,
    pub fuel:          Option<String>,
    pub seller_type:   Option<String>,
    pub transmission:  Option<String>,
    pub owner:         Option<String>,
    pub selling_price: Option<f64>,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CarRecord {
        CarRecord {
            year: 2018,
            km_driven: 45_000,
            seats: 5,
            max_power: 85.0,
            mileage: 18.5,
            engine: 1200.0,
            name: "Maruti".into(),
            fuel: "Petrol".into(),
            seller_type: "Individual".into(),
            transmission: "Manual".into(),
            owner: "First Owner".into(),
        }
    }

    #[test]
    fn test_valid_record_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_nan_numeric_rejected() {
        let mut r = sample();
        r.max_power = f64::NAN;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_empty_categorical_rejected() {
        let mut r = sample();
        r.fuel = "  ".into();
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_feature_order_matches_column_names() {
        // 6 numeric then 5 categorical — the pipeline relies on this order
        assert_eq!(NUMERIC_COLUMNS.len(), sample().numeric_values().len());
        assert_eq!(CATEGORICAL_COLUMNS.len(), sample().categorical_values().len());
        assert_eq!(sample().numeric_values()[0], 2018.0);
        assert_eq!(sample().categorical_values()[0], "Maruti");
    }
}
