// ============================================================
// Layer 4 — Feature Pipeline
// ============================================================
// The fitted, deterministic transform from a CarRecord to the
// fixed-length feature vector both regressors consume.
//
// Layout of the output vector (order fixed by fit order, and
// identical between training and valuation):
//
//   [ 6 standardised numerics | one-hot block per categorical ]
//     year, km_driven, seats,   name, fuel, seller_type,
//     max_power, mileage,       transmission, owner
//     engine
//
// Two invariants the whole system rests on:
//   1. Determinism — the same record always produces the same
//      vector, bit for bit. fit() sorts every vocabulary, so
//      fitting the same table twice yields identical pipelines.
//   2. Unknown-category tolerance — a value never seen at fit
//      time encodes as an all-zero block for that column. This
//      is an explicit lookup-miss branch, not a library flag,
//      because brand lists grow over time and a new brand must
//      degrade gracefully rather than fail.
//
// Reference: Rust Book §8 (Collections)

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::error::ValuationError;
use crate::domain::record::{CarRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};

// ─── NumericStats ─────────────────────────────────────────────────────────────
/// Fitted mean/std for one numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericStats {
    pub name: String,
    pub mean: f64,
    pub std:  f64,
}

// ─── CategoryBlock ────────────────────────────────────────────────────────────
/// Fitted vocabulary for one categorical column.
/// `values` is sorted, and each value owns one slot of the
/// block in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBlock {
    pub name:   String,
    pub values: Vec<String>,
}

// ─── FeaturePipeline ──────────────────────────────────────────────────────────
/// Fitted column transformer: per-numeric standardisation followed
/// by per-categorical one-hot expansion. Stateless at use time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePipeline {
    numeric:     Vec<NumericStats>,
    categorical: Vec<CategoryBlock>,
}

impl FeaturePipeline {
    /// Fit the pipeline on a training table.
    /// Pure function of its input: no randomness, no I/O.
    pub fn fit(records: &[CarRecord]) -> Self {
        let n = records.len().max(1) as f64;

        // Mean and (population) standard deviation per numeric column
        let mut numeric = Vec::with_capacity(NUMERIC_COLUMNS.len());
        for (col, name) in NUMERIC_COLUMNS.iter().enumerate() {
            let mean = records.iter().map(|r| r.numeric_values()[col]).sum::<f64>() / n;
            let var = records
                .iter()
                .map(|r| {
                    let d = r.numeric_values()[col] - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            let std = var.sqrt();
            numeric.push(NumericStats {
                name: name.to_string(),
                mean,
                // A constant column would divide by zero — scale by 1 instead
                std: if std > 0.0 { std } else { 1.0 },
            });
        }

        // Sorted distinct values per categorical column
        let mut categorical = Vec::with_capacity(CATEGORICAL_COLUMNS.len());
        for (col, name) in CATEGORICAL_COLUMNS.iter().enumerate() {
            let values: BTreeSet<String> = records
                .iter()
                .map(|r| r.categorical_values()[col].to_string())
                .collect();
            categorical.push(CategoryBlock {
                name:   name.to_string(),
                values: values.into_iter().collect(),
            });
        }

        Self { numeric, categorical }
    }

    /// Total length of the output feature vector.
    pub fn feature_len(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|b| b.values.len()).sum::<usize>()
    }

    /// Transform one record into its feature vector.
    pub fn transform(&self, record: &CarRecord) -> Result<Vec<f64>, ValuationError> {
        let numerics = record.numeric_values();
        if numerics.len() != self.numeric.len() {
            return Err(ValuationError::Transform(format!(
                "expected {} numeric fields, got {}",
                self.numeric.len(),
                numerics.len()
            )));
        }

        let mut out = Vec::with_capacity(self.feature_len());

        for (stats, value) in self.numeric.iter().zip(numerics) {
            out.push((value - stats.mean) / stats.std);
        }

        let categories = record.categorical_values();
        for (block, value) in self.categorical.iter().zip(categories) {
            // Explicit unknown-category branch: a lookup miss leaves
            // the whole block at zero instead of failing the request.
            let hit = block.values.binary_search_by(|v| v.as_str().cmp(value)).ok();
            for slot in 0..block.values.len() {
                out.push(if hit == Some(slot) { 1.0 } else { 0.0 });
            }
        }

        Ok(out)
    }

    /// Transform a whole table — one feature row per record.
    pub fn transform_all(&self, records: &[CarRecord]) -> Result<Vec<Vec<f64>>, ValuationError> {
        records.iter().map(|r| self.transform(r)).collect()
    }

    /// The fitted vocabulary, field name → sorted distinct values.
    pub fn vocabulary(&self) -> BTreeMap<String, Vec<String>> {
        self.categorical
            .iter()
            .map(|b| (b.name.clone(), b.values.clone()))
            .collect()
    }
}

// ─── TargetScaler ─────────────────────────────────────────────────────────────
/// Fitted standardisation over the training selling price.
/// Only the network trains on the scaled target; its output is
/// mapped back to rupees through inverse(). The forest never
/// touches this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetScaler {
    mean: f64,
    std:  f64,
}

impl TargetScaler {
    pub fn fit(prices: &[f64]) -> Self {
        let n = prices.len().max(1) as f64;
        let mean = prices.iter().sum::<f64>() / n;
        let var = prices.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / n;
        let std = var.sqrt();
        Self {
            mean,
            std: if std > 0.0 { std } else { 1.0 },
        }
    }

    pub fn transform(&self, price: f64) -> f64 {
        (price - self.mean) / self.std
    }

    pub fn inverse(&self, scaled: f64) -> f64 {
        scaled * self.std + self.mean
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, power: f64, brand: &str, fuel: &str) -> CarRecord {
        CarRecord {
            year,
            km_driven: 45_000,
            seats: 5,
            max_power: power,
            mileage: 18.5,
            engine: 1200.0,
            name: brand.into(),
            fuel: fuel.into(),
            seller_type: "Individual".into(),
            transmission: "Manual".into(),
            owner: "First Owner".into(),
        }
    }

    fn fitted() -> FeaturePipeline {
        FeaturePipeline::fit(&[
            record(2016, 60.0, "Maruti", "Petrol"),
            record(2018, 85.0, "Honda", "Diesel"),
            record(2020, 110.0, "Tata", "Petrol"),
        ])
    }

    #[test]
    fn test_feature_len_counts_all_blocks() {
        let p = fitted();
        // 6 numerics + 3 brands + 2 fuels + 1 seller + 1 transmission + 1 owner
        assert_eq!(p.feature_len(), 6 + 3 + 2 + 1 + 1 + 1);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let p = fitted();
        let r = record(2018, 85.0, "Honda", "Diesel");
        let a = p.transform(&r).unwrap();
        let b = p.transform(&r).unwrap();
        // Byte-for-byte identical output for identical input
        assert_eq!(a, b);
        assert_eq!(a.len(), p.feature_len());
    }

    #[test]
    fn test_fitting_twice_gives_identical_pipelines() {
        let a = fitted();
        let b = fitted();
        let r = record(2017, 70.0, "Maruti", "Petrol");
        assert_eq!(a.transform(&r).unwrap(), b.transform(&r).unwrap());
    }

    #[test]
    fn test_unknown_category_encodes_as_zero_block() {
        let p = fitted();
        let r = record(2018, 85.0, "Ferrari", "Petrol");
        let v = p.transform(&r).unwrap();
        // Brand block occupies slots 6..9 (sorted: Honda, Maruti, Tata)
        assert_eq!(&v[6..9], &[0.0, 0.0, 0.0]);
        // The rest of the vector is still valid — fuel block intact
        assert_eq!(v.len(), p.feature_len());
        assert!(v[9..11].contains(&1.0));
    }

    #[test]
    fn test_known_category_sets_exactly_one_slot() {
        let p = fitted();
        let v = p.transform(&record(2018, 85.0, "Maruti", "Petrol")).unwrap();
        // Sorted brands: Honda, Maruti, Tata → Maruti is slot 1 of the block
        assert_eq!(&v[6..9], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_standardisation_centres_the_mean() {
        let p = fitted();
        // year=2018 is the column mean → standardised to exactly 0
        let v = p.transform(&record(2018, 85.0, "Honda", "Diesel")).unwrap();
        assert!(v[0].abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_does_not_divide_by_zero() {
        let p = fitted();
        // All fitted rows share mileage=18.5 → std clamps to 1.0
        let v = p.transform(&record(2018, 85.0, "Honda", "Diesel")).unwrap();
        assert!(v.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let vocab = fitted().vocabulary();
        assert_eq!(vocab["name"], vec!["Honda", "Maruti", "Tata"]);
        assert_eq!(vocab["fuel"], vec!["Diesel", "Petrol"]);
    }

    #[test]
    fn test_target_scaler_round_trip() {
        let s = TargetScaler::fit(&[100_000.0, 250_000.0, 480_000.0, 1_200_000.0]);
        for price in [55_000.0, 333_333.33, 2_000_000.0] {
            let back = s.inverse(s.transform(price));
            assert!((back - price).abs() / price < 1e-6);
        }
    }

    #[test]
    fn test_target_scaler_constant_prices() {
        let s = TargetScaler::fit(&[500_000.0, 500_000.0]);
        assert_eq!(s.inverse(s.transform(500_000.0)), 500_000.0);
    }
}
