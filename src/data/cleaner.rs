// ============================================================
// Layer 4 — Cleaner
// ============================================================
// Turns raw rows into a modeling-ready table of complete
// CarRecords plus their prices.
//
// Missing-value policy, applied per column independently:
//   - numeric gaps  → that column's MEDIAN over observed values
//   - seats         → the MODE (it is integer-valued and acts as
//                     a grouping key, so the median of e.g. {5,7}
//                     could invent a 6-seater)
//   - categorical gap or missing price → the row is dropped
//
// All statistics come from the training data being cleaned —
// nothing is re-derived at valuation time. A record arriving at
// the serving side with a gap is rejected there, not imputed.
//
// Reference: Rust Book §8 (Collections)

use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::domain::record::{CarRecord, RawRow};

/// Clean a batch of raw rows into (record, selling_price) pairs.
/// Fatal (training aborts) when no usable row survives — an empty
/// table would make every downstream fit meaningless.
pub fn clean(rows: Vec<RawRow>) -> Result<Vec<(CarRecord, f64)>> {
    if rows.is_empty() {
        bail!("dataset is empty — nothing to train on");
    }

    // Column statistics over the observed (non-missing) values
    let year_med   = median(rows.iter().filter_map(|r| r.year));
    let km_med     = median(rows.iter().filter_map(|r| r.km_driven));
    let power_med  = median(rows.iter().filter_map(|r| r.max_power));
    let mileage_med = median(rows.iter().filter_map(|r| r.mileage));
    let engine_med = median(rows.iter().filter_map(|r| r.engine));
    let seats_mode = mode(rows.iter().filter_map(|r| r.seats.map(|s| s as i64)));

    let total = rows.len();
    let mut dropped = 0usize;
    let mut cleaned = Vec::with_capacity(total);

    for row in rows {
        // A row with no price or no categorical value cannot be
        // repaired — there is no sensible fill for a brand name.
        let (price, name, fuel, seller_type, transmission, owner) = match (
            row.selling_price,
            row.name,
            row.fuel,
            row.seller_type,
            row.transmission,
            row.owner,
        ) {
            (Some(p), Some(n), Some(f), Some(s), Some(t), Some(o)) => (p, n, f, s, t, o),
            _ => {
                dropped += 1;
                continue;
            }
        };

        let record = CarRecord {
            year:         fill(row.year, year_med)? as i32,
            km_driven:    fill(row.km_driven, km_med)? as u32,
            seats:        seats_or_mode(row.seats, seats_mode)?,
            max_power:    fill(row.max_power, power_med)?,
            mileage:      fill(row.mileage, mileage_med)?,
            engine:       fill(row.engine, engine_med)?,
            name,
            fuel,
            seller_type,
            transmission,
            owner,
        };
        cleaned.push((record, price));
    }

    if dropped > 0 {
        tracing::warn!("Dropped {dropped}/{total} rows with missing price or category");
    }
    if cleaned.is_empty() {
        bail!("no usable rows after cleaning ({total} raw rows, all dropped)");
    }

    tracing::info!("Cleaned table: {} rows", cleaned.len());
    Ok(cleaned)
}

/// Use the observed value, or fall back to the column statistic.
/// A non-finite observation counts as missing — a NaN must never
/// reach a fitted model. Errors only when the entire column was
/// empty (no statistic exists).
fn fill(value: Option<f64>, column_median: Option<f64>) -> Result<f64> {
    match value.filter(|v| v.is_finite()).or(column_median) {
        Some(v) => Ok(v),
        None => bail!("a numeric column has no observed values at all"),
    }
}

fn seats_or_mode(value: Option<f64>, column_mode: Option<i64>) -> Result<u32> {
    match value.map(|v| v as i64).or(column_mode) {
        Some(v) => Ok(v as u32),
        None => bail!("the seats column has no observed values at all"),
    }
}

/// Median of the observed values. None for an empty column.
fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut v: Vec<f64> = values.filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some((v[mid - 1] + v[mid]) / 2.0)
    }
}

/// Most frequent value. Ties break toward the smaller value so the
/// result does not depend on hash-map iteration order.
fn mode(values: impl Iterator<Item = i64>) -> Option<i64> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(v, _)| v)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn full_row(price: f64) -> RawRow {
        RawRow {
            year: Some(2018.0),
            km_driven: Some(45_000.0),
            seats: Some(5.0),
            max_power: Some(85.0),
            mileage: Some(18.5),
            engine: Some(1200.0),
            name: Some("Maruti".into()),
            fuel: Some("Petrol".into()),
            seller_type: Some("Individual".into()),
            transmission: Some("Manual".into()),
            owner: Some("First Owner".into()),
            selling_price: Some(price),
        }
    }

    #[test]
    fn test_median_imputation_for_numeric_gap() {
        let mut gap = full_row(300_000.0);
        gap.max_power = None;
        let rows = vec![
            { let mut r = full_row(1.0); r.max_power = Some(60.0); r },
            { let mut r = full_row(2.0); r.max_power = Some(80.0); r },
            { let mut r = full_row(3.0); r.max_power = Some(100.0); r },
            gap,
        ];
        let cleaned = clean(rows).unwrap();
        // median of {60, 80, 100} = 80
        assert_eq!(cleaned[3].0.max_power, 80.0);
    }

    #[test]
    fn test_non_finite_observation_is_imputed_like_a_gap() {
        let mut nan_row = full_row(4.0);
        nan_row.max_power = Some(f64::NAN);
        let rows = vec![
            { let mut r = full_row(1.0); r.max_power = Some(60.0); r },
            { let mut r = full_row(2.0); r.max_power = Some(100.0); r },
            nan_row,
        ];
        let cleaned = clean(rows).unwrap();
        assert_eq!(cleaned[2].0.max_power, 80.0);
        assert!(cleaned.iter().all(|(r, _)| r.validate().is_ok()));
    }

    #[test]
    fn test_mode_imputation_for_seats() {
        let mut gap = full_row(1.0);
        gap.seats = None;
        let rows = vec![
            { let mut r = full_row(1.0); r.seats = Some(7.0); r },
            { let mut r = full_row(1.0); r.seats = Some(5.0); r },
            { let mut r = full_row(1.0); r.seats = Some(5.0); r },
            gap,
        ];
        let cleaned = clean(rows).unwrap();
        assert_eq!(cleaned[3].0.seats, 5);
    }

    #[test]
    fn test_drops_row_without_price() {
        let mut no_price = full_row(1.0);
        no_price.selling_price = None;
        let cleaned = clean(vec![full_row(1.0), no_price]).unwrap();
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn test_drops_row_without_category() {
        let mut no_fuel = full_row(1.0);
        no_fuel.fuel = None;
        let cleaned = clean(vec![full_row(1.0), no_fuel]).unwrap();
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        assert!(clean(Vec::new()).is_err());
    }

    #[test]
    fn test_all_rows_dropped_is_fatal() {
        let mut r = full_row(1.0);
        r.selling_price = None;
        assert!(clean(vec![r]).is_err());
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median([1.0, 2.0, 3.0, 4.0].into_iter()), Some(2.5));
    }
}
