// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Loads the raw car sales dataset using the csv crate.
//
// The raw file is messy in three ways we normalise here:
//   1. Column names embed units — "max_power (in bph)" and
//      "Engine (CC)" become the canonical max_power / Engine.
//   2. Two artifact columns may or may not be present:
//      "Unnamed: 0" (a leaked row index) and "Mileage Unit".
//      Both are ignored, and their absence is not an error.
//   3. Cells can be empty, unparseable or a literal NaN/inf.
//      Any of these becomes None and the cleaner decides what
//      to do with it.
//
// Columns are addressed BY HEADER NAME, never by position, so
// reordered exports load identically.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::domain::record::{CarRecord, RawRow};
use crate::domain::traits::RecordSource;

/// Loads raw rows from a car sales CSV file.
/// Implements the RecordSource trait from Layer 3.
pub struct CsvLoader {
    /// Path to the CSV file
    path: String,
}

impl CsvLoader {
    /// Create a new CsvLoader pointed at a file
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<RawRow>> {
        let mut reader = csv::Reader::from_path(Path::new(&self.path))
            .with_context(|| format!("Cannot open dataset '{}'", self.path))?;

        // Map each canonical column name to its position in this file
        let headers = reader
            .headers()
            .with_context(|| format!("Cannot read CSV header of '{}'", self.path))?
            .clone();

        let mut columns: HashMap<&'static str, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(name) = canonical_header(header) {
                columns.insert(name, idx);
            }
        }

        let mut rows = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = result
                .with_context(|| format!("Malformed CSV row {} in '{}'", line + 2, self.path))?;

            let text = |col: &str| -> Option<String> {
                columns.get(col).and_then(|&i| {
                    let cell = record.get(i)?.trim();
                    if cell.is_empty() { None } else { Some(cell.to_string()) }
                })
            };
            // "NaN"/"inf" parse successfully but are not usable
            // observations — treat them as missing like any other
            // unparseable cell
            let number = |col: &str| -> Option<f64> {
                text(col)
                    .and_then(|s| s.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
            };

            rows.push(RawRow {
                year:          number("year"),
                km_driven:     number("km_driven"),
                seats:         number("seats"),
                max_power:     number("max_power"),
                mileage:       number("Mileage"),
                engine:        number("Engine"),
                name:          text("name"),
                fuel:          text("fuel"),
                seller_type:   text("seller_type"),
                transmission:  text("transmission"),
                owner:         text("owner"),
                selling_price: number("selling_price"),
            });
        }

        tracing::info!("Loaded {} raw rows from '{}'", rows.len(), self.path);
        Ok(rows)
    }
}

/// Map a raw CSV header to its canonical column name.
/// Returns None for columns we deliberately ignore.
fn canonical_header(header: &str) -> Option<&'static str> {
    match header.trim() {
        "year"                            => Some("year"),
        "km_driven"                       => Some("km_driven"),
        "seats"                           => Some("seats"),
        "max_power" | "max_power (in bph)" => Some("max_power"),
        "Mileage"                         => Some("Mileage"),
        "Engine" | "Engine (CC)"          => Some("Engine"),
        "name"                            => Some("name"),
        "fuel"                            => Some("fuel"),
        "seller_type"                     => Some("seller_type"),
        "transmission"                    => Some("transmission"),
        "owner"                           => Some("owner"),
        "selling_price"                   => Some("selling_price"),
        // Row-index artifact and units column — dropped on sight
        "Unnamed: 0" | "Mileage Unit"     => None,
        _                                 => None,
    }
}

/// Read a CSV of complete car records for bulk valuation.
/// Rows with a missing or unparseable required field are skipped
/// with a warning — one bad row never aborts the whole batch.
pub fn read_record_csv(path: &str) -> Result<Vec<CarRecord>> {
    let loader = CsvLoader::new(path);
    let raw = loader.load_all()?;

    let total = raw.len();
    let records: Vec<CarRecord> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| match complete_record(row) {
            Some(record) => Some(record),
            None => {
                tracing::warn!("Skipping row {}: required field missing", i + 2);
                None
            }
        })
        .collect();

    tracing::info!("Parsed {}/{} complete records from '{}'", records.len(), total, path);
    Ok(records)
}

/// A RawRow becomes a CarRecord only if every model field is present.
fn complete_record(row: RawRow) -> Option<CarRecord> {
    Some(CarRecord {
        year:         row.year? as i32,
        km_driven:    row.km_driven? as u32,
        seats:        row.seats? as u32,
        max_power:    row.max_power?,
        mileage:      row.mileage?,
        engine:       row.engine?,
        name:         row.name?,
        fuel:         row.fuel?,
        seller_type:  row.seller_type?,
        transmission: row.transmission?,
        owner:        row.owner?,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_renames_unit_columns() {
        let f = write_csv(
            "name,year,selling_price,km_driven,fuel,seller_type,transmission,owner,Mileage,Engine (CC),max_power (in bph),seats\n\
             Maruti,2018,450000,45000,Petrol,Individual,Manual,First Owner,18.5,1200,85.0,5\n",
        );
        let rows = CsvLoader::new(f.path().to_str().unwrap()).load_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].max_power, Some(85.0));
        assert_eq!(rows[0].engine, Some(1200.0));
    }

    #[test]
    fn test_tolerates_missing_artifact_columns() {
        // No "Unnamed: 0" or "Mileage Unit" — must load without error
        let f = write_csv(
            "name,year,selling_price,km_driven,fuel,seller_type,transmission,owner,Mileage,Engine,max_power,seats\n\
             Honda,2016,350000,60000,Diesel,Dealer,Manual,Second Owner,22.0,1500,98.6,5\n",
        );
        let rows = CsvLoader::new(f.path().to_str().unwrap()).load_all().unwrap();
        assert_eq!(rows[0].name.as_deref(), Some("Honda"));
        assert_eq!(rows[0].selling_price, Some(350000.0));
    }

    #[test]
    fn test_blank_and_bad_cells_become_none() {
        let f = write_csv(
            "name,year,selling_price,km_driven,fuel,seller_type,transmission,owner,Mileage,Engine,max_power,seats\n\
             Maruti,2018,450000,45000,Petrol,Individual,Manual,First Owner,,1200,n/a,5\n",
        );
        let rows = CsvLoader::new(f.path().to_str().unwrap()).load_all().unwrap();
        assert_eq!(rows[0].mileage, None);
        assert_eq!(rows[0].max_power, None);
    }

    #[test]
    fn test_non_finite_cells_become_none() {
        // A literal NaN parses as a valid f64 — it must still be
        // treated as missing so it gets imputed, never fitted on
        let f = write_csv(
            "name,year,selling_price,km_driven,fuel,seller_type,transmission,owner,Mileage,Engine,max_power,seats\n\
             Maruti,2018,450000,45000,Petrol,Individual,Manual,First Owner,NaN,inf,85.0,5\n",
        );
        let rows = CsvLoader::new(f.path().to_str().unwrap()).load_all().unwrap();
        assert_eq!(rows[0].mileage, None);
        assert_eq!(rows[0].engine, None);
        assert_eq!(rows[0].max_power, Some(85.0));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = CsvLoader::new("/no/such/file.csv").load_all();
        assert!(result.is_err());
    }

    #[test]
    fn test_bulk_reader_skips_incomplete_rows() {
        let f = write_csv(
            "name,year,km_driven,fuel,seller_type,transmission,owner,Mileage,Engine,max_power,seats\n\
             Maruti,2018,45000,Petrol,Individual,Manual,First Owner,18.5,1200,85.0,5\n\
             Honda,,60000,Diesel,Dealer,Manual,Second Owner,22.0,1500,98.6,5\n",
        );
        let records = read_record_csv(f.path().to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Maruti");
    }
}
