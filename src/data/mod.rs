// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw CSV file
// all the way to model-ready feature vectors and batches.
//
// The pipeline flows in this order:
//
//   car_dataset.csv
//       │
//       ▼
//   CsvLoader         → reads rows, canonicalises column names
//       │
//       ▼
//   Cleaner           → imputes gaps (median/mode), drops junk rows
//       │
//       ▼
//   FeaturePipeline   → standardises numerics, one-hot encodes
//       │                categoricals against the fitted vocabulary
//       ▼
//   PriceDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   PriceBatcher      → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the network training loop
//
// The forest branches off after FeaturePipeline — it consumes the
// plain feature matrix and never touches tensors.
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads the raw car sales CSV using the csv crate
pub mod loader;

/// Fills gaps and drops unusable rows (training-time statistics only)
pub mod cleaner;

/// The fitted feature pipeline and target scaler
pub mod preprocessor;

/// Shuffles and splits data into train/validation sets
pub mod splitter;

/// Implements Burn's Dataset trait for price samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
