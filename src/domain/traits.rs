// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits are Rust's way of defining shared behaviour —
// similar to interfaces in Java or abstract classes in Python.
//
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - ForestRegressor and NetworkRegressor both implement Regressor
//   - The valuation use case only sees Regressor and dispatches
//     on EngineMode without knowing forest from network
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use crate::domain::error::ValuationError;
use crate::domain::record::RawRow;

// ─── Regressor ────────────────────────────────────────────────────────────────
/// Any fitted model that maps a feature vector to one price.
///
/// Implementations:
///   - ForestRegressor  → averages its trees, output already in rupees
///   - NetworkRegressor → forward pass + target-scaler inverse
///
/// The caller never applies the target scaler itself: whether an
/// inverse transform is needed is a property of the implementation.
pub trait Regressor {
    /// Predict one price from one fitted-pipeline feature vector.
    fn predict(&self, features: &[f64]) -> Result<f64, ValuationError>;
}

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can load raw training rows from a source.
///
/// Implementations:
///   - CsvLoader → reads the car sales CSV from disk
///   - (future) a database- or API-backed source
pub trait RecordSource {
    /// Load all available raw rows from this source.
    fn load_all(&self) -> anyhow::Result<Vec<RawRow>>;
}
