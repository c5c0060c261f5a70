// ============================================================
// Layer 3 — Valuation Errors
// ============================================================
// The typed error contract for a single valuation request.
//
// Three kinds, with different recovery rules:
//   NotConfigured — the artifact bundle never loaded; every
//                   request short-circuits with this until the
//                   operator re-runs training. Not a crash.
//   InvalidRecord — the request itself is malformed. Reported
//                   to the caller, next request unaffected.
//   Transform     — the feature vector failed to align with
//                   the fitted pipeline or model. Reported to
//                   the caller, next request unaffected.
//
// Training-time failures are NOT represented here — they are
// fatal and travel through anyhow out of the train use case.
//
// Reference: Rust Book §9 (Error Handling)

use thiserror::Error;

/// Everything that can go wrong while valuing one record.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// The service started without a complete artifact bundle.
    #[error("valuation service is not configured: {0}")]
    NotConfigured(String),

    /// The submitted record failed validation.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Feature transform or model evaluation failed for this record.
    #[error("feature transform failed: {0}")]
    Transform(String),
}
