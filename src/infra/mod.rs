// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles all cross-cutting concerns that don't belong in
// any specific business layer:
//
//   artifact_store.rs — Persisting the fitted artifact bundle
//                       (pipeline, target scaler, forest,
//                       network weights, option vocabulary and
//                       the run configuration). The valuation
//                       service refuses to start without the
//                       complete set.
//
//   metrics.rs        — Training metrics logging
//                       Writes epoch-level MSE to a CSV file
//                       for later analysis and plotting.
//
// Why is this a separate layer?
//   These concerns are used by multiple other layers but
//   don't belong to any one of them. Keeping them here:
//   - Prevents duplication across layers
//   - Makes it easy to swap implementations
//     (e.g. swap file artifacts for S3 object storage)
//   - Keeps other layers focused on their core logic
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Artifact bundle saving and loading
pub mod artifact_store;

/// Training metrics CSV logger
pub mod metrics;
