// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// Both fitted regressors live here, behind the domain's
// Regressor trait. Burn-specific code is confined to this layer
// (and the data batcher) — no other layer imports from burn.
//
// What's in this layer:
//
//   forest.rs    — Random forest regression ensemble
//                  100 CART trees, variance-minimising splits,
//                  seeded bootstrap sampling, trained on the
//                  raw selling price
//
//   network.rs   — The feed-forward price network
//                  Linear 64 → ReLU → Linear 32 → ReLU → Linear 1,
//                  trained on the standardised price with MSE
//
//   trainer.rs   — The network training loop
//                  Forward pass, loss, backward pass, Adam step,
//                  per-epoch validation MSE
//
//   regressor.rs — Regressor trait implementations for both,
//                  including the target-scaler inverse that only
//                  the network variant owns
//
// Reference: Breiman (2001) Random Forests
//            Kingma & Ba (2015) Adam

/// Random forest regression ensemble
pub mod forest;

/// Feed-forward network architecture
pub mod network;

/// Network training loop with per-epoch validation
pub mod trainer;

/// Regressor trait impls for the two model variants
pub mod regressor;
