// ============================================================
// Layer 4 — Price Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<PriceSample>
// into tensors for the network.
//
// How batching works here:
//   Input:  Vec of N PriceSamples, each with D features
//   Output: PriceBatch with features [N, D] and targets [N, 1]
//
//   We flatten all features into one long Vec, then reshape:
//   [s1_f1, ..., s1_fD, s2_f1, ..., sN_fD] → [N, D]
//
// Why is this easy here?
//   Every sample comes out of the same fitted pipeline, so all
//   feature vectors already have identical length D.
//
// Reference: Burn Book §4 (Batcher)
//            Rust Book §8 (Vectors)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::PriceSample;

// ─── PriceBatch ───────────────────────────────────────────────────────────────
/// A batch of samples ready for the model forward pass.
///
/// B is the Burn Backend (e.g. NdArray, Autodiff<NdArray>) —
/// generic so the same batcher works for training and validation.
#[derive(Debug, Clone)]
pub struct PriceBatch<B: Backend> {
    /// Feature vectors — shape: [batch_size, feature_len]
    pub features: Tensor<B, 2>,

    /// Scaled prices — shape: [batch_size, 1], matching the
    /// network's single output unit for the MSE loss
    pub targets: Tensor<B, 2>,
}

// ─── PriceBatcher ─────────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created in the right place.
#[derive(Clone, Debug)]
pub struct PriceBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> PriceBatcher<B> {
    /// Create a new batcher for the given device
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// This is what makes PriceBatcher work with Burn's DataLoader.
// The DataLoader calls .batch(items) with each mini-batch of samples.
impl<B: Backend> Batcher<PriceSample, PriceBatch<B>> for PriceBatcher<B> {
    /// Convert a Vec of PriceSamples into a single PriceBatch.
    fn batch(&self, items: Vec<PriceSample>) -> PriceBatch<B> {
        let batch_size  = items.len();
        // All feature vectors have the same length (same fitted pipeline)
        let feature_len = items[0].features.len();

        let features_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let targets_flat: Vec<f32> = items.iter().map(|s| s.target).collect();

        let features = Tensor::<B, 1>::from_floats(
            features_flat.as_slice(), &self.device
        ).reshape([batch_size, feature_len]);

        let targets = Tensor::<B, 1>::from_floats(
            targets_flat.as_slice(), &self.device
        ).reshape([batch_size, 1]);

        PriceBatch { features, targets }
    }
}
