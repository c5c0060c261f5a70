// ============================================================
// Layer 5 — Price Network
// ============================================================
// The neural half of the ensemble pair: a small feed-forward
// regression head over the fitted feature vector.
//
//   features [batch, D]
//     → Linear(D, 64) → ReLU
//     → Linear(64, 32) → ReLU
//     → Linear(32, 1)             (linear output, no activation)
//
// The network trains against the STANDARDISED price (via the
// target scaler) with MSE loss. Weight initialisation is random
// and run-to-run weight determinism is not a goal — the fixed
// architecture and the scaled-target contract are.

use burn::{
    nn::{
        loss::{MseLoss, Reduction},
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct PriceNetConfig {
    /// Width of the input layer — the fitted pipeline's feature_len.
    /// Everything downstream of the pipeline depends on this number,
    /// which is why the pipeline artifact is loaded before the weights.
    pub input_dim: usize,
    pub hidden1:   usize,
    pub hidden2:   usize,
}

impl PriceNetConfig {
    /// The fixed serving architecture: 64- and 32-wide hidden layers.
    pub fn for_features(input_dim: usize) -> Self {
        Self::new(input_dim, 64, 32)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> PriceNet<B> {
        PriceNet {
            fc1: LinearConfig::new(self.input_dim, self.hidden1).init(device),
            fc2: LinearConfig::new(self.hidden1, self.hidden2).init(device),
            out: LinearConfig::new(self.hidden2, 1).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct PriceNet<B: Backend> {
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    pub out: Linear<B>,
}

impl<B: Backend> PriceNet<B> {
    /// features: [batch, input_dim] → scaled-price predictions: [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = burn::tensor::activation::relu(self.fc1.forward(features));
        let x = burn::tensor::activation::relu(self.fc2.forward(x));
        self.out.forward(x)
    }

    /// Forward pass plus MSE against the scaled targets.
    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        targets:  Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>)
    where
        B: AutodiffBackend,
    {
        let output = self.forward(features);
        let loss = MseLoss::new().forward(output.clone(), targets, Reduction::Mean);
        (loss, output)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_forward_shape_and_finiteness() {
        let device = Default::default();
        let net: PriceNet<TestBackend> = PriceNetConfig::for_features(13).init(&device);

        let features = Tensor::<TestBackend, 1>::from_floats(
            [0.5f32; 26].as_slice(), &device,
        ).reshape([2, 13]);

        let out = net.forward(features);
        assert_eq!(out.dims(), [2, 1]);

        let values: Vec<f32> = out.into_data().to_vec().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_config_fixes_hidden_widths() {
        let cfg = PriceNetConfig::for_features(20);
        assert_eq!((cfg.input_dim, cfg.hidden1, cfg.hidden2), (20, 64, 32));
    }
}
