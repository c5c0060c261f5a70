// ============================================================
// Layer 5 — Regressor Implementations
// ============================================================
// The two concrete types behind the domain Regressor trait.
// The caller dispatches on EngineMode and never needs to know
// which side applies the target-scaler inverse:
//
//   ForestRegressor  → trees average raw rupee values, the
//                      prediction is returned as-is.
//   NetworkRegressor → the net was trained on the scaled price,
//                      so the inverse transform is part of THIS
//                      type, not a step the caller remembers.
//
// Both reject feature vectors whose length disagrees with what
// was fitted — a shape mismatch is a per-request Transform
// error, never a panic.

use burn::prelude::*;

use crate::data::preprocessor::TargetScaler;
use crate::domain::error::ValuationError;
use crate::domain::traits::Regressor;
use crate::ml::forest::ForestRegressor;
use crate::ml::network::PriceNet;

type InferBackend = burn::backend::NdArray;

impl Regressor for ForestRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64, ValuationError> {
        if !self.is_fitted() {
            return Err(ValuationError::Transform("forest is not fitted".into()));
        }
        if features.len() != self.feature_len() {
            return Err(ValuationError::Transform(format!(
                "forest was fitted on {} features, got {}",
                self.feature_len(),
                features.len()
            )));
        }
        Ok(self.predict_row(features))
    }
}

/// The neural variant: fitted network + the target scaler whose
/// inverse maps the scaled output back to rupees.
pub struct NetworkRegressor {
    net:       PriceNet<InferBackend>,
    scaler:    TargetScaler,
    input_dim: usize,
    device:    <InferBackend as Backend>::Device,
}

impl NetworkRegressor {
    pub fn new(net: PriceNet<InferBackend>, scaler: TargetScaler, input_dim: usize) -> Self {
        Self {
            net,
            scaler,
            input_dim,
            device: Default::default(),
        }
    }
}

impl Regressor for NetworkRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64, ValuationError> {
        if features.len() != self.input_dim {
            return Err(ValuationError::Transform(format!(
                "network was fitted on {} features, got {}",
                self.input_dim,
                features.len()
            )));
        }

        let row: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let input = Tensor::<InferBackend, 1>::from_floats(row.as_slice(), &self.device)
            .reshape([1, self.input_dim]);

        let scaled: f64 = self.net.forward(input).into_scalar().elem::<f64>();
        if !scaled.is_finite() {
            return Err(ValuationError::Transform(
                "network produced a non-finite output".into(),
            ));
        }

        // De-scale to rupees; a below-zero extrapolation is reported
        // as a zero valuation rather than a negative price
        Ok(self.scaler.inverse(scaled).max(0.0))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::network::PriceNetConfig;

    #[test]
    fn test_forest_rejects_wrong_arity() {
        let mut forest = ForestRegressor::new(3).with_seed(1);
        forest
            .fit(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 2.0]], &[1.0, 2.0, 3.0])
            .unwrap();
        assert!(forest.predict(&[0.5]).is_err());
        assert!(forest.predict(&[0.5, 0.5]).is_ok());
    }

    #[test]
    fn test_unfitted_forest_is_a_transform_error() {
        let forest = ForestRegressor::new(3);
        assert!(matches!(
            forest.predict(&[0.5]),
            Err(ValuationError::Transform(_))
        ));
    }

    #[test]
    fn test_network_regressor_is_finite_and_non_negative() {
        let device = Default::default();
        let net = PriceNetConfig::for_features(4).init(&device);
        let scaler = TargetScaler::fit(&[100_000.0, 300_000.0, 900_000.0]);
        let reg = NetworkRegressor::new(net, scaler, 4);

        let price = reg.predict(&[0.1, -0.3, 0.7, 0.0]).unwrap();
        assert!(price.is_finite());
        assert!(price >= 0.0);
    }

    #[test]
    fn test_network_rejects_wrong_arity() {
        let device = Default::default();
        let net = PriceNetConfig::for_features(4).init(&device);
        let scaler = TargetScaler::fit(&[1.0, 2.0]);
        let reg = NetworkRegressor::new(net, scaler, 4);
        assert!(matches!(
            reg.predict(&[0.1, 0.2]),
            Err(ValuationError::Transform(_))
        ));
    }
}
