// ============================================================
// Layer 3 — Engine Mode
// ============================================================
// The caller picks which fitted regressor answers the request.
// Exactly two variants exist, and the difference in output
// handling (the neural path de-scales its prediction) lives
// with the regressor implementations, not with string matching
// on a display label.

use serde::{Deserialize, Serialize};

/// Which fitted regressor produces the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineMode {
    /// Averaging ensemble of decision trees, trained on the raw price.
    /// Its output is already in currency units.
    TreeEnsemble,

    /// Feed-forward network, trained on the standardised price.
    /// Its output must be inverse-transformed by the target scaler.
    NeuralNetwork,
}

impl std::fmt::Display for EngineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineMode::TreeEnsemble  => write!(f, "tree"),
            EngineMode::NeuralNetwork => write!(f, "neural"),
        }
    }
}
