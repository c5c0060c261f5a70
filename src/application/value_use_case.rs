// ============================================================
// Layer 2 — Value Use Case (Valuation Service)
// ============================================================
// The online half of the system. Loads the persisted artifact
// bundle ONCE at construction and serves any number of
// independent estimate calls against it.
//
// The service has exactly two operational states:
//
//   Unready — one or more artifacts missing or unreadable.
//             Every estimate call short-circuits with a
//             NotConfigured error. The process does not crash;
//             the operator re-runs `train` and restarts.
//   Ready   — the complete bundle is in memory. There is no way
//             back to Unready: artifacts are never reloaded or
//             invalidated at runtime.
//
// A failed estimate never poisons the service: the bundle is
// read-only after load and no call mutates anything, so the next
// request always sees the same fitted state.

use std::collections::BTreeMap;

use crate::data::preprocessor::{FeaturePipeline, TargetScaler};
use crate::domain::error::ValuationError;
use crate::domain::mode::EngineMode;
use crate::domain::record::CarRecord;
use crate::domain::traits::Regressor;
use crate::infra::artifact_store::ArtifactStore;
use crate::ml::forest::ForestRegressor;
use crate::ml::regressor::NetworkRegressor;

// ─── ModelBundle ──────────────────────────────────────────────────────────────
/// Everything the service needs to price a car, fitted together
/// from the same training split and immutable after load.
pub struct ModelBundle {
    pub pipeline: FeaturePipeline,
    pub forest:   ForestRegressor,
    pub network:  NetworkRegressor,
    /// Field → sorted distinct values seen in training, for
    /// front-ends that present dropdown choices
    pub options:  BTreeMap<String, Vec<String>>,
}

// ─── ServiceState ─────────────────────────────────────────────────────────────
enum ServiceState {
    /// Load failed — the reason is repeated in every error
    Unready(String),
    /// Complete bundle loaded; boxed because the bundle is large
    Ready(Box<ModelBundle>),
}

// ─── ValueUseCase ─────────────────────────────────────────────────────────────
pub struct ValueUseCase {
    state: ServiceState,
}

impl ValueUseCase {
    /// Build the service, attempting the one-time bundle load.
    /// Construction itself never fails — an incomplete bundle
    /// yields an Unready service, not an error.
    pub fn new(artifact_dir: String) -> Self {
        let store = ArtifactStore::new(artifact_dir.clone());

        let missing = store.missing_artifacts();
        if !missing.is_empty() {
            let reason = format!(
                "artifacts missing from '{}': {} — run 'train' first",
                artifact_dir,
                missing.join(", ")
            );
            tracing::warn!("{reason}");
            return Self { state: ServiceState::Unready(reason) };
        }

        match Self::load_bundle(&store) {
            Ok(bundle) => {
                tracing::info!(
                    "Valuation service ready: {} features, {} brands",
                    bundle.pipeline.feature_len(),
                    bundle.options.get("name").map_or(0, |v| v.len()),
                );
                Self { state: ServiceState::Ready(Box::new(bundle)) }
            }
            Err(e) => {
                let reason = format!("artifact bundle failed to load: {e:#}");
                tracing::warn!("{reason}");
                Self { state: ServiceState::Unready(reason) }
            }
        }
    }

    /// All five artifacts, or no service at all — a bundle that
    /// half-loads would serve misaligned features silently.
    fn load_bundle(store: &ArtifactStore) -> anyhow::Result<ModelBundle> {
        let pipeline = store.load_pipeline()?;
        let y_scaler: TargetScaler = store.load_target_scaler()?;
        let forest   = store.load_forest()?;
        let options  = store.load_options()?;

        let device = Default::default();
        let net = store.load_network(pipeline.feature_len(), &device)?;
        let network = NetworkRegressor::new(net, y_scaler, pipeline.feature_len());

        Ok(ModelBundle { pipeline, forest, network, options })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ServiceState::Ready(_))
    }

    /// The vocabulary of a categorical field, for presentation
    /// layers. None when the service is Unready.
    pub fn options_for(&self, field: &str) -> Option<&[String]> {
        match &self.state {
            ServiceState::Ready(bundle) => bundle.options.get(field).map(|v| v.as_slice()),
            ServiceState::Unready(_) => None,
        }
    }

    /// Price one car with the selected regressor.
    ///
    /// Steps:
    ///   1. Short-circuit when Unready
    ///   2. Validate the record (missing/garbage fields rejected)
    ///   3. Transform through the fitted pipeline
    ///   4. Dispatch to the regressor for the mode — the neural
    ///      variant de-scales internally
    ///
    /// Every error is per-request: the caller gets a ValuationError
    /// and the service is untouched for the next call.
    pub fn estimate(&self, record: &CarRecord, mode: EngineMode) -> Result<f64, ValuationError> {
        let bundle = match &self.state {
            ServiceState::Ready(bundle) => bundle,
            ServiceState::Unready(reason) => {
                return Err(ValuationError::NotConfigured(reason.clone()))
            }
        };

        record.validate()?;
        let features = bundle.pipeline.transform(record)?;

        let regressor: &dyn Regressor = match mode {
            EngineMode::TreeEnsemble  => &bundle.forest,
            EngineMode::NeuralNetwork => &bundle.network,
        };
        let price = regressor.predict(&features)?;

        tracing::debug!("Estimated {price:.2} for '{}' via {mode}", record.name);
        Ok(price)
    }

    /// Price many cars independently. Each row gets its own result;
    /// a failed row never affects its neighbours, and rows have no
    /// ordering dependency between them.
    pub fn estimate_batch(
        &self,
        records: &[CarRecord],
        mode: EngineMode,
    ) -> Vec<Result<f64, ValuationError>> {
        records.iter().map(|r| self.estimate(r, mode)).collect()
    }
}
