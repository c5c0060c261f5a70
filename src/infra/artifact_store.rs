// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Saves and restores the fitted artifact bundle — the boundary
// between the offline training pipeline and the valuation
// service.
//
// Files in the artifact directory:
//   preprocessor.json  — fitted feature pipeline (means/stds +
//                        one-hot vocabularies)
//   y_scaler.json      — fitted target scaler over the price
//   rf_model.json      — the serialised forest
//   dl_model.mpk       — network weights via Burn's named
//                        MessagePack file recorder
//   options.json       — field → sorted distinct values, for
//                        front-ends that need dropdown choices
//   train_config.json  — the run configuration, for traceability
//
// Why save the pipeline separately from the models?
//   The models only understand vectors the EXACT fitted pipeline
//   produces. Persisting them together, and loading all-or-none,
//   is what keeps feature alignment correct at serving time.
//
// Burn's NamedMpkFileRecorder<FullPrecisionSettings>:
//   - Serialises model parameters to MessagePack format
//   - Full precision: a save/load round trip reproduces the
//     forward pass bit for bit, so serving estimates match the
//     training-time validation numbers
//   - Type-safe: loading fails if the architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::preprocessor::{FeaturePipeline, TargetScaler};
use crate::ml::forest::ForestRegressor;
use crate::ml::network::{PriceNet, PriceNetConfig};

const PREPROCESSOR_FILE: &str = "preprocessor.json";
const SCALER_FILE:       &str = "y_scaler.json";
const FOREST_FILE:       &str = "rf_model.json";
const NETWORK_FILE:      &str = "dl_model";
/// NamedMpkFileRecorder appends this to NETWORK_FILE on save.
const WEIGHTS_EXTENSION: &str = "mpk";
const OPTIONS_FILE:      &str = "options.json";
const CONFIG_FILE:       &str = "train_config.json";

/// Manages saving and loading of the fitted artifact bundle.
/// All files are stored in the configured directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a new ArtifactStore.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        // create_dir_all creates parent directories too, like `mkdir -p`
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Names of required artifacts that are not on disk.
    /// Empty means the bundle is complete and loadable.
    pub fn missing_artifacts(&self) -> Vec<&'static str> {
        // Probe the file name the recorder actually writes —
        // it appends its own extension to NETWORK_FILE
        let mut weights = self.dir.join(NETWORK_FILE);
        weights.set_extension(WEIGHTS_EXTENSION);

        let mut missing = Vec::new();
        for (name, path) in [
            (PREPROCESSOR_FILE, self.dir.join(PREPROCESSOR_FILE)),
            (SCALER_FILE,       self.dir.join(SCALER_FILE)),
            (FOREST_FILE,       self.dir.join(FOREST_FILE)),
            ("dl_model.mpk",    weights),
            (OPTIONS_FILE,      self.dir.join(OPTIONS_FILE)),
        ] {
            if !path.exists() {
                missing.push(name);
            }
        }
        missing
    }

    // ── Feature pipeline ──────────────────────────────────────────────────────

    pub fn save_pipeline(&self, pipeline: &FeaturePipeline) -> Result<()> {
        self.write_json(PREPROCESSOR_FILE, pipeline)
    }

    pub fn load_pipeline(&self) -> Result<FeaturePipeline> {
        self.read_json(PREPROCESSOR_FILE)
    }

    // ── Target scaler ─────────────────────────────────────────────────────────

    pub fn save_target_scaler(&self, scaler: &TargetScaler) -> Result<()> {
        self.write_json(SCALER_FILE, scaler)
    }

    pub fn load_target_scaler(&self) -> Result<TargetScaler> {
        self.read_json(SCALER_FILE)
    }

    // ── Forest ────────────────────────────────────────────────────────────────

    pub fn save_forest(&self, forest: &ForestRegressor) -> Result<()> {
        self.write_json(FOREST_FILE, forest)
    }

    pub fn load_forest(&self) -> Result<ForestRegressor> {
        self.read_json(FOREST_FILE)
    }

    // ── Network weights ───────────────────────────────────────────────────────

    /// Save the network weights in full precision, so the restored
    /// model's forward pass is identical to the trained one. The
    /// recorder appends its own .mpk extension to the path.
    pub fn save_network<B: Backend>(&self, net: &PriceNet<B>) -> Result<()> {
        let path = self.dir.join(NETWORK_FILE);
        NamedMpkFileRecorder::<FullPrecisionSettings>::new()
            .record(net.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save network weights to '{}'", path.display()))?;
        tracing::debug!("Saved network weights");
        Ok(())
    }

    /// Rebuild the architecture for the pipeline's feature width,
    /// then restore the saved weights into it. Loading fails if the
    /// saved record disagrees with the architecture.
    pub fn load_network<B: Backend>(
        &self,
        input_dim: usize,
        device: &B::Device,
    ) -> Result<PriceNet<B>> {
        let path  = self.dir.join(NETWORK_FILE);
        let model = PriceNetConfig::for_features(input_dim).init(device);

        let record = NamedMpkFileRecorder::<FullPrecisionSettings>::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load network weights '{}'. Have you trained the models first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    // ── Vocabulary / options ──────────────────────────────────────────────────

    pub fn save_options(&self, options: &BTreeMap<String, Vec<String>>) -> Result<()> {
        self.write_json(OPTIONS_FILE, options)
    }

    pub fn load_options(&self) -> Result<BTreeMap<String, Vec<String>>> {
        self.read_json(OPTIONS_FILE)
    }

    // ── Training configuration ────────────────────────────────────────────────

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(CONFIG_FILE)
    }

    // ── JSON helpers ──────────────────────────────────────────────────────────

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        // serde_json::to_string_pretty adds indentation for readability
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Artifact '{}' is corrupted", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::CarRecord;

    fn record(brand: &str) -> CarRecord {
        CarRecord {
            year: 2018,
            km_driven: 45_000,
            seats: 5,
            max_power: 85.0,
            mileage: 18.5,
            engine: 1200.0,
            name: brand.into(),
            fuel: "Petrol".into(),
            seller_type: "Individual".into(),
            transmission: "Manual".into(),
            owner: "First Owner".into(),
        }
    }

    #[test]
    fn test_missing_artifacts_on_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().to_str().unwrap());
        assert_eq!(store.missing_artifacts().len(), 5);
    }

    #[test]
    fn test_pipeline_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().to_str().unwrap());

        let pipeline = FeaturePipeline::fit(&[record("Maruti"), record("Honda")]);
        store.save_pipeline(&pipeline).unwrap();

        let restored = store.load_pipeline().unwrap();
        let r = record("Maruti");
        assert_eq!(pipeline.transform(&r).unwrap(), restored.transform(&r).unwrap());
    }

    #[test]
    fn test_scaler_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().to_str().unwrap());

        let scaler = TargetScaler::fit(&[100_000.0, 400_000.0]);
        store.save_target_scaler(&scaler).unwrap();

        let restored = store.load_target_scaler().unwrap();
        assert_eq!(scaler.transform(250_000.0), restored.transform(250_000.0));
    }

    #[test]
    fn test_load_from_empty_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().to_str().unwrap());
        assert!(store.load_pipeline().is_err());
        assert!(store.load_forest().is_err());
    }

    #[test]
    fn test_saved_network_satisfies_the_missing_probe() {
        type B = burn::backend::NdArray;

        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().to_str().unwrap());
        let device = Default::default();

        let net: PriceNet<B> = PriceNetConfig::for_features(5).init(&device);
        store.save_network(&net).unwrap();

        // The probe must look for the file the recorder wrote —
        // a fresh save may not leave the weights reported missing
        assert!(tmp.path().join("dl_model.mpk").exists());
        assert!(!store.missing_artifacts().contains(&"dl_model.mpk"));
    }

    #[test]
    fn test_network_weights_round_trip() {
        type B = burn::backend::NdArray;

        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().to_str().unwrap());
        let device = Default::default();

        let net: PriceNet<B> = PriceNetConfig::for_features(7).init(&device);
        store.save_network(&net).unwrap();

        let restored: PriceNet<B> = store.load_network(7, &device).unwrap();

        let input = Tensor::<B, 1>::from_floats([0.3f32; 7].as_slice(), &device)
            .reshape([1, 7]);
        let a: f32 = net.forward(input.clone()).into_scalar().elem();
        let b: f32 = restored.forward(input).into_scalar().elem();
        // Full-precision storage: the restored forward pass is exact,
        // not merely close
        assert_eq!(a, b);
    }
}
