// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the raw CSV          (Layer 4 - data)
//   Step 2: Clean / impute the table  (Layer 4 - data)
//   Step 3: Split train/validation    (Layer 4 - data)
//   Step 4: Fit pipeline + scalers    (Layer 4 - data)
//   Step 5: Fit the forest            (Layer 5 - ml)
//   Step 6: Train the network         (Layer 5 - ml)
//   Step 7: Persist the bundle        (Layer 6 - infra)
//
// Every failure in steps 1–6 is fatal and aborts the run with a
// descriptive error. Nothing is written to the artifact
// directory until BOTH models have trained, so a failed run
// never leaves a partial bundle for the valuation service to
// trip over.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::data::{
    cleaner,
    dataset::{PriceDataset, PriceSample},
    loader::CsvLoader,
    preprocessor::{FeaturePipeline, TargetScaler},
    splitter::split_train_val,
};
use crate::domain::record::{CarRecord, CATEGORICAL_COLUMNS};
use crate::domain::traits::RecordSource;
use crate::infra::{artifact_store::ArtifactStore, metrics::MetricsLogger};
use crate::ml::forest::ForestRegressor;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All knobs for a training run.
// Serialisable so it can be saved next to the artifacts for
// traceability of how the bundle was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset:        String,
    pub artifact_dir:   String,
    pub train_fraction: f64,
    pub seed:           u64,
    pub trees:          usize,
    pub max_depth:      Option<usize>,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset:        "car_dataset.csv".to_string(),
            artifact_dir:   "artifacts".to_string(),
            train_fraction: 0.8,
            seed:           42,
            trees:          100,
            max_depth:      None,
            epochs:         15,
            batch_size:     32,
            lr:             1e-3,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load the raw dataset ──────────────────────────────────────
        tracing::info!("Loading dataset '{}'", cfg.dataset);
        let loader = CsvLoader::new(&cfg.dataset);
        let raw_rows = loader.load_all()?;

        // ── Step 2: Clean / impute ────────────────────────────────────────────
        // Median per numeric column, mode for seats, junk rows dropped.
        // Both failures here (empty file, nothing usable) are fatal.
        let table = cleaner::clean(raw_rows)
            .with_context(|| format!("Dataset '{}' is not trainable", cfg.dataset))?;

        // ── Step 3: Train / validation split ──────────────────────────────────
        // Seeded shuffle so the same seed reproduces the same split
        let (train_rows, val_rows) = split_train_val(table.clone(), cfg.train_fraction, cfg.seed);
        if train_rows.is_empty() {
            bail!("training split is empty — dataset too small or train_fraction too low");
        }
        tracing::info!(
            "Split: {} train, {} validation",
            train_rows.len(),
            val_rows.len()
        );

        let train_records: Vec<CarRecord> = train_rows.iter().map(|(r, _)| r.clone()).collect();
        let train_prices:  Vec<f64>       = train_rows.iter().map(|(_, p)| *p).collect();
        let val_records:   Vec<CarRecord> = val_rows.iter().map(|(r, _)| r.clone()).collect();
        let val_prices:    Vec<f64>       = val_rows.iter().map(|(_, p)| *p).collect();

        // ── Step 4: Fit the feature pipeline and target scaler ────────────────
        // Both are fitted on the TRAINING split only. The dropdown
        // options cover the whole cleaned table, so the serving UI
        // can offer every brand the dataset has seen.
        let pipeline = FeaturePipeline::fit(&train_records);
        let y_scaler = TargetScaler::fit(&train_prices);
        let options  = dropdown_options(table.iter().map(|(r, _)| r));
        tracing::info!("Pipeline fitted: {} features", pipeline.feature_len());

        let x_train = pipeline
            .transform_all(&train_records)
            .map_err(|e| anyhow::anyhow!("transforming training rows: {e}"))?;
        let x_val = pipeline
            .transform_all(&val_records)
            .map_err(|e| anyhow::anyhow!("transforming validation rows: {e}"))?;

        // ── Step 5: Fit the forest (raw price target) ─────────────────────────
        tracing::info!("Training random forest ({} trees)", cfg.trees);
        let mut forest = ForestRegressor::new(cfg.trees)
            .with_max_depth(cfg.max_depth)
            .with_seed(cfg.seed);
        forest.fit(&x_train, &train_prices)?;

        if !x_val.is_empty() {
            let preds: Vec<f64> = x_val.iter().map(|row| forest.predict_row(row)).collect();
            tracing::info!("Forest validation RMSE: {:.0}", rmse(&preds, &val_prices));
        }

        // ── Step 6: Train the network (scaled price target) ───────────────────
        let train_dataset = PriceDataset::new(
            x_train
                .iter()
                .zip(&train_prices)
                .map(|(row, &p)| PriceSample::new(row.clone(), y_scaler.transform(p)))
                .collect(),
        );
        let val_dataset = PriceDataset::new(
            x_val
                .iter()
                .zip(&val_prices)
                .map(|(row, &p)| PriceSample::new(row.clone(), y_scaler.transform(p)))
                .collect(),
        );

        tracing::info!("Training network for {} epochs", cfg.epochs);
        let metrics = MetricsLogger::new(&cfg.artifact_dir)?;
        let network = run_training(cfg, pipeline.feature_len(), train_dataset, val_dataset, &metrics)?;

        // ── Step 7: Persist the complete bundle ───────────────────────────────
        // Only reached when both models trained successfully
        let store = ArtifactStore::new(&cfg.artifact_dir);
        store.save_pipeline(&pipeline)?;
        store.save_target_scaler(&y_scaler)?;
        store.save_forest(&forest)?;
        store.save_network(&network)?;
        store.save_options(&options)?;
        store.save_config(cfg)?;
        tracing::info!("Artifact bundle saved to '{}'", cfg.artifact_dir);

        Ok(())
    }
}

/// Sorted distinct values per categorical field, across the whole
/// cleaned table — what a front-end renders as dropdown choices.
fn dropdown_options<'a>(
    records: impl Iterator<Item = &'a CarRecord> + Clone,
) -> BTreeMap<String, Vec<String>> {
    CATEGORICAL_COLUMNS
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let values: BTreeSet<String> = records
                .clone()
                .map(|r| r.categorical_values()[col].to_string())
                .collect();
            (name.to_string(), values.into_iter().collect())
        })
        .collect()
}

/// Root mean squared error in target units.
fn rmse(predictions: &[f64], actual: &[f64]) -> f64 {
    let n = predictions.len().max(1) as f64;
    (predictions
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a) * (p - a))
        .sum::<f64>()
        / n)
        .sqrt()
}
