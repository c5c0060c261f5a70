// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records network training metrics to a CSV file after each epoch.
//
// Why log metrics to CSV?
//   - Easy to open in a spreadsheet
//   - Can plot learning curves to diagnose training issues
//   - Provides a permanent record of each training run
//
// Metrics recorded per epoch:
//   - epoch:     the epoch number (1, 2, 3, ...)
//   - train_mse: average MSE on the scaled target, training set
//   - val_mse:   average MSE on the scaled target, validation set
//
// Output file: artifacts/metrics.csv
//
// How to read the metrics:
//   - MSE should decrease each epoch (model is learning)
//   - If val_mse rises while train_mse falls → overfitting
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average MSE over all training batches, on the scaled target
    pub train_mse: f64,

    /// Average MSE on the validation set.
    /// Should track train_mse — divergence indicates overfitting
    pub val_mse: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_mse: f64, val_mse: f64) -> Self {
        Self { epoch, train_mse, val_mse }
    }

    /// Returns true if this epoch improved over the previous best val_mse
    pub fn is_improvement(&self, best_val_mse: f64) -> bool {
        self.val_mse < best_val_mse
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger, starting a fresh CSV.
    /// One file describes one training run — a leftover log from a
    /// previous run into the same directory is truncated, so epoch
    /// rows from different runs never interleave.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        let mut f = fs::File::create(&csv_path)?;
        writeln!(f, "epoch,train_mse,val_mse")?;
        tracing::debug!("Started metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        // Append mode — rows accumulate below this run's header
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(f, "{},{:.6},{:.6}", m.epoch, m.train_mse, m.val_mse)?;

        tracing::debug!(
            "Logged epoch {} metrics: train_mse={:.4}, val_mse={:.4}",
            m.epoch,
            m.train_mse,
            m.val_mse,
        );

        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
