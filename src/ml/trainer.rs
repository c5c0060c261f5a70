// ============================================================
// Layer 5 — Network Training Loop
// ============================================================
// Full train + validation loop for the price network using
// Burn's DataLoader and Adam.
//
// Backend split:
//   - Training uses MyBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on MyInnerBackend (NdArray)
//   - Validation batcher must also use MyInnerBackend
//
// The loop only LOGS — persistence is the caller's job, and it
// happens once at the end of the whole pipeline so a failed run
// never leaves a partial artifact bundle behind.
//
// Reference: Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::PriceBatcher, dataset::PriceDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::network::{PriceNet, PriceNetConfig};

type MyBackend      = burn::backend::Autodiff<burn::backend::NdArray>;
type MyInnerBackend = burn::backend::NdArray;

/// Train the network on the SCALED target and return the fitted
/// model on the inference backend.
pub fn run_training(
    cfg:           &TrainConfig,
    input_dim:     usize,
    train_dataset: PriceDataset,
    val_dataset:   PriceDataset,
    metrics:       &MetricsLogger,
) -> Result<PriceNet<MyInnerBackend>> {
    let device = <MyInnerBackend as Backend>::Device::default();

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = PriceNetConfig::for_features(input_dim);
    let mut model: PriceNet<MyBackend> = model_cfg.init(&device);
    tracing::info!(
        "Network ready: {} → {} → {} → 1",
        input_dim, model_cfg.hidden1, model_cfg.hidden2,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = PriceBatcher::<MyBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = PriceBatcher::<MyInnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.features, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → PriceNet<MyInnerBackend>
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;

        for batch in val_loader.iter() {
            let output = model_valid.forward(batch.features);
            let batch_loss: f64 = MseLoss::new()
                .forward(output, batch.targets, Reduction::Mean)
                .into_scalar()
                .elem::<f64>();
            val_loss_sum += batch_loss;
            val_batches  += 1;
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };

        println!(
            "Epoch {:>3}/{} | train_mse={:.4} | val_mse={:.4}",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss,
        );

        metrics.log(&EpochMetrics::new(epoch, avg_train_loss, avg_val_loss))?;
    }

    tracing::info!("Network training complete");
    Ok(model.valid())
}
