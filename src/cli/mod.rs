// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train` — fits the preprocessor and both regressors on a CSV dataset
//   2. `value` — loads the artifact bundle and prices a single car
//   3. `bulk`  — prices every row of a CSV of car records
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TrainArgs, ValueArgs, BulkArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "autopredict",
    version = "0.1.0",
    about = "Train car-price models on a CSV dataset, then estimate selling prices."
)]
pub struct Cli {
    /// The subcommand to run (train, value or bulk)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => Self::run_train(args),
            Commands::Value(args) => Self::run_value(args),
            Commands::Bulk(args)  => Self::run_bulk(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on dataset: {}", args.dataset);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Artifact bundle saved.");
        Ok(())
    }

    /// Handles the `value` subcommand.
    /// Builds one CarRecord from the flags and prints the estimate.
    fn run_value(args: ValueArgs) -> Result<()> {
        use crate::application::value_use_case::ValueUseCase;

        let mode    = args.mode();
        let record  = args.record();
        let service = ValueUseCase::new(args.artifact_dir.clone());

        match service.estimate(&record, mode) {
            Ok(price) => println!("\nEstimated valuation: ₹ {:.2}", price),
            Err(e)    => println!("\nValuation failed: {e}"),
        }
        Ok(())
    }

    /// Handles the `bulk` subcommand.
    /// Prices every record in the input CSV, one line of output per row.
    /// A failed row is reported and skipped — it never aborts the run.
    fn run_bulk(args: BulkArgs) -> Result<()> {
        use crate::application::value_use_case::ValueUseCase;
        use crate::data::loader::read_record_csv;

        let mode    = args.mode();
        let records = read_record_csv(&args.input)?;
        let service = ValueUseCase::new(args.artifact_dir.clone());

        tracing::info!("Bulk valuation of {} records", records.len());

        let mut priced = 0usize;
        for (row, result) in service.estimate_batch(&records, mode).iter().enumerate() {
            match result {
                Ok(price) => {
                    priced += 1;
                    println!("row {:>4}: ₹ {:.2}", row + 1, price);
                }
                Err(e) => println!("row {:>4}: failed ({e})", row + 1),
            }
        }

        println!("Priced {priced}/{} records.", records.len());
        Ok(())
    }
}
