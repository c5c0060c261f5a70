// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `value` and `bulk`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::TrainConfig;
use crate::domain::mode::EngineMode;
use crate::domain::record::CarRecord;

/// The three top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the price models on a car sales CSV dataset
    Train(TrainArgs),

    /// Estimate the selling price of a single car
    Value(ValueArgs),

    /// Estimate selling prices for every row of a CSV file
    Bulk(BulkArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Path to the raw car sales CSV dataset
    #[arg(long, default_value = "car_dataset.csv")]
    pub dataset: String,

    /// Directory to save the fitted artifact bundle
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Fraction of rows used for training (the rest is validation)
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Seed for the train/validation shuffle and the forest bootstrap.
    /// The same seed on the same dataset reproduces the same forest.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of trees in the random forest ensemble
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Maximum depth of each decision tree (unlimited when omitted)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Number of full passes through the training data for the network
    #[arg(long, default_value_t = 15)]
    pub epochs: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate for the network — too high causes instability,
    /// too low causes slow convergence
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset:        a.dataset,
            artifact_dir:   a.artifact_dir,
            train_fraction: a.train_fraction,
            seed:           a.seed,
            trees:          a.trees,
            max_depth:      a.max_depth,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
        }
    }
}

/// Which fitted regressor answers the request.
/// This is the CLI-facing twin of domain::mode::EngineMode —
/// the domain layer never sees clap's ValueEnum.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModelChoice {
    /// Random forest ensemble, trained on the raw price
    Tree,
    /// Feed-forward network, trained on the scaled price
    Neural,
}

impl From<ModelChoice> for EngineMode {
    fn from(c: ModelChoice) -> Self {
        match c {
            ModelChoice::Tree   => EngineMode::TreeEnsemble,
            ModelChoice::Neural => EngineMode::NeuralNetwork,
        }
    }
}

/// All arguments for the `value` command.
/// The defaults mirror a typical mid-range listing so a quick
/// smoke test needs nothing but `autopredict value`.
#[derive(Args, Debug)]
pub struct ValueArgs {
    /// Directory where the artifact bundle was saved during training
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Which fitted regressor to use
    #[arg(long, value_enum, default_value = "tree")]
    pub model: ModelChoice,

    /// Manufacturing year
    #[arg(long, default_value_t = 2018)]
    pub year: i32,

    /// Kilometers driven
    #[arg(long, default_value_t = 45_000)]
    pub km: u32,

    /// Seating capacity
    #[arg(long, default_value_t = 5)]
    pub seats: u32,

    /// Max power in BHP
    #[arg(long, default_value_t = 85.0)]
    pub power: f64,

    /// Mileage in kmpl
    #[arg(long, default_value_t = 18.5)]
    pub mileage: f64,

    /// Engine capacity in CC
    #[arg(long, default_value_t = 1200.0)]
    pub engine: f64,

    /// Brand name (must match the training vocabulary to contribute)
    #[arg(long, default_value = "Maruti")]
    pub brand: String,

    /// Fuel type
    #[arg(long, default_value = "Petrol")]
    pub fuel: String,

    /// Seller category
    #[arg(long, default_value = "Individual")]
    pub seller: String,

    /// Transmission type
    #[arg(long, default_value = "Manual")]
    pub transmission: String,

    /// Ownership history
    #[arg(long, default_value = "First Owner")]
    pub owner: String,
}

impl ValueArgs {
    pub fn mode(&self) -> EngineMode {
        self.model.into()
    }

    /// Assemble the domain record from the individual flags
    pub fn record(&self) -> CarRecord {
        CarRecord {
            year:         self.year,
            km_driven:    self.km,
            seats:        self.seats,
            max_power:    self.power,
            mileage:      self.mileage,
            engine:       self.engine,
            name:         self.brand.clone(),
            fuel:         self.fuel.clone(),
            seller_type:  self.seller.clone(),
            transmission: self.transmission.clone(),
            owner:        self.owner.clone(),
        }
    }
}

/// All arguments for the `bulk` command
#[derive(Args, Debug)]
pub struct BulkArgs {
    /// CSV file of car records (same columns as the training dataset,
    /// price column not required)
    #[arg(long)]
    pub input: String,

    /// Directory where the artifact bundle was saved during training
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Which fitted regressor to use
    #[arg(long, value_enum, default_value = "tree")]
    pub model: ModelChoice,
}

impl BulkArgs {
    pub fn mode(&self) -> EngineMode {
        self.model.into()
    }
}
