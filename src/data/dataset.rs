use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One transformed training sample for the network:
/// the fitted-pipeline feature vector and the SCALED price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSample {
    pub features: Vec<f32>,
    pub target:   f32,
}

impl PriceSample {
    pub fn new(features: Vec<f64>, target: f64) -> Self {
        Self {
            features: features.into_iter().map(|x| x as f32).collect(),
            target:   target as f32,
        }
    }
}

pub struct PriceDataset {
    samples: Vec<PriceSample>,
}

impl PriceDataset {
    pub fn new(samples: Vec<PriceSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<PriceSample> for PriceDataset {
    fn get(&self, index: usize) -> Option<PriceSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
