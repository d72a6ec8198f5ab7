use std::{error::Error, path::Path};

use polyfit::model::{AdamParams, OptimizerKind, TrainingParams};
use serde::Deserialize;

/// Training settings read from a YAML file.
/// Every field is optional, missing ones fall back to the defaults.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
  pub iterations: Option<usize>,
  pub learning_rate: Option<f32>,
  pub optimizer: Option<OptimizerKind>,
  pub beta1: Option<f32>,
  pub beta2: Option<f32>,
  pub epsilon: Option<f32>,
  /// Log the smoothed loss every this many iterations
  pub log_every: Option<usize>,
  pub seed: Option<u64>,
  pub normalize: Option<bool>,
}

impl AppConfig {
  pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)
      .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
    Ok(serde_yaml::from_str(&content)?)
  }

  // merge configs where the second overwrites the first
  pub fn merge(self, other: Self) -> Self {
    Self {
      iterations: other.iterations.or(self.iterations),
      learning_rate: other.learning_rate.or(self.learning_rate),
      optimizer: other.optimizer.or(self.optimizer),
      beta1: other.beta1.or(self.beta1),
      beta2: other.beta2.or(self.beta2),
      epsilon: other.epsilon.or(self.epsilon),
      log_every: other.log_every.or(self.log_every),
      seed: other.seed.or(self.seed),
      normalize: other.normalize.or(self.normalize),
    }
  }

  pub fn training_params(self) -> TrainingParams {
    let defaults = TrainingParams::default();
    let adam = AdamParams {
      beta1: self.beta1.unwrap_or(defaults.adam.beta1),
      beta2: self.beta2.unwrap_or(defaults.adam.beta2),
      epsilon: self.epsilon.unwrap_or(defaults.adam.epsilon),
    };
    TrainingParams {
      iterations: self.iterations.unwrap_or(defaults.iterations),
      learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
      optimizer: self.optimizer.unwrap_or(defaults.optimizer),
      adam,
      log_every: self.log_every.unwrap_or(defaults.log_every),
      seed: self.seed.or(defaults.seed),
      normalize: self.normalize.unwrap_or(defaults.normalize),
    }
  }
}
