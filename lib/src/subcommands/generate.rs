use std::path::{Path, PathBuf};

use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::{
  data::{generate_data, TRUE_COEFFICIENTS},
  model::format_dataset,
  FitError,
};

/// Writes a synthetic dataset that `fit --data` can read back.
pub struct Generate {
  output_path: PathBuf,
  num_points: usize,
  sigma: f32,
  seed: Option<u64>,
}

impl Generate {
  pub fn new(output_path: &Path, num_points: usize, sigma: f32, seed: Option<u64>) -> Self {
    Self {
      output_path: PathBuf::from(output_path),
      num_points,
      sigma,
      seed,
    }
  }

  pub fn run(self) -> Result<(), FitError> {
    let mut rng = match self.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    let samples = generate_data(self.num_points, &TRUE_COEFFICIENTS, self.sigma, &mut rng);
    let content = format!("# x y, generated from {TRUE_COEFFICIENTS}\n{}", format_dataset(&samples));
    std::fs::write(&self.output_path, content).map_err(|source| FitError::Io {
      path: self.output_path.clone(),
      source,
    })?;
    info!("Wrote {} samples to {}", samples.len(), self.output_path.display());
    Ok(())
  }
}
