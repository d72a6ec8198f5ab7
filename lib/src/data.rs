//! Where samples come from: the built-in sensor table, a synthetic quartic
//! with Gaussian noise, or a dataset file.

use std::{fmt, path::PathBuf};

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::{
  model::{read_dataset, Coefficients, Samples},
  FitError,
};

/// Coefficients the synthetic samples are generated from.
pub const TRUE_COEFFICIENTS: Coefficients = Coefficients::new(-0.1, 0.9, 0.1, 0.5, 0.4);

/// Quartic the sensor was calibrated against, displacement over DSPA reading.
pub const SENSOR_REFERENCE: Coefficients =
  Coefficients::new(0.000_034_564_44, -0.003_700_521, 0.114_982, -0.899_711_4, 4.127_081);

/// (DSPA reading, displacement) pairs recorded from the displacement sensor.
pub const SENSOR_TABLE: &[(f32, f32)] = &[
  (5.0, 2.04),
  (6.5, 2.22),
  (8.0, 2.52),
  (9.5, 3.04),
  (11.0, 3.65),
  (12.5, 4.45),
  (14.0, 5.33),
  (15.5, 6.05),
  (17.0, 6.85),
  (18.5, 7.47),
  (20.0, 8.08),
  (21.5, 8.56),
  (23.0, 8.77),
  (24.5, 9.20),
  (26.0, 9.26),
  (27.5, 9.19),
  (29.0, 8.79),
  (30.5, 8.43),
  (32.0, 7.99),
  (33.5, 7.40),
  (35.0, 6.72),
  (36.5, 5.87),
  (38.0, 5.03),
  (39.5, 4.02),
  (41.0, 3.18),
  (42.5, 2.30),
  (44.0, 1.42),
  (45.5, 0.93),
  (47.0, 0.34),
  (48.5, 0.13),
  (50.0, 0.01),
];

pub fn sensor_samples() -> Samples {
  Samples::from_pairs(SENSOR_TABLE)
}

/// `num_points` inputs uniform in [-1, 1), outputs from `coefficients` plus
/// Gaussian noise with standard deviation `sigma`.
pub fn generate_data<R: Rng + ?Sized>(
  num_points: usize,
  coefficients: &Coefficients,
  sigma: f32,
  rng: &mut R,
) -> Samples {
  // a non-positive or non-finite sigma means noiseless samples
  let noise = Normal::new(0.0, sigma).ok().filter(|_| sigma > 0.0);
  let pairs: Vec<(f32, f32)> = (0..num_points)
    .map(|_| {
      let x = rng.gen_range(-1.0f32..1.0);
      let y = coefficients.evaluate(x) + noise.map_or(0.0, |n| n.sample(rng));
      (x, y)
    })
    .collect();
  Samples::from_pairs(&pairs)
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
  Sensor,
  Synthetic { num_points: usize, sigma: f32 },
  File(PathBuf),
}

impl DataSource {
  pub fn load<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Samples, FitError> {
    let samples = match self {
      DataSource::Sensor => sensor_samples(),
      DataSource::Synthetic { num_points, sigma } => {
        generate_data(*num_points, &TRUE_COEFFICIENTS, *sigma, rng)
      }
      DataSource::File(path) => read_dataset(path)?,
    };
    info!("Loaded {} samples from {}", samples.len(), self);
    Ok(samples)
  }

  /// The polynomial the samples are known to follow, if any.
  pub fn reference(&self) -> Option<Coefficients> {
    match self {
      DataSource::Sensor => Some(SENSOR_REFERENCE),
      DataSource::Synthetic { .. } => Some(TRUE_COEFFICIENTS),
      DataSource::File(_) => None,
    }
  }
}

impl fmt::Display for DataSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DataSource::Sensor => write!(f, "sensor table"),
      DataSource::Synthetic { num_points, sigma } => {
        write!(f, "synthetic quartic ({num_points} points, sigma {sigma})")
      }
      DataSource::File(path) => write!(f, "{}", path.display()),
    }
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::model::{mean_squared_error, predict};

  #[test]
  fn sensor_table_follows_reference_quartic() {
    let samples = sensor_samples();
    assert_eq!(samples.len(), SENSOR_TABLE.len());
    let loss = mean_squared_error(&predict(samples.xs(), &SENSOR_REFERENCE), samples.ys()).unwrap();
    assert!(loss < 0.05, "reference loss {loss}");
  }

  #[test]
  fn synthetic_data_is_reproducible_from_seed() {
    let a = generate_data(20, &TRUE_COEFFICIENTS, 0.04, &mut StdRng::seed_from_u64(3));
    let b = generate_data(20, &TRUE_COEFFICIENTS, 0.04, &mut StdRng::seed_from_u64(3));
    assert_eq!(a, b);
    assert_eq!(a.len(), 20);
    assert!(a.xs().iter().all(|x| (-1.0..1.0).contains(x)));
  }

  #[test]
  fn noiseless_synthetic_data_lies_on_the_curve() {
    let samples = generate_data(10, &TRUE_COEFFICIENTS, 0.0, &mut StdRng::seed_from_u64(5));
    for (x, y) in samples.iter() {
      assert_eq!(y, TRUE_COEFFICIENTS.evaluate(x));
    }
  }

  #[test]
  fn sources_know_their_reference() {
    assert_eq!(DataSource::Sensor.reference(), Some(SENSOR_REFERENCE));
    assert_eq!(DataSource::File("x.txt".into()).reference(), None);
  }
}
