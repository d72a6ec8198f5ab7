use std::fmt;

use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::FitError;

use super::{AdamParams, OptimizerKind};

/// Number of coefficients of a quartic: a, b, c, d, e.
pub const COEFFICIENT_COUNT: usize = 5;

/// Coefficients of `a*x^4 + b*x^3 + c*x^2 + d*x + e`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
  pub a: f32,
  pub b: f32,
  pub c: f32,
  pub d: f32,
  pub e: f32,
}

impl Coefficients {
  pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32) -> Self {
    Self { a, b, c, d, e }
  }

  /// Small random start values, each drawn from `[0, 0.001)`.
  pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
    let mut draw = || rng.gen::<f32>() / 1000.0;
    Self::new(draw(), draw(), draw(), draw(), draw())
  }

  pub fn to_array(self) -> [f32; COEFFICIENT_COUNT] {
    [self.a, self.b, self.c, self.d, self.e]
  }

  pub fn from_array([a, b, c, d, e]: [f32; COEFFICIENT_COUNT]) -> Self {
    Self::new(a, b, c, d, e)
  }
}

impl fmt::Display for Coefficients {
  /// Renders `a=.. b=.. c=.. d=.. e=..`, three decimals unless a precision is given.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let precision = f.precision().unwrap_or(3);
    let rendered = ["a", "b", "c", "d", "e"]
      .iter()
      .zip(self.to_array())
      .map(|(name, value)| format!("{name}={value:.precision$}"))
      .join(" ");
    f.write_str(&rendered)
  }
}

/// Ordered (input, output) pairs. Both sides always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Samples {
  xs: Vec<f32>,
  ys: Vec<f32>,
}

impl Samples {
  pub fn new(xs: Vec<f32>, ys: Vec<f32>) -> Result<Self, FitError> {
    if xs.len() != ys.len() {
      return Err(FitError::LengthMismatch {
        inputs: xs.len(),
        outputs: ys.len(),
      });
    }
    Ok(Self { xs, ys })
  }

  pub fn from_pairs(pairs: &[(f32, f32)]) -> Self {
    let (xs, ys) = pairs.iter().copied().unzip();
    Self { xs, ys }
  }

  pub fn xs(&self) -> &[f32] {
    &self.xs
  }

  pub fn ys(&self) -> &[f32] {
    &self.ys
  }

  pub fn len(&self) -> usize {
    self.xs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.xs.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
    self.xs.iter().copied().zip(self.ys.iter().copied())
  }
}

/// Everything the training loop needs besides the samples themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingParams {
  pub iterations: usize,
  pub learning_rate: f32,
  pub optimizer: OptimizerKind,
  pub adam: AdamParams,
  /// Log the smoothed loss every this many iterations (0 disables).
  pub log_every: usize,
  /// Seed for the initial coefficients; random when absent.
  pub seed: Option<u64>,
  /// Min-max scale the inputs into [0, 1] before fitting.
  pub normalize: bool,
}

impl Default for TrainingParams {
  fn default() -> Self {
    Self {
      iterations: 1000,
      learning_rate: 0.001,
      optimizer: OptimizerKind::Adam,
      adam: AdamParams::default(),
      log_every: 100,
      seed: None,
      normalize: false,
    }
  }
}
