//! Host-side evaluation of the quartic and its loss.
//!
//! The training graph computes the same thing as a dot product of
//! [`features`] with the coefficient tensor, these functions are used for
//! reporting predictions and for the final loss.

use crate::FitError;

use super::{Coefficients, COEFFICIENT_COUNT};

impl Coefficients {
  pub fn evaluate(&self, x: f32) -> f32 {
    self.a * x.powi(4) + self.b * x.powi(3) + self.c * x.powi(2) + self.d * x + self.e
  }
}

/// One row of the design matrix: `[x^4, x^3, x^2, x, 1]`.
pub fn features(x: f32) -> [f32; COEFFICIENT_COUNT] {
  [x.powi(4), x.powi(3), x.powi(2), x, 1.0]
}

pub fn predict(xs: &[f32], coefficients: &Coefficients) -> Vec<f32> {
  xs.iter().map(|x| coefficients.evaluate(*x)).collect()
}

/// Mean of squared differences. An empty batch gives NaN.
pub fn mean_squared_error(predictions: &[f32], labels: &[f32]) -> Result<f32, FitError> {
  if predictions.len() != labels.len() {
    return Err(FitError::LengthMismatch {
      inputs: predictions.len(),
      outputs: labels.len(),
    });
  }
  let sum: f32 = predictions
    .iter()
    .zip(labels)
    .map(|(p, y)| (p - y).powi(2))
    .sum();
  Ok(sum / predictions.len() as f32)
}
