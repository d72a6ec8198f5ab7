use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Updates parameters in place from their gradients.
pub trait Optimizer {
  fn step(&mut self, params: &mut [f32], grads: &[f32]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
  Adam,
  Sgd,
}

impl OptimizerKind {
  pub fn build(self, learning_rate: f32, adam: AdamParams) -> Box<dyn Optimizer> {
    match self {
      OptimizerKind::Adam => Box::new(Adam::new(learning_rate, adam)),
      OptimizerKind::Sgd => Box::new(Sgd::new(learning_rate)),
    }
  }
}

impl FromStr for OptimizerKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "adam" => Ok(OptimizerKind::Adam),
      "sgd" => Ok(OptimizerKind::Sgd),
      other => Err(format!("unknown optimizer {other:?}, expected adam or sgd")),
    }
  }
}

/// Plain gradient descent.
#[derive(Debug)]
pub struct Sgd {
  learning_rate: f32,
}

impl Sgd {
  pub fn new(learning_rate: f32) -> Self {
    Self { learning_rate }
  }
}

impl Optimizer for Sgd {
  fn step(&mut self, params: &mut [f32], grads: &[f32]) {
    for (p, g) in params.iter_mut().zip(grads) {
      *p -= self.learning_rate * g;
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamParams {
  pub beta1: f32,
  pub beta2: f32,
  pub epsilon: f32,
}

impl Default for AdamParams {
  fn default() -> Self {
    Self {
      beta1: 0.9,
      beta2: 0.999,
      epsilon: 1e-7,
    }
  }
}

/// Adam: per-parameter bias-corrected first and second moment estimates.
#[derive(Debug)]
pub struct Adam {
  learning_rate: f32,
  params: AdamParams,
  // lazily sized on the first step
  first: Vec<ExponentialAverage>,
  second: Vec<ExponentialAverage>,
}

impl Adam {
  pub fn new(learning_rate: f32, params: AdamParams) -> Self {
    Self {
      learning_rate,
      params,
      first: Vec::new(),
      second: Vec::new(),
    }
  }
}

impl Optimizer for Adam {
  fn step(&mut self, params: &mut [f32], grads: &[f32]) {
    if self.first.len() != params.len() {
      self.first = (0..params.len())
        .map(|_| ExponentialAverage::with_beta(self.params.beta1, 0.0))
        .collect();
      self.second = (0..params.len())
        .map(|_| ExponentialAverage::with_beta(self.params.beta2, 0.0))
        .collect();
    }
    for (i, (p, g)) in params.iter_mut().zip(grads).enumerate() {
      self.first[i].update(*g);
      self.second[i].update(g * g);
      let m_hat = self.first[i].value;
      let v_hat = self.second[i].value;
      *p -= self.learning_rate * m_hat / (v_hat.sqrt() + self.params.epsilon);
    }
  }
}

/// Exponential moving average with bias correction.
#[derive(Debug, Clone)]
pub struct ExponentialAverage {
  beta: f32,
  moment: f32,
  pub value: f32,
  t: i32,
}

impl ExponentialAverage {
  pub fn with_beta(beta: f32, initial: f32) -> Self {
    ExponentialAverage {
      beta,
      moment: 0.,
      value: initial,
      t: 0,
    }
  }

  pub fn update(&mut self, value: f32) {
    self.t += 1;
    self.moment = self.beta * self.moment + (1. - self.beta) * value;
    // bias correction
    self.value = self.moment / (1. - f32::powi(self.beta, self.t));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sgd_moves_against_gradient() {
    let mut sgd = Sgd::new(0.1);
    let mut params = [1.0f32, -1.0];
    sgd.step(&mut params, &[2.0, -4.0]);
    assert!((params[0] - 0.8).abs() < 1e-6);
    assert!((params[1] + 0.6).abs() < 1e-6);
  }

  #[test]
  fn adam_first_step_is_learning_rate_sized() {
    let mut adam = Adam::new(0.01, AdamParams::default());
    let mut params = [0.0f32; 3];
    adam.step(&mut params, &[1000.0, -0.5, 0.0]);
    assert!((params[0] + 0.01).abs() < 1e-5);
    assert!((params[1] - 0.01).abs() < 1e-5);
    assert_eq!(params[2], 0.0);
  }

  #[test]
  fn adam_keeps_moving_with_constant_gradient() {
    let mut adam = Adam::new(0.01, AdamParams::default());
    let mut params = [0.0f32];
    for _ in 0..10 {
      adam.step(&mut params, &[3.0]);
    }
    assert!((params[0] + 0.1).abs() < 1e-4);
  }

  #[test]
  fn exponential_average_is_bias_corrected() {
    let mut avg = ExponentialAverage::with_beta(0.999, 1.0);
    assert_eq!(avg.value, 1.0);
    avg.update(4.0);
    assert!((avg.value - 4.0).abs() < 1e-3);
    avg.update(4.0);
    assert!((avg.value - 4.0).abs() < 1e-3);
  }

  #[test]
  fn optimizer_kind_parses_case_insensitively() {
    assert_eq!("Adam".parse::<OptimizerKind>().unwrap(), OptimizerKind::Adam);
    assert_eq!("sgd".parse::<OptimizerKind>().unwrap(), OptimizerKind::Sgd);
    assert!("rmsprop".parse::<OptimizerKind>().is_err());
  }

  #[test]
  fn built_optimizer_steps() {
    let mut optimizer = OptimizerKind::Sgd.build(0.5, AdamParams::default());
    let mut params = [1.0f32];
    optimizer.step(&mut params, &[1.0]);
    assert_eq!(params[0], 0.5);
  }
}
