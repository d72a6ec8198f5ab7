use std::path::PathBuf;

use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::{
  data::DataSource,
  model::{
    mean_squared_error, normalize_inputs, predict, Coefficients, InputScaling, OptimizerKind,
    Samples, Trainer, TrainingParams,
  },
  utils::serialize_to_file,
  FitError,
};

/// Everything a plot of the run needs: the samples and both prediction curves.
#[derive(Debug, Serialize)]
pub struct FitReport {
  pub source: String,
  /// Known generating polynomial, in unscaled input units.
  pub reference: Option<Coefficients>,
  /// Set when the inputs were normalized; fitted coefficients then apply to scaled inputs.
  pub scaling: Option<InputScaling>,
  pub optimizer: OptimizerKind,
  pub learning_rate: f32,
  pub iterations: usize,
  pub initial: Coefficients,
  pub trained: Coefficients,
  pub samples: Samples,
  pub predictions_before: Vec<f32>,
  pub predictions_after: Vec<f32>,
  pub loss_before: f32,
  pub loss_after: f32,
  pub losses: Vec<f32>,
}

pub struct Fit {
  source: DataSource,
  params: TrainingParams,
  report_path: Option<PathBuf>,
}

impl Fit {
  pub fn new(source: DataSource, params: TrainingParams, report_path: Option<PathBuf>) -> Self {
    Self {
      source,
      params,
      report_path,
    }
  }

  pub async fn run(self) -> Result<FitReport, FitError> {
    let params = self.params;
    let mut rng = match params.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };

    let samples = self.source.load(&mut rng)?;
    let (samples, scaling) = if params.normalize {
      let (scaled, scaling) = normalize_inputs(&samples)?;
      info!("Inputs scaled from [{}, {}] to [0, 1]", scaling.min, scaling.max);
      (scaled, Some(scaling))
    } else {
      (samples, None)
    };

    let reference = self.source.reference();
    if let Some(reference) = &reference {
      render_coefficients("reference", reference);
    }

    let initial = Coefficients::random(&mut rng);
    render_coefficients("random", &initial);
    let predictions_before = predict(samples.xs(), &initial);
    let loss_before = mean_squared_error(&predictions_before, samples.ys())?;

    let mut trainer = Trainer::new(params.log_every)?;
    let mut optimizer = params.optimizer.build(params.learning_rate, params.adam);
    let mut trained = initial;
    let log = trainer
      .train(&samples, &mut trained, optimizer.as_mut(), params.iterations)
      .await?;

    render_coefficients("trained", &trained);
    let predictions_after = predict(samples.xs(), &trained);
    println!("loss: {loss_before:.4} -> {:.4}", log.final_loss);

    let report = FitReport {
      source: self.source.to_string(),
      reference,
      scaling,
      optimizer: params.optimizer,
      learning_rate: params.learning_rate,
      iterations: params.iterations,
      initial,
      trained,
      samples,
      predictions_before,
      predictions_after,
      loss_before,
      loss_after: log.final_loss,
      losses: log.losses,
    };
    if let Some(path) = &self.report_path {
      serialize_to_file(path, &report)?;
      info!("Report written to {}", path.display());
    }
    Ok(report)
  }
}

pub fn render_coefficients(label: &str, coefficients: &Coefficients) {
  println!("{label:>9}: {coefficients}");
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{data::SENSOR_TABLE, utils};

  fn params(iterations: usize) -> TrainingParams {
    TrainingParams {
      iterations,
      learning_rate: 0.05,
      log_every: 0,
      seed: Some(11),
      ..TrainingParams::default()
    }
  }

  #[tokio::test]
  async fn sensor_fit_without_iterations_keeps_random_coefficients() {
    let _scope = utils::init_logging_tests();
    let report = Fit::new(DataSource::Sensor, params(0), None).run().await.unwrap();
    assert_eq!(report.trained, report.initial);
    assert_eq!(report.predictions_before, report.predictions_after);
    assert_eq!(report.samples.len(), SENSOR_TABLE.len());
    assert!(report.losses.is_empty());
    assert!(report.reference.is_some());
  }

  #[tokio::test]
  async fn synthetic_fit_writes_report() {
    let _scope = utils::init_logging_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let source = DataSource::Synthetic {
      num_points: 40,
      sigma: 0.04,
    };
    let report = Fit::new(source, params(100), Some(path.clone()))
      .run()
      .await
      .unwrap();
    assert!(report.loss_after < report.loss_before);

    let written: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["iterations"], 100);
    assert_eq!(written["optimizer"], "adam");
    assert_eq!(written["samples"]["xs"].as_array().unwrap().len(), 40);
    assert_eq!(written["predictions_after"].as_array().unwrap().len(), 40);
  }

  #[tokio::test]
  async fn same_seed_gives_same_fit() {
    let source = DataSource::Synthetic {
      num_points: 16,
      sigma: 0.1,
    };
    let a = Fit::new(source.clone(), params(10), None).run().await.unwrap();
    let b = Fit::new(source, params(10), None).run().await.unwrap();
    assert_eq!(a.initial, b.initial);
    assert_eq!(a.trained, b.trained);
  }

  #[tokio::test]
  async fn normalized_fit_records_scaling() {
    let fit = Fit::new(
      DataSource::Sensor,
      TrainingParams {
        normalize: true,
        ..params(5)
      },
      None,
    );
    let report = fit.run().await.unwrap();
    let scaling = report.scaling.unwrap();
    assert_eq!((scaling.min, scaling.max), (5.0, 50.0));
    assert!(report.samples.xs().iter().all(|x| (0.0..=1.0).contains(x)));
  }

  #[tokio::test]
  async fn missing_dataset_file_fails() {
    let fit = Fit::new(DataSource::File("/nonexistent/data.txt".into()), params(1), None);
    assert!(matches!(fit.run().await, Err(FitError::Io { .. })));
  }
}
