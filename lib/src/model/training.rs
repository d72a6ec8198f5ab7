use luminal::prelude::*;
use luminal_training::{mse_loss, Autograd};
use tracing::{debug, info};

use crate::FitError;

use super::{
  features, mean_squared_error, predict, Coefficients, ExponentialAverage, Optimizer,
  Samples, TensorScope, COEFFICIENT_COUNT,
};

/// Loss history of one training run.
#[derive(Debug, Clone, Default)]
pub struct TrainingLog {
  /// Mean loss over the samples, measured before each optimizer step.
  pub losses: Vec<f32>,
  /// Mean loss after the last step.
  pub final_loss: f32,
}

/// The quartic as a luminal graph: one feature row `[x^4, x^3, x^2, x, 1]`
/// times a 5x1 coefficient tensor, with the squared error against the target
/// and its gradient with respect to the coefficients.
///
/// The graph works on a single sample. A training iteration executes it once
/// per sample and averages the gradients, which is the gradient of the mean
/// squared error over the whole set.
pub struct Trainer {
  // boxed: graph tensors hold a pointer to the graph, it must not move
  cx: Box<Graph>,
  input: GraphTensor<R1<COEFFICIENT_COUNT>>,
  target: GraphTensor<R1<1>>,
  weights: NodeIndex,
  output_id: NodeIndex,
  loss_id: NodeIndex,
  grad_id: NodeIndex,
  log_every: usize,
}

impl Trainer {
  pub fn new(log_every: usize) -> Result<Self, FitError> {
    let mut cx = Box::new(Graph::new());
    let coefficients = cx.tensor::<R2<COEFFICIENT_COUNT, 1>>();
    let input = cx.tensor::<R1<COEFFICIENT_COUNT>>();
    let output = input.matmul(coefficients).retrieve();

    let target = cx.tensor::<R1<1>>();
    let loss = mse_loss(output, target).retrieve();
    let weights = vec![coefficients.id];

    let grads = cx.compile(Autograd::new(&weights, loss), ());
    let grad_ids: Vec<NodeIndex> = grads.iter().map(|(id, _)| *id).collect();
    let grad_id = *grad_ids
      .first()
      .ok_or_else(|| FitError::MissingTensor("gradient".to_string()))?;
    cx.keep_tensors(&grad_ids);
    cx.keep_tensors(&weights);

    Ok(Self {
      cx,
      input,
      target,
      weights: coefficients.id,
      output_id: output.id,
      loss_id: loss.id,
      grad_id,
      log_every,
    })
  }

  /// Runs the graph on one sample, returning its squared error and the
  /// gradient of that error with respect to the coefficients.
  fn sample_gradient(
    &mut self,
    row: [f32; COEFFICIENT_COUNT],
    y: f32,
    params: &[f32; COEFFICIENT_COUNT],
  ) -> Result<(f32, [f32; COEFFICIENT_COUNT]), FitError> {
    // the kept coefficient tensor is overwritten rather than recomputed
    self
      .cx
      .tensors
      .insert((self.weights, 0), Tensor::new(params.to_vec()));
    self.input.set(row);
    self.target.set([y]);
    self.cx.execute();

    let scope = TensorScope::new(&mut self.cx, [self.output_id, self.loss_id, self.grad_id]);
    let loss = scope.scalar(self.loss_id, "loss")?;
    let grad = scope.read(self.grad_id, "gradient")?;
    let grad: [f32; COEFFICIENT_COUNT] =
      grad.try_into().map_err(|_| FitError::GradientShape {
        expected: COEFFICIENT_COUNT,
        found: grad.len(),
      })?;
    Ok((loss, grad))
  }

  /// Mean loss and mean gradient over all samples for the current coefficients.
  fn batch_gradient(
    &mut self,
    samples: &Samples,
    params: &[f32; COEFFICIENT_COUNT],
  ) -> Result<(f32, [f32; COEFFICIENT_COUNT]), FitError> {
    let mut loss_sum = 0.0;
    let mut grad_sum = [0.0; COEFFICIENT_COUNT];
    for (x, y) in samples.iter() {
      let (loss, grad) = self.sample_gradient(features(x), y, params)?;
      loss_sum += loss;
      for (acc, g) in grad_sum.iter_mut().zip(grad) {
        *acc += g;
      }
    }
    let n = samples.len() as f32;
    Ok((loss_sum / n, grad_sum.map(|g| g / n)))
  }

  /// Fits `coefficients` to `samples` with a fixed number of optimizer steps.
  ///
  /// There is no convergence check. The future yields back to the executor
  /// after every iteration.
  #[tracing::instrument(skip_all, fields(samples = samples.len(), iterations = iterations))]
  pub async fn train(
    &mut self,
    samples: &Samples,
    coefficients: &mut Coefficients,
    optimizer: &mut dyn Optimizer,
    iterations: usize,
  ) -> Result<TrainingLog, FitError> {
    if samples.is_empty() {
      return Err(FitError::EmptySampleSet);
    }
    let mut params = coefficients.to_array();
    let mut log = TrainingLog::default();
    let mut loss_avg = ExponentialAverage::with_beta(0.9, 0.0);
    let start = std::time::Instant::now();

    for iter in 0..iterations {
      let (loss, grads) = self.batch_gradient(samples, &params)?;
      optimizer.step(&mut params, &grads);
      *coefficients = Coefficients::from_array(params);
      log.losses.push(loss);
      loss_avg.update(loss);
      debug!(iter, loss, "step");
      if self.log_every > 0 && iter % self.log_every == 0 {
        info!("Iter {iter} Loss: {:.4} (avg {:.4})", loss, loss_avg.value);
      }
      tokio::task::yield_now().await;
    }

    log.final_loss = mean_squared_error(&predict(samples.xs(), coefficients), samples.ys())?;
    if iterations > 0 {
      info!("Finished in {iterations} iterations, loss {:.4}", log.final_loss);
      info!(
        "Took {:.2}s, {:.2}µs / iter",
        start.elapsed().as_secs_f32(),
        start.elapsed().as_micros() / iterations as u128
      );
    }
    Ok(log)
  }
}
