//! Errors produced while loading samples, training and writing reports.

use std::{fmt, io, path::PathBuf};

/// Everything that can go wrong in the fitting pipeline.
///
/// Numeric trouble (NaN, infinities) is not an error: it propagates through
/// predictions and losses like it would in any float computation.
#[derive(Debug)]
pub enum FitError {
  /// Inputs and outputs (or predictions and labels) differ in length.
  LengthMismatch { inputs: usize, outputs: usize },

  /// Training needs at least one sample.
  EmptySampleSet,

  /// A dataset line could not be parsed.
  Parse {
    /// 1-based line number in the source text.
    line: usize,
    message: String,
  },

  /// Reading a dataset or writing a report failed.
  Io { path: PathBuf, source: io::Error },

  /// Min-max normalization over inputs that are all equal.
  DegenerateInputRange { value: f32 },

  /// The graph did not hold a tensor that training expected to read back.
  MissingTensor(String),

  /// A gradient read back from the graph had an unexpected number of elements.
  GradientShape { expected: usize, found: usize },

  /// Serializing the report failed.
  Report(serde_json::Error),
}

impl fmt::Display for FitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FitError::LengthMismatch { inputs, outputs } => {
        write!(f, "length mismatch: {inputs} inputs vs {outputs} outputs")
      }
      FitError::EmptySampleSet => write!(f, "sample set is empty"),
      FitError::Parse { line, message } => write!(f, "line {line}: {message}"),
      FitError::Io { path, source } => write!(f, "{}: {source}", path.display()),
      FitError::DegenerateInputRange { value } => {
        write!(f, "cannot normalize inputs, all of them equal {value}")
      }
      FitError::MissingTensor(name) => write!(f, "graph has no {name} tensor"),
      FitError::GradientShape { expected, found } => {
        write!(f, "gradient has {found} elements, expected {expected}")
      }
      FitError::Report(e) => write!(f, "report serialization: {e}"),
    }
  }
}

impl std::error::Error for FitError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      FitError::Io { source, .. } => Some(source),
      FitError::Report(e) => Some(e),
      _ => None,
    }
  }
}

impl From<serde_json::Error> for FitError {
  fn from(e: serde_json::Error) -> Self {
    FitError::Report(e)
  }
}
