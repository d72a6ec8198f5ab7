use std::path::Path;

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::FitError;

use super::Samples;

/// Parses whitespace separated `x y` lines. Blank lines and `#` comments are skipped.
pub fn parse_dataset(content: &str) -> Result<Samples, FitError> {
  let mut xs = Vec::new();
  let mut ys = Vec::new();
  for (i, line) in content.lines().enumerate() {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
      continue;
    }
    let parts = line
      .split_whitespace()
      .map(|val| {
        val.parse::<f32>().map_err(|e| FitError::Parse {
          line: i + 1,
          message: format!("{val:?}: {e}"),
        })
      })
      .collect::<Result<Vec<_>, _>>()?;
    let &[x, y] = parts.as_slice() else {
      return Err(FitError::Parse {
        line: i + 1,
        message: format!("expected 2 values, found {}", parts.len()),
      });
    };
    xs.push(x);
    ys.push(y);
  }
  Samples::new(xs, ys)
}

pub fn read_dataset(path: &Path) -> Result<Samples, FitError> {
  let content = std::fs::read_to_string(path).map_err(|source| FitError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  parse_dataset(&content)
}

/// Renders samples in the format [`parse_dataset`] reads.
pub fn format_dataset(samples: &Samples) -> String {
  samples
    .iter()
    .map(|(x, y)| format!("{x} {y}\n"))
    .collect()
}

/// The affine map used by [`normalize_inputs`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputScaling {
  pub min: f32,
  pub max: f32,
}

impl InputScaling {
  pub fn apply(&self, x: f32) -> f32 {
    (x - self.min) / (self.max - self.min)
  }
}

/// Min-max scales the inputs into [0, 1], outputs are left alone.
pub fn normalize_inputs(samples: &Samples) -> Result<(Samples, InputScaling), FitError> {
  let scaling = match samples.xs().iter().copied().minmax_by(f32::total_cmp) {
    MinMaxResult::NoElements => return Err(FitError::EmptySampleSet),
    MinMaxResult::OneElement(value) => return Err(FitError::DegenerateInputRange { value }),
    MinMaxResult::MinMax(min, max) if min == max => {
      return Err(FitError::DegenerateInputRange { value: min })
    }
    MinMaxResult::MinMax(min, max) => InputScaling { min, max },
  };
  let xs = samples.xs().iter().map(|x| scaling.apply(*x)).collect();
  Ok((Samples::new(xs, samples.ys().to_vec())?, scaling))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_two_columns_with_comments() {
    let samples = parse_dataset("# dspa displacement\n1 2.5\n\n  3\t-4 # trailing\n").unwrap();
    assert_eq!(samples.xs(), &[1.0, 3.0]);
    assert_eq!(samples.ys(), &[2.5, -4.0]);
  }

  #[test]
  fn reports_line_of_bad_value() {
    let err = parse_dataset("1 2\n3 four\n").unwrap_err();
    assert!(matches!(err, FitError::Parse { line: 2, .. }), "{err}");
  }

  #[test]
  fn rejects_wrong_column_count() {
    let err = parse_dataset("1 2 3\n").unwrap_err();
    assert!(matches!(err, FitError::Parse { line: 1, .. }), "{err}");
  }

  #[test]
  fn dataset_file_round_trip() {
    let samples = Samples::from_pairs(&[(0.5, 1.25), (-2.0, 3.0)]);
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), format_dataset(&samples)).unwrap();
    assert_eq!(read_dataset(file.path()).unwrap(), samples);
  }

  #[test]
  fn missing_file_is_io_error() {
    let err = read_dataset(Path::new("/nonexistent/polyfit.txt")).unwrap_err();
    assert!(matches!(err, FitError::Io { .. }));
  }

  #[test]
  fn normalizes_inputs_into_unit_range() {
    let samples = Samples::from_pairs(&[(10.0, 1.0), (20.0, 2.0), (30.0, 3.0)]);
    let (scaled, scaling) = normalize_inputs(&samples).unwrap();
    assert_eq!(scaled.xs(), &[0.0, 0.5, 1.0]);
    assert_eq!(scaled.ys(), samples.ys());
    assert_eq!(scaling, InputScaling { min: 10.0, max: 30.0 });
  }

  #[test]
  fn constant_inputs_cannot_be_normalized() {
    let samples = Samples::from_pairs(&[(4.0, 1.0), (4.0, 2.0)]);
    let err = normalize_inputs(&samples).unwrap_err();
    assert!(matches!(err, FitError::DegenerateInputRange { value } if value == 4.0));
  }
}
