use serde::Serialize;
use std::path::Path;

#[cfg(not(debug_assertions))]
use human_panic::setup_panic;
use tracing::{
  subscriber::{self, DefaultGuard, SetGlobalDefaultError},
  Level,
};

#[cfg(debug_assertions)]
extern crate better_panic;

use tracing_subscriber::fmt;

use crate::FitError;

pub fn install_logger(level: Level) -> Result<(), SetGlobalDefaultError> {
  let subscriber = fmt().compact().with_max_level(level).finish();
  subscriber::set_global_default(subscriber)
}

pub fn init_logging(level: Level) -> Result<(), SetGlobalDefaultError> {
  // Human Panic. Only enabled when *not* debugging.
  #[cfg(not(debug_assertions))]
  {
    setup_panic!();
  }

  // Better Panic. Only enabled *when* debugging.
  #[cfg(debug_assertions)]
  {
    better_panic::Settings::debug()
      .most_recent_first(false)
      .lineno_suffix(true)
      .verbosity(better_panic::Verbosity::Full)
      .install();
  }

  install_logger(level)?;

  Ok(())
}

/// Thread-local subscriber for tests, output is captured by the test harness.
/// Logging stops when the returned guard is dropped.
pub fn init_logging_tests() -> DefaultGuard {
  let subscriber = fmt()
    .compact()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .finish();
  subscriber::set_default(subscriber)
}

pub fn serialize_to_file<T: Serialize>(path: &Path, obj: &T) -> Result<(), FitError> {
  let buff = serde_json::to_string_pretty(obj)?;
  std::fs::write(path, buff).map_err(|source| FitError::Io {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("values.json");
    serialize_to_file(&path, &vec![1.5f32, -2.0]).unwrap();
    let read: Vec<f32> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(read, vec![1.5, -2.0]);
  }

  #[test]
  fn unwritable_path_is_io_error() {
    let err = serialize_to_file(Path::new("/nonexistent/dir/report.json"), &1).unwrap_err();
    assert!(matches!(err, FitError::Io { .. }));
  }
}
