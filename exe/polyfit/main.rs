mod app_config;

use polyfit::*;

use app_config::AppConfig;
use clap::{Parser, Subcommand, ValueEnum};
use data::DataSource;
use model::OptimizerKind;
use std::{error::Error, path::PathBuf};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
  /// Log every training step
  #[arg(short, long, global = true)]
  verbose: bool,
  #[command(subcommand)]
  command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
  /// Built-in sensor displacement table
  Sensor,
  /// Samples from a known quartic with Gaussian noise
  Synthetic,
}

#[derive(Subcommand)]
enum Command {
  /// Fit a quartic to samples and print the coefficients before and after training
  Fit {
    #[arg(long, value_enum, default_value_t = Source::Sensor)]
    source: Source,
    /// Two-column dataset file, overrides --source
    #[arg(short, long, value_name = "PATH")]
    data: Option<PathBuf>,
    #[arg(long, value_name = "INT", default_value_t = 100)]
    points: usize,
    #[arg(long, default_value_t = 0.04)]
    sigma: f32,
    /// YAML file with training settings, flags override it
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(short, long, value_name = "INT")]
    iterations: Option<usize>,
    #[arg(short, long)]
    learning_rate: Option<f32>,
    /// adam or sgd
    #[arg(long)]
    optimizer: Option<OptimizerKind>,
    #[arg(long)]
    seed: Option<u64>,
    /// Scale inputs into [0, 1] before fitting
    #[arg(long, overrides_with = "no_normalize")]
    normalize: bool,
    /// Fit on raw inputs even if the config file enables normalization
    #[arg(long, overrides_with = "normalize")]
    no_normalize: bool,
    /// Write samples and predictions as JSON
    #[arg(short, long, value_name = "PATH")]
    report: Option<PathBuf>,
  },
  /// Write a synthetic dataset file
  Generate {
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,
    #[arg(long, value_name = "INT", default_value_t = 100)]
    points: usize,
    #[arg(long, default_value_t = 0.04)]
    sigma: f32,
    #[arg(long)]
    seed: Option<u64>,
  },
}

// an on/off flag pair, None when neither was given so the config file decides
fn switch(on: bool, off: bool) -> Option<bool> {
  match (on, off) {
    (true, _) => Some(true),
    (_, true) => Some(false),
    _ => None,
  }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
  let args = Cli::parse();
  let level = if args.verbose {
    tracing::Level::DEBUG
  } else {
    tracing::Level::INFO
  };
  utils::init_logging(level)?;

  match args.command {
    Command::Fit {
      source,
      data,
      points,
      sigma,
      config,
      iterations,
      learning_rate,
      optimizer,
      seed,
      normalize,
      no_normalize,
      report,
    } => {
      let file_config = match config {
        Some(path) => AppConfig::from_file(&path)?,
        None => AppConfig::default(),
      };
      let cli_config = AppConfig {
        iterations,
        learning_rate,
        optimizer,
        seed,
        normalize: switch(normalize, no_normalize),
        ..AppConfig::default()
      };
      let params = file_config.merge(cli_config).training_params();
      let source = match (data, source) {
        (Some(path), _) => DataSource::File(path),
        (None, Source::Sensor) => DataSource::Sensor,
        (None, Source::Synthetic) => DataSource::Synthetic {
          num_points: points,
          sigma,
        },
      };
      subcommands::Fit::new(source, params, report).run().await?;
    }
    Command::Generate {
      output,
      points,
      sigma,
      seed,
    } => {
      subcommands::Generate::new(&output, points, sigma, seed).run()?;
    }
  }
  Ok(())
}
