//! Command line entry point for the bundle builder.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xiangqi_bundler::{
  BundleBuilder, BundleConfig, NamingScheme, PlatformId, ResolutionStrategy,
};

#[derive(Parser)]
#[command(
  name = "xiangqi-bundler",
  version,
  about = "Package the xiangqi GUI into a standalone desktop bundle"
)]
struct Cli {
  /// Project directory containing the application sources and assets
  #[arg(long, default_value = ".")]
  project_dir: PathBuf,

  /// Explicit configuration file (defaults to bundle.config.json in the
  /// project directory)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Target platform (defaults to the build host)
  #[arg(long, value_enum)]
  platform: Option<PlatformId>,

  /// Engine resolution strategy override
  #[arg(long, value_enum)]
  strategy: Option<ResolutionStrategy>,

  /// Artifact naming scheme override
  #[arg(long, value_enum)]
  naming: Option<NamingScheme>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the resolved manifest as JSON without touching the filesystem
  Resolve,
  /// Remove previous output, stage assets, run the packager and verify the
  /// artifact
  Build,
  /// Remove build output directories only
  Clean,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .compact()
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("Error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let mut config = match &cli.config {
    Some(path) => BundleConfig::from_path(path)
      .ok_or_else(|| anyhow!("failed to load configuration from {}", path.display()))?,
    None => BundleConfig::discover(&cli.project_dir),
  };
  if let Some(strategy) = cli.strategy {
    config.strategy = strategy;
  }
  if let Some(naming) = cli.naming {
    config.naming = naming;
  }

  let platform = cli.platform.unwrap_or_else(PlatformId::host);
  let builder = BundleBuilder::new(&cli.project_dir, config, platform);

  match cli.command {
    Commands::Resolve => {
      let manifest = builder.resolve();
      println!("{}", serde_json::to_string_pretty(&manifest.summary())?);
    }
    Commands::Clean => builder.clean()?,
    Commands::Build => {
      let report = builder.build()?;
      println!(
        "Build succeeded: {} ({})",
        report.path.display(),
        report.human_size()
      );
    }
  }

  Ok(())
}
