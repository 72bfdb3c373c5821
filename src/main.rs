//! # evalplot CLI
//!
//! Command-line entry point for the chart pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Run the whole pipeline with the built-in configuration
//! evalplot run
//!
//! # Point it at a different eval directory, with info logging
//! evalplot -v run --input-dir results/eval --output-dir charts
//!
//! # Start from a configuration file
//! evalplot dump-config > evalplot.toml
//! evalplot run --config evalplot.toml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use evalplot::config::PipelineConfig;
use evalplot::pipeline;

/// evalplot - Benchmark Log Averaging and Chart Rendering
#[derive(Parser)]
#[command(name = "evalplot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole chart pipeline
    Run {
        /// TOML configuration file (built-in defaults when omitted)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the trial-file input directory
        #[arg(long, value_name = "DIR")]
        input_dir: Option<PathBuf>,

        /// Override the image output directory
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Print the default configuration as TOML
    DumpConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Run {
            config,
            input_dir,
            output_dir,
        } => run_pipeline(config, input_dir, output_dir),
        Commands::DumpConfig => dump_config(),
    }
}

/// Load the configuration, apply CLI overrides, and run the pipeline.
fn run_pipeline(
    config_path: Option<PathBuf>,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = input_dir {
        config.input_dir = dir;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    info!("evalplot - benchmark log chart pipeline");
    info!("=======================================");
    info!("Input:  {}", config.input_dir.display());
    info!("Output: {}", config.output_dir.display());
    info!(
        "Families: {} latency, round throughput: {}, node throughput: {}",
        config.latency.len(),
        config.round_throughput.is_some(),
        config.node_throughput.is_some()
    );

    pipeline::run(&config).context("chart pipeline failed")?;

    info!("All charts rendered");
    Ok(())
}

/// Print the default configuration so it can be saved and edited.
fn dump_config() -> Result<()> {
    let toml = PipelineConfig::default()
        .to_toml()
        .context("failed to serialize default configuration")?;
    print!("{toml}");
    Ok(())
}
