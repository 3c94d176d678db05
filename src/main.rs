use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use nativeboot::config::Config;

/// nativeboot - check whether a bundled native library can be brought up on this system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Logical library name to load
    #[arg(short, long)]
    name: Option<String>,

    /// Directory holding the bundled native binaries
    #[arg(short, long)]
    resource_dir: Option<PathBuf>,

    /// Directory to extract the library into
    #[arg(short, long)]
    temp_dir: Option<PathBuf>,

    /// Print the load outcome as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr so stdout only carries the report
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        Config::load_from_file(config_path)?
    } else {
        Config::load_default()?
    };

    // Command line overrides
    if let Some(name) = args.name {
        config.library.name = name;
    }
    if let Some(dir) = args.resource_dir {
        config.resources.dir = Some(dir);
    }
    if let Some(dir) = args.temp_dir {
        config.extraction.temp_dir = Some(dir);
    }

    let library = config.bundled_library()?;
    let available = library.ensure_loaded(config.extraction.temp_dir.as_deref());

    if let Some(outcome) = library.outcome() {
        if args.json {
            let json = serde_json::to_string_pretty(outcome).context("Failed to serialize outcome")?;
            println!("{json}");
        } else {
            println!(
                "{}: {}",
                outcome.library,
                if available { "available" } else { "unavailable" }
            );
            if let Some(path) = &outcome.extracted_path {
                println!("  extracted to {}", path.display());
            }
            if let Some(failure) = &outcome.failure {
                println!("  reason: {failure}");
            }
        }
    }

    Ok(if available {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
