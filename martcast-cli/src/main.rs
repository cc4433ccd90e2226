//! Martcast CLI — train, inspect, and serve retail sales predictions.

mod commands;

use clap::Parser;
use martcast_core::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Martcast: retail sales forecasting from item/outlet records
#[derive(Parser, Debug)]
#[command(name = "martcast", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Summarize a training CSV column by column
    Inspect {
        /// Path to the CSV (defaults to the configured training data)
        #[arg(long)]
        train_path: Option<PathBuf>,

        /// Only read the first N rows
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Fit the pipeline and model, persist all artifacts
    Train {
        /// Path to the training CSV (overrides the config)
        #[arg(long)]
        train_path: Option<PathBuf>,

        /// Validation fraction (overrides the config)
        #[arg(long)]
        test_size: Option<f64>,
    },
    /// Predict sales for a single JSON record
    Predict {
        /// The record as a JSON object string
        #[arg(long)]
        data: String,
    },
    /// Serve predictions over HTTP
    Serve {
        /// Bind host (overrides the config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = AppConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Inspect { train_path, limit } => {
            commands::inspect(&config, train_path, limit).await
        }
        Commands::Train {
            train_path,
            test_size,
        } => {
            let mut config = config;
            if let Some(path) = train_path {
                config.data.train_path = path;
            }
            if let Some(fraction) = test_size {
                config.data.test_size = fraction;
            }
            commands::train(&config).await
        }
        Commands::Predict { data } => commands::predict(&config, &data),
        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.serving.host = host;
            }
            if let Some(port) = port {
                config.serving.port = port;
            }
            commands::serve(&config).await
        }
    }
}
