use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cobuy_api::RecommendServer;
use cobuy_recommender::Recommender;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
pub mod logging;

use config::ServiceConfig;

#[derive(Parser)]
#[command(name = "cobuy")]
#[command(about = "Co-purchase product recommendation service")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP listen address (e.g., 0.0.0.0:8000)
    #[arg(long, value_name = "ADDR")]
    listen_addr: Option<SocketAddr>,

    /// Maximum number of nearest neighbors per request
    #[arg(long, value_name = "N")]
    neighbors: Option<usize>,

    /// Maximum number of recommended products per response
    #[arg(long, value_name = "N")]
    max_recommendations: Option<usize>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default configuration as TOML, or write it to a file
    DefaultConfig {
        /// Destination file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Load and validate a configuration file
    CheckConfig {
        /// Configuration file to check
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG directives, LOG_FORMAT (pretty, compact, json) and LOG_ANSI
    let log_config = logging::LogConfig::from_env();
    if let Err(e) = logging::init_logging(&log_config) {
        // Fallback to basic logging if structured logging fails
        eprintln!("Warning: Failed to initialize structured logging: {}", e);
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(logging::DEFAULT_DIRECTIVES))
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::DefaultConfig { output }) => {
            let config = ServiceConfig::default();
            match output {
                Some(path) => {
                    config.save(&path)?;
                    println!("Wrote default configuration to {}", path.display());
                }
                None => print!("{}", config.to_toml()?),
            }
            return Ok(());
        }
        Some(Commands::CheckConfig { file }) => {
            check_config(&file)?;
            return Ok(());
        }
        None => {
            // Run the service
        }
    }

    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    config.apply_env();

    // Override with CLI args
    if let Some(addr) = cli.listen_addr {
        config.server.listen_addr = addr;
    }
    if let Some(neighbors) = cli.neighbors {
        config.recommender.neighbors = neighbors;
    }
    if let Some(max) = cli.max_recommendations {
        config.recommender.max_recommendations = max;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    info!(
        listen_addr = %config.server.listen_addr,
        neighbors = config.recommender.neighbors,
        max_recommendations = config.recommender.max_recommendations,
        max_order_items = config.server.max_order_items,
        "Starting Cobuy recommendation service"
    );

    let addr = config.server.listen_addr;
    let server = RecommendServer::new(config.server, Recommender::new(config.recommender));
    server
        .start(addr, shutdown_signal())
        .await
        .with_context(|| format!("Recommendation API failed on {}", addr))?;

    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = ServiceConfig::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    match config.validate() {
        Ok(()) => {
            println!("{}: OK", path.display());
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("{}: {}", path.display(), e)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
