//! ferp: fabulously easy reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ config::loader ──▶ config::validation ──▶ Configuration
//!                                                                  │
//!                                                                  ▼
//!   Client ──▶ net::listener (+ net::tls) ──▶ http::server ──▶ routing table
//!                                                                  │
//!                                      ┌───────────────────────────┴──────┐
//!                                      ▼                                  ▼
//!                              http::redirect (302)            http::forward
//!                                                              (url rewrite, headers)
//!                                                                         │
//!   Client ◀──────────────────────── streamed response ◀──────── Downstream
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ferp::config::load_config;
use ferp::lifecycle::{serve, spawn_signal_handler, Shutdown};
use ferp::observability::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "ferp")]
#[command(about = "fabulously easy reverse proxy")]
#[command(
    long_about = "a super easy to use reverse proxy, that supports http & https incoming, and multiple downstream services"
)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the reverse proxy and run until shutdown by a signal
    Serve {
        /// Path to the proxy configuration file (YAML or TOML)
        #[arg(long)]
        configuration_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    match cli.command {
        Commands::Serve { configuration_file } => {
            tracing::info!("ferp v{} starting", env!("CARGO_PKG_VERSION"));

            let config = load_config(&configuration_file).map_err(|e| {
                tracing::error!(error = %e, "Failed to load configuration");
                e
            })?;

            let shutdown = Shutdown::new();
            let signals = spawn_signal_handler(shutdown.clone());

            let result = serve(&config, shutdown.clone()).await;
            shutdown.trigger();
            if let Err(e) = signals.await {
                tracing::error!(error = %e, "Signal handler task failed");
            }

            result?;
            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}
