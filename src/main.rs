//! Site server.
//!
//! Serves an exported static site over HTTP(S) with one access-log line per
//! request on stdout, and shuts down gracefully on SIGINT/SIGTERM.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                     SITE SERVER                       │
//!                  │                                                       │
//!   Request        │  ┌──────────┐   ┌───────────┐   ┌─────────────┐       │
//!   ───────────────┼─▶│ listener │──▶│ access    │──▶│ static site │       │
//!                  │  │ (TLS)    │   │ log       │   │ (ServeDir)  │       │
//!                  │  └──────────┘   └─────┬─────┘   └─────────────┘       │
//!                  │        ▲               │ LogRecord                     │
//!                  │        │ drain         ▼                               │
//!                  │  ┌─────┴──────┐  ┌──────────┐                          │
//!   SIGINT/TERM    │  │ shutdown   │  │ composer │──▶ stdout                │
//!   ───────────────┼─▶│ coordinator│  └──────────┘                          │
//!                  │  └────────────┘                                        │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use site_server::config::{load_config, Overrides};
use site_server::lifecycle::{startup, Outcome};
use site_server::observability::logging;

#[derive(Parser)]
#[command(name = "site-server")]
#[command(about = "Static site server with graceful shutdown and access logging", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plain HTTP on 0.0.0.0:8081 (same as setting DEV).
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut overrides = Overrides::from_env();
    overrides.dev |= cli.dev;

    let config = match load_config(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("site-server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.logging);

    tracing::debug!(
        bind_address = %config.http.bind_address,
        tls = config.http.tls().is_some(),
        static_dir = %config.http.static_dir.display(),
        grace_period_secs = config.shutdown.grace_period_secs,
        "Configuration loaded"
    );

    match startup::run(config).await {
        Ok(Outcome::Exited) => ExitCode::FAILURE,
        Ok(_) => {
            tracing::debug!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}
