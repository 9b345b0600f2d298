//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the handler chain from config
//! - Install signal handlers
//! - Bind the listener and hand it to the coordinator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and happens before Running
//! - Signals are installed before binding so none are lost during startup

use std::io;
use std::net::{AddrParseError, SocketAddr};

use crate::config::{AccessLogFormat, SiteConfig};
use crate::http::handler::{BoxHandler, Chain};
use crate::http::server::HttpListener;
use crate::http::static_site::StaticSite;
use crate::lifecycle::shutdown::{Coordinator, Outcome};
use crate::lifecycle::signals;
use crate::observability::{AccessLog, DefaultComposer, JsonComposer, WriterSink};

/// Fatal errors raised before the listener starts serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid bind address {addr:?}: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to load TLS certificate: {0}")]
    Tls(#[source] io::Error),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] io::Error),
}

/// Access log writing to stdout in the configured format.
pub fn access_log(format: AccessLogFormat) -> AccessLog {
    match format {
        AccessLogFormat::Tabs => AccessLog::stdout(),
        AccessLogFormat::Spaces => {
            AccessLog::new(WriterSink::new(io::stdout()), DefaultComposer::spaces())
        }
        AccessLogFormat::Json => AccessLog::new(WriterSink::new(io::stdout()), JsonComposer),
    }
}

/// The site's handler: access log around the static site.
pub fn site_handler(config: &SiteConfig) -> BoxHandler {
    Chain::new()
        .with(access_log(config.logging.access_log_format))
        .then(StaticSite::new(&config.http.static_dir))
}

/// Start serving and block until shutdown completes.
pub async fn run(config: SiteConfig) -> Result<Outcome, StartupError> {
    let signals = signals::listen().map_err(StartupError::Signals)?;
    let listener = HttpListener::bind(&config.http, site_handler(&config)).await?;

    let coordinator = Coordinator::new(config.shutdown.grace_period());
    Ok(coordinator.run(Box::new(listener), signals).await)
}
