//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts in 1..=MAX_TIMEOUT_SECS, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::schema::SiteConfig;

/// Upper bound for the grace period and the read-header timeout.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// A single semantic problem with a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    ZeroGracePeriod,
    GracePeriodTooLarge(u64),
    ZeroHeaderTimeout,
    HeaderTimeoutTooLarge(u64),
    EmptyTlsPath(&'static str),
    EmptyStaticDir,
    InvalidLogFilter(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "http.bind_address {:?} is not a socket address", addr)
            }
            ValidationError::ZeroGracePeriod => {
                write!(f, "shutdown.grace_period_secs must be greater than 0")
            }
            ValidationError::GracePeriodTooLarge(secs) => write!(
                f,
                "shutdown.grace_period_secs {} exceeds {}",
                secs, MAX_TIMEOUT_SECS
            ),
            ValidationError::HeaderTimeoutTooLarge(secs) => write!(
                f,
                "http.read_header_timeout_secs {} exceeds {}",
                secs, MAX_TIMEOUT_SECS
            ),
            ValidationError::ZeroHeaderTimeout => {
                write!(f, "http.read_header_timeout_secs must be greater than 0")
            }
            ValidationError::EmptyTlsPath(field) => write!(f, "http.tls.{} is empty", field),
            ValidationError::EmptyStaticDir => write!(f, "http.static_dir is empty"),
            ValidationError::InvalidLogFilter(e) => write!(f, "logging.filter: {}", e),
        }
    }
}

/// Check a parsed config, collecting every problem.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.http.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.http.bind_address.clone(),
        ));
    }
    match config.http.read_header_timeout_secs {
        0 => errors.push(ValidationError::ZeroHeaderTimeout),
        secs if secs > MAX_TIMEOUT_SECS => {
            errors.push(ValidationError::HeaderTimeoutTooLarge(secs))
        }
        _ => {}
    }
    if config.http.static_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyStaticDir);
    }
    if let Some(tls) = config.http.tls() {
        if tls.cert_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }
    match config.shutdown.grace_period_secs {
        0 => errors.push(ValidationError::ZeroGracePeriod),
        secs if secs > MAX_TIMEOUT_SECS => errors.push(ValidationError::GracePeriodTooLarge(secs)),
        _ => {}
    }
    if let Err(e) = EnvFilter::try_new(&config.logging.filter) {
        errors.push(ValidationError::InvalidLogFilter(e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
