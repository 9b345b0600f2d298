//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid config.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the site server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// HTTP listener settings.
    pub http: HttpConfig,

    /// Shutdown behaviour.
    pub shutdown: ShutdownConfig,

    /// Operational and access logging.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:443").
    pub bind_address: String,

    /// TLS certificate and key.
    pub tls: TlsConfig,

    /// Maximum time a client may take to send request headers.
    pub read_header_timeout_secs: u64,

    /// Directory holding the exported site.
    pub static_dir: PathBuf,
}

impl HttpConfig {
    /// TLS settings, if TLS is enabled.
    pub fn tls(&self) -> Option<&TlsConfig> {
        self.tls.enabled.then_some(&self.tls)
    }

    pub fn read_header_timeout(&self) -> Duration {
        Duration::from_secs(self.read_header_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:443".to_string(),
            tls: TlsConfig::default(),
            read_header_timeout_secs: 5,
            static_dir: PathBuf::from("./out"),
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    pub enabled: bool,

    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cert_path: PathBuf::from("./cert.pem"),
            key_path: PathBuf::from("./key.pem"),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Time in-flight requests get to finish after a termination signal.
    pub grace_period_secs: u64,
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 5,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,

    /// Operational log format (stderr).
    pub format: LogFormat,

    /// Access log line format (stdout).
    pub access_log_format: AccessLogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "site_server=info,tower_http=info".to_string(),
            format: LogFormat::Pretty,
            access_log_format: AccessLogFormat::Tabs,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLogFormat {
    /// Tab-aligned columns.
    #[default]
    Tabs,
    /// Space-aligned columns.
    Spaces,
    /// One JSON object per line.
    Json,
}
