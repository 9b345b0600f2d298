//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::SiteConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Bind address used in development mode.
pub const DEV_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Settings that take precedence over the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    /// Plain HTTP on [`DEV_BIND_ADDRESS`].
    pub dev: bool,
}

impl Overrides {
    /// Overrides from the process environment (`DEV` set to anything).
    pub fn from_env() -> Self {
        Self {
            dev: std::env::var_os("DEV").is_some(),
        }
    }

    pub fn apply(&self, config: &mut SiteConfig) {
        if self.dev {
            config.http.bind_address = DEV_BIND_ADDRESS.to_string();
            config.http.tls.enabled = false;
        }
    }
}

/// Load, override and validate configuration. Without a path the defaults
/// are used.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<SiteConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_config(&content)?
        }
        None => SiteConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse TOML into a config without validating it.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}
