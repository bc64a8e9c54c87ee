//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ScriptConfig;
use crate::config::validation::{validate_config, ValidationErrors};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("invalid PORT value `{value}`")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid listen host `{host}`")]
    InvalidHost {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ScriptConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        path = %path.display(),
        protocol = %config.protocol,
        routes = config.routes.len(),
        models = config.models.len(),
        plugins = config.database_plugins.len(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Parse configuration text without validating it.
pub fn parse_config(content: &str) -> Result<ScriptConfig, toml::de::Error> {
    toml::from_str(content)
}
