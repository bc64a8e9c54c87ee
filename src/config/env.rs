//! Process environment lookups.

use crate::config::loader::ConfigError;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5001;

/// Resolve the listen port from the `PORT` environment variable.
pub fn resolve_port() -> Result<u16, ConfigError> {
    parse_port(std::env::var("PORT").ok())
}

/// Parse an optional port value, falling back to [`DEFAULT_PORT`].
pub fn parse_port(value: Option<String>) -> Result<u16, ConfigError> {
    match value {
        None => Ok(DEFAULT_PORT),
        Some(value) if value.trim().is_empty() => Ok(DEFAULT_PORT),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidPort { value, source }),
    }
}
