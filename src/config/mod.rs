//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ScriptConfig (validated, immutable for the run)
//!
//! PORT environment variable
//!     → env.rs (default 5001)
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start and never mutated
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CredentialsConfig, EndpointConfig, FieldConfig, FieldKind, ModelConfig, ObservabilityConfig,
    PluginSettings, Protocol, RouteConfig, ScriptConfig, ServerConfig,
};
