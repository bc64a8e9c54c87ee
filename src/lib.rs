//! Startup orchestrator for a configurable application server.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod plugins;
pub mod resilience;
pub mod routing;

pub use config::schema::ScriptConfig;
pub use lifecycle::{Bootstrap, BootstrapOutcome, Collaborators, ExitStatus};
