//! Database plugin synchronization.
//!
//! # Data Flow
//! ```text
//! ScriptConfig.database_plugins (ordered ids)
//!     → registry.rs (PluginResolver: id → SyncHandler)
//!     → sync.rs (resolve_sync_handlers: SyncHandlerMap, nothing invoked)
//!     → sync.rs (synchronize: every handler launched, all awaited)
//!     → readiness.rs (default handler: TCP readiness check with backoff)
//! ```
//!
//! # Design Decisions
//! - Resolution and invocation are separate steps; resolution never runs a handler
//! - Duplicate ids collapse so each sync runs exactly once
//! - Synchronization waits for every handler and reports every failure

pub mod readiness;
pub mod registry;
pub mod sync;

use std::sync::Arc;

use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use thiserror::Error;

pub use readiness::TcpReadinessPlugin;
pub use registry::PluginRegistry;
pub use sync::{resolve_sync_handlers, synchronize};

/// Future returned by a sync handler.
pub type SyncFuture = BoxFuture<'static, Result<(), PluginError>>;

/// Zero-argument async sync operation.
pub type SyncHandler = Arc<dyn Fn() -> SyncFuture + Send + Sync>;

/// Plugin id → sync handler, in configuration order.
pub type SyncHandlerMap = IndexMap<String, SyncHandler>;

/// Maps plugin identifiers to sync handlers.
pub trait PluginResolver: Send + Sync {
    fn resolve(&self, id: &str) -> Result<SyncHandler, PluginError>;
}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("no sync handler for database plugin `{0}`")]
    Unresolved(String),

    #[error("invalid settings for plugin `{plugin}`: {reason}")]
    InvalidSettings { plugin: String, reason: String },

    #[error("plugin `{plugin}` could not reach {target} after {attempts} attempt(s)")]
    Unreachable {
        plugin: String,
        target: String,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Failed(String),
}

/// A sync handler that settled with an error.
#[derive(Debug, Error)]
#[error("plugin `{plugin}` failed to synchronize: {error}")]
pub struct PluginFailure {
    pub plugin: String,
    #[source]
    pub error: PluginError,
}
