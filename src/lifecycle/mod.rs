//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Idle
//!     → CredentialsResolved (TLS material loaded, plugin handlers resolved)
//!     → TransportConstructed (plaintext or TLS, not bound)
//!     → MiddlewareAttached (application guarded)
//!     → RoutesRegistered (models, routes, discovery, docs)
//!     → PluginsSynced (every handler settled)
//!     → Listening (bound, URLs announced)
//!
//! Exit (exit.rs):
//!     BootstrapError → ExitStatus → process exit code
//! ```
//!
//! # Design Decisions
//! - Stages run strictly in order; only plugin sync fans out
//! - Any fatal error moves to `Failed` and is returned, never swallowed
//! - Nothing to serve is a successful outcome, not an error

pub mod exit;
pub mod startup;

pub use crate::net::ServerHandle;
pub use exit::ExitStatus;
pub use startup::{Bootstrap, BootstrapError, BootstrapOutcome, BootstrapStage, Collaborators};
