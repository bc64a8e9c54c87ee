//! HTTP application subsystem.
//!
//! # Data Flow
//! ```text
//! Application<Unguarded>
//!     → middleware.rs (MiddlewareAttacher observes the transport, builds the stack)
//!     → Application<Guarded> (models and routes registered here)
//!     → app.rs into_router (every route wrapped in the stack)
//!     → Transport::listen
//! ```

pub mod app;
pub mod middleware;

pub use app::{Application, Guarded, Unguarded};
pub use middleware::{DefaultMiddleware, MiddlewareAttacher, MiddlewareStack};
