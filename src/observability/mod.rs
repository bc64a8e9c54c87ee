//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap stages produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (stage timings, plugin outcomes, route counts)
//!     → console.rs (operator-facing listening/failure banners)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//!     → The person who started the server
//! ```
//!
//! # Design Decisions
//! - Log filter comes from `RUST_LOG` when set, config otherwise
//! - Metrics are recorded unconditionally; without an installed recorder
//!   they are no-ops
//! - Console output is separate from logging so it survives any filter

pub mod console;
pub mod logging;
pub mod metrics;
