//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Plugin readiness check:
//!     → connect attempt with timeout
//!     → On failure: backoff.rs (wait, then try again until attempts run out)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Jittered backoff so several checks do not retry in lockstep

pub mod backoff;

pub use backoff::Backoff;
