//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! credentials config
//!     → tls.rs (load key/cert/passphrase for https, nothing for http)
//!     → transport.rs (construct plaintext or TLS transport, not yet bound)
//!     → [middleware, routes, plugin sync happen here]
//!     → transport.rs (bind + serve)
//!     → interfaces.rs (resolve URLs for operator output)
//! ```
//!
//! # Design Decisions
//! - Exactly one transport per run
//! - Binding is the last step; nothing listens before the app is complete

pub mod interfaces;
pub mod tls;
pub mod transport;

pub use tls::{load_credentials, CredentialError, Credentials, TlsMaterial};
pub use transport::{ServerHandle, Transport, TransportError};
