//! TLS credential loading.
//!
//! # Responsibilities
//! - Read key, certificate and passphrase for secure transport
//! - Fail fast when required material is missing or unreadable
//!
//! # Design Decisions
//! - Plaintext transport never touches the filesystem
//! - Missing TLS material is not transient: no retry

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{CredentialsConfig, Protocol};

/// Error type for credential loading. Always fatal to the run.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A required path is not configured.
    #[error("SSL credentials are missing: `credentials.{0}` is not set")]
    Missing(&'static str),

    /// A configured file could not be read as text.
    #[error("failed to read TLS {kind} from {}", .path.display())]
    Unreadable {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// PEM text loaded from the configured credential paths.
#[derive(Clone)]
pub struct TlsMaterial {
    pub key: String,
    pub cert: String,
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("key", &"<redacted>")
            .field("cert_bytes", &self.cert.len())
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Credentials resolved for the selected protocol.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Plaintext transport, nothing loaded.
    None,
    /// Secure transport material.
    Tls(TlsMaterial),
}

/// Load the credentials the given protocol needs.
pub async fn load_credentials(
    protocol: Protocol,
    config: &CredentialsConfig,
) -> Result<Credentials, CredentialError> {
    if protocol != Protocol::Https {
        return Ok(Credentials::None);
    }

    let key_path = config.key.as_deref().ok_or(CredentialError::Missing("key"))?;
    let cert_path = config.cert.as_deref().ok_or(CredentialError::Missing("cert"))?;

    let key = read_pem("key", key_path).await?;
    let cert = read_pem("certificate", cert_path).await?;

    tracing::info!(
        key = %key_path.display(),
        cert = %cert_path.display(),
        passphrase = config.passphrase.is_some(),
        "TLS credentials loaded"
    );

    Ok(Credentials::Tls(TlsMaterial {
        key,
        cert,
        passphrase: config.passphrase.clone(),
    }))
}

async fn read_pem(kind: &'static str, path: &Path) -> Result<String, CredentialError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CredentialError::Unreadable {
            kind,
            path: path.to_path_buf(),
            source,
        })
}
