//! TCP readiness check for datastore plugins.
//!
//! # Responsibilities
//! - Derive the datastore address from the plugin URL
//! - Connect with a per-attempt deadline, backing off between attempts
//!
//! # Design Decisions
//! - A successful TCP connect is the readiness signal; no protocol handshake
//! - Well-known datastore schemes imply their default port

use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use url::Url;

use crate::config::PluginSettings;
use crate::plugins::PluginError;
use crate::resilience::Backoff;

/// Default port for datastore URL schemes the `url` crate does not know.
fn datastore_port(scheme: &str) -> Option<u16> {
    match scheme {
        "postgres" | "postgresql" => Some(5432),
        "mysql" | "mariadb" => Some(3306),
        "mongodb" => Some(27017),
        "redis" | "rediss" => Some(6379),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct TcpReadinessPlugin {
    id: String,
    target: String,
    max_attempts: u32,
    connect_timeout: Duration,
    base_delay: Duration,
    max_delay: Duration,
}

impl TcpReadinessPlugin {
    pub fn from_settings(id: &str, settings: &PluginSettings) -> Result<Self, PluginError> {
        let invalid = |reason: String| PluginError::InvalidSettings {
            plugin: id.to_string(),
            reason,
        };

        let url = Url::parse(&settings.url).map_err(|e| invalid(format!("invalid url: {}", e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("url has no host".into()))?;
        let port = url
            .port_or_known_default()
            .or_else(|| datastore_port(url.scheme()))
            .ok_or_else(|| invalid(format!("no port given for scheme `{}`", url.scheme())))?;

        Ok(Self {
            id: id.to_string(),
            target: format!("{}:{}", host, port),
            max_attempts: settings.max_attempts.max(1),
            connect_timeout: Duration::from_millis(settings.connect_timeout_ms),
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        })
    }

    /// `host:port` checked by [`check`](Self::check).
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Retry until the target accepts a connection or attempts run out.
    pub async fn check(&self) -> Result<(), PluginError> {
        let mut backoff = Backoff::new(self.base_delay, self.max_delay);
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.target)).await {
                Ok(Ok(_)) => {
                    tracing::info!(plugin = %self.id, target = %self.target, attempt, "Datastore reachable");
                    return Ok(());
                }
                Ok(Err(e)) => last_error = Some(e),
                Err(_) => {
                    last_error = Some(io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))
                }
            }

            if attempt < self.max_attempts {
                let delay = backoff.next_delay();
                tracing::warn!(
                    plugin = %self.id,
                    target = %self.target,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = ?last_error,
                    "Datastore not ready, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(PluginError::Unreachable {
            plugin: self.id.clone(),
            target: self.target.clone(),
            attempts: self.max_attempts,
            source: last_error.unwrap_or_else(|| io::Error::other("no connection attempt made")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn settings(url: &str) -> PluginSettings {
        PluginSettings {
            url: url.into(),
            max_attempts: 2,
            connect_timeout_ms: 500,
            base_delay_ms: 1,
            max_delay_ms: 5,
        }
    }

    #[test]
    fn test_target_from_url() {
        let plugin = TcpReadinessPlugin::from_settings("pg", &settings("postgres://db.local/app")).unwrap();
        assert_eq!(plugin.target(), "db.local:5432");

        let plugin =
            TcpReadinessPlugin::from_settings("mongo", &settings("mongodb://10.0.0.3:27018")).unwrap();
        assert_eq!(plugin.target(), "10.0.0.3:27018");

        let plugin = TcpReadinessPlugin::from_settings("api", &settings("https://[::1]/")).unwrap();
        assert_eq!(plugin.target(), "[::1]:443");
    }

    #[test]
    fn test_invalid_settings() {
        for url in ["not a url", "custom://host", "unix:/var/run/db.sock"] {
            assert!(
                matches!(
                    TcpReadinessPlugin::from_settings("x", &settings(url)),
                    Err(PluginError::InvalidSettings { .. })
                ),
                "{url}"
            );
        }
    }

    #[tokio::test]
    async fn test_check_succeeds_when_listening() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let plugin = TcpReadinessPlugin::from_settings(
            "pg",
            &settings(&format!("postgres://127.0.0.1:{}/app", port)),
        )
        .unwrap();
        plugin.check().await.unwrap();
    }

    #[tokio::test]
    async fn test_check_gives_up_after_max_attempts() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let plugin = TcpReadinessPlugin::from_settings(
            "pg",
            &settings(&format!("postgres://127.0.0.1:{}/app", port)),
        )
        .unwrap();
        match plugin.check().await {
            Err(PluginError::Unreachable { attempts, target, .. }) => {
                assert_eq!(attempts, 2);
                assert_eq!(target, format!("127.0.0.1:{}", port));
            }
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }
}
