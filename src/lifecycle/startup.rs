//! Startup orchestration.
//!
//! # Responsibilities
//! - Load credentials and resolve plugin handlers
//! - Construct the transport, attach middleware, register routes
//! - Synchronize database plugins, then bind and announce the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and leaves the stage at `Failed`
//! - Plugin handlers are resolved up front but only run once routes exist
//! - Listener starts last (traffic only when ready)

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::config::ScriptConfig;
use crate::http::app::Application;
use crate::http::middleware::{DefaultMiddleware, MiddlewareAttacher};
use crate::net::interfaces::{local_ip, ServerUrls};
use crate::net::{load_credentials, CredentialError, ServerHandle, Transport, TransportError};
use crate::observability::{console, metrics};
use crate::plugins::{
    resolve_sync_handlers, synchronize, PluginError, PluginFailure, PluginRegistry, PluginResolver,
};
use crate::routing::{self, ManifestRouteSource, RouteSource};

/// Bootstrap progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    Idle,
    CredentialsResolved,
    TransportConstructed,
    MiddlewareAttached,
    RoutesRegistered,
    PluginsSynced,
    Listening,
    Failed,
}

impl BootstrapStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapStage::Idle => "idle",
            BootstrapStage::CredentialsResolved => "credentials_resolved",
            BootstrapStage::TransportConstructed => "transport_constructed",
            BootstrapStage::MiddlewareAttached => "middleware_attached",
            BootstrapStage::RoutesRegistered => "routes_registered",
            BootstrapStage::PluginsSynced => "plugins_synced",
            BootstrapStage::Listening => "listening",
            BootstrapStage::Failed => "failed",
        }
    }
}

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("SSL credentials are missing or unreadable")]
    Credentials(#[from] CredentialError),

    #[error("failed to resolve database plugins")]
    PluginResolution(#[source] PluginError),

    #[error("failed to construct transport")]
    Transport(#[from] TransportError),

    #[error("database plugin sync failed: {}", summarize(.failures))]
    PluginSync { failures: Vec<PluginFailure> },

    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

fn summarize(failures: &[PluginFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.plugin, console::error_chain(&f.error)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// How a successful run ended.
#[derive(Debug)]
pub enum BootstrapOutcome {
    Listening(ServerHandle),
    /// Registration produced nothing worth serving; listen was never called.
    NothingToServe,
}

/// Pluggable pieces the orchestrator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub plugins: Arc<dyn PluginResolver>,
    pub routes: Arc<dyn RouteSource>,
    pub middleware: Arc<dyn MiddlewareAttacher>,
}

impl Collaborators {
    /// Default collaborators for a configuration.
    pub fn from_config(config: &ScriptConfig) -> Result<Self, PluginError> {
        Ok(Self {
            plugins: Arc::new(PluginRegistry::from_settings(&config.plugins)?),
            routes: Arc::new(ManifestRouteSource::new(config.server.routes_dir.clone())),
            middleware: Arc::new(DefaultMiddleware::new(&config.server)),
        })
    }
}

/// Drives one startup from `Idle` to `Listening` or `Failed`.
pub struct Bootstrap {
    config: ScriptConfig,
    listen_addr: SocketAddr,
    collaborators: Collaborators,
    stage: BootstrapStage,
    history: Vec<BootstrapStage>,
}

impl Bootstrap {
    pub fn new(config: ScriptConfig, listen_addr: SocketAddr, collaborators: Collaborators) -> Self {
        Self {
            config,
            listen_addr,
            collaborators,
            stage: BootstrapStage::Idle,
            history: vec![BootstrapStage::Idle],
        }
    }

    pub fn stage(&self) -> BootstrapStage {
        self.stage
    }

    /// Every stage reached so far, in order.
    pub fn history(&self) -> &[BootstrapStage] {
        &self.history
    }

    /// Run the startup sequence once.
    pub async fn run(&mut self) -> Result<BootstrapOutcome, BootstrapError> {
        tracing::info!(
            protocol = %self.config.protocol,
            address = %self.listen_addr,
            plugins = self.config.database_plugins.len(),
            "Bootstrap started"
        );

        match self.execute().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(error = %console::error_chain(&e), failed_after = ?self.stage, "Startup failed");
                self.enter(BootstrapStage::Failed);
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<BootstrapOutcome, BootstrapError> {
        let started = Instant::now();
        let credentials = load_credentials(self.config.protocol, &self.config.credentials).await?;
        let handlers = resolve_sync_handlers(
            &self.config.database_plugins,
            self.collaborators.plugins.as_ref(),
        )
        .map_err(BootstrapError::PluginResolution)?;
        self.advance(BootstrapStage::CredentialsResolved, started);

        let started = Instant::now();
        let transport = Transport::select(self.config.protocol, credentials)?;
        self.advance(BootstrapStage::TransportConstructed, started);

        let started = Instant::now();
        let mut app = self
            .collaborators
            .middleware
            .attach(Application::new(), &transport);
        self.advance(BootstrapStage::MiddlewareAttached, started);

        let started = Instant::now();
        let registration =
            routing::register(&mut app, self.collaborators.routes.as_ref(), &self.config).await;
        self.advance(BootstrapStage::RoutesRegistered, started);

        if !registration.should_start_server {
            tracing::warn!("Nothing to serve, listener not started");
            return Ok(BootstrapOutcome::NothingToServe);
        }

        let started = Instant::now();
        let synced = synchronize(handlers)
            .await
            .map_err(|failures| BootstrapError::PluginSync { failures })?;
        tracing::debug!(plugins = synced, "Database plugins ready");
        self.advance(BootstrapStage::PluginsSynced, started);

        console::print_starting();
        let started = Instant::now();
        let addr = self.listen_addr;
        let server = transport
            .listen(addr, app.into_router())
            .await
            .map_err(|source| BootstrapError::Bind { addr, source })?;
        self.advance(BootstrapStage::Listening, started);

        let urls = ServerUrls::new(
            server.protocol(),
            server.local_addr(),
            local_ip().await,
            registration.docs_path.as_deref(),
        );
        tracing::info!(network = %urls.network, local = %urls.local, docs = ?urls.docs, "Server running");
        console::print_listening(&urls);

        Ok(BootstrapOutcome::Listening(server))
    }

    fn advance(&mut self, stage: BootstrapStage, started: Instant) {
        metrics::record_stage(stage.as_str(), started);
        tracing::debug!(stage = ?stage, elapsed_ms = started.elapsed().as_millis() as u64, "Bootstrap stage reached");
        self.enter(stage);
    }

    fn enter(&mut self, stage: BootstrapStage) {
        self.stage = stage;
        self.history.push(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Protocol;

    fn bootstrap(config: ScriptConfig) -> Bootstrap {
        let collaborators = Collaborators::from_config(&config).unwrap();
        Bootstrap::new(config, "127.0.0.1:0".parse().unwrap(), collaborators)
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(BootstrapStage::Idle.as_str(), "idle");
        assert_eq!(BootstrapStage::PluginsSynced.as_str(), "plugins_synced");
        assert_eq!(BootstrapStage::Failed.as_str(), "failed");
    }

    #[test]
    fn test_plugin_sync_error_carries_causes() {
        let err = BootstrapError::PluginSync {
            failures: vec![PluginFailure {
                plugin: "pg".into(),
                error: PluginError::Unreachable {
                    plugin: "pg".into(),
                    target: "127.0.0.1:5432".into(),
                    attempts: 3,
                    source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
                },
            }],
        };
        let rendered = console::render_failure(&err, false);
        assert!(rendered.contains("pg (plugin `pg` could not reach 127.0.0.1:5432 after 3 attempt(s): connection refused)"));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_transport() {
        let mut config = ScriptConfig::default();
        config.protocol = Protocol::Https;
        let mut bootstrap = bootstrap(config);

        let err = bootstrap.run().await.unwrap_err();
        assert!(matches!(err, BootstrapError::Credentials(CredentialError::Missing("key"))));
        assert_eq!(bootstrap.stage(), BootstrapStage::Failed);
        assert_eq!(
            bootstrap.history(),
            &[BootstrapStage::Idle, BootstrapStage::Failed]
        );
    }

    #[tokio::test]
    async fn test_nothing_to_serve_stops_after_registration() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScriptConfig::default();
        config.auto_require_routes = true;
        config.server.routes_dir = dir.path().to_path_buf();
        let mut bootstrap = bootstrap(config);

        let outcome = bootstrap.run().await.unwrap();
        assert!(matches!(outcome, BootstrapOutcome::NothingToServe));
        assert_eq!(bootstrap.stage(), BootstrapStage::RoutesRegistered);
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        let config = ScriptConfig::default();
        let collaborators = Collaborators::from_config(&config).unwrap();
        let mut bootstrap = Bootstrap::new(config, addr, collaborators);

        let err = bootstrap.run().await.unwrap_err();
        assert!(matches!(err, BootstrapError::Bind { addr: a, .. } if a == addr));
        assert_eq!(
            bootstrap.history().last(),
            Some(&BootstrapStage::Failed)
        );
        assert!(bootstrap.history().contains(&BootstrapStage::PluginsSynced));
    }
}
