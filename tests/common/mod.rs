//! Shared utilities for bootstrap integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use app_bootstrap::config::{EndpointConfig, RouteConfig, ScriptConfig};
use app_bootstrap::http::{Application, DefaultMiddleware, Guarded, MiddlewareAttacher, Unguarded};
use app_bootstrap::lifecycle::Collaborators;
use app_bootstrap::net::Transport;
use app_bootstrap::plugins::{PluginError, PluginRegistry};
use app_bootstrap::routing::ManifestRouteSource;

/// Default middleware that counts how often it is attached.
pub struct CountingMiddleware {
    inner: DefaultMiddleware,
    pub calls: AtomicUsize,
}

impl MiddlewareAttacher for CountingMiddleware {
    fn attach(&self, app: Application<Unguarded>, transport: &Transport) -> Application<Guarded> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.attach(app, transport)
    }
}

/// Collaborators for `config` with a caller-built plugin registry.
pub fn collaborators(
    config: &ScriptConfig,
    plugins: PluginRegistry,
) -> (Collaborators, Arc<CountingMiddleware>) {
    let middleware = Arc::new(CountingMiddleware {
        inner: DefaultMiddleware::new(&config.server),
        calls: AtomicUsize::new(0),
    });
    let collaborators = Collaborators {
        plugins: Arc::new(plugins),
        routes: Arc::new(ManifestRouteSource::new(config.server.routes_dir.clone())),
        middleware: middleware.clone(),
    };
    (collaborators, middleware)
}

/// Register a plugin that counts invocations, optionally sleeps, then settles.
pub fn counting_plugin(
    registry: &mut PluginRegistry,
    id: &str,
    calls: &Arc<AtomicUsize>,
    delay: Duration,
    fail: bool,
) {
    let calls = calls.clone();
    registry.register(id, move || {
        let calls = calls.clone();
        async move {
            tokio::time::sleep(delay).await;
            calls.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(PluginError::Failed("connection refused".into()))
            } else {
                Ok(())
            }
        }
    });
}

pub fn user_route() -> RouteConfig {
    RouteConfig {
        name: "user".into(),
        path: None,
        model: None,
        endpoints: vec![EndpointConfig {
            method: "GET".into(),
            path: "/".into(),
            status: 200,
            body: Some(serde_json::json!({ "users": [] })),
        }],
    }
}

pub fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}
