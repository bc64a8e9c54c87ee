//! Route and model registration.
//!
//! # Responsibilities
//! - Apply models, then explicit routes, then discovered routes
//! - Attach the documentation endpoint over the final route set
//! - Decide whether the result is worth serving
//!
//! # Design Decisions
//! - Registration failures are logged and reported as "nothing to serve";
//!   they never abort the process
//! - Discovered routes never override explicitly configured ones

use std::collections::HashSet;

use crate::config::{RouteConfig, ScriptConfig};
use crate::http::app::Application;
use crate::observability::metrics;
use crate::routing::source::RouteSource;
use crate::routing::{docs, RegistrationError};

/// Result of a registration pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationOutcome {
    /// Whether the server should go on to listen.
    pub should_start_server: bool,
    /// Routes with at least one endpoint (docs excluded).
    pub routes: usize,
    /// Endpoints registered (docs excluded).
    pub endpoints: usize,
    /// Path of the documentation endpoint, if attached.
    pub docs_path: Option<String>,
}

impl RegistrationOutcome {
    fn nothing_to_serve() -> Self {
        Self::default()
    }
}

/// Apply the configured models and routes to `app`.
pub async fn register(
    app: &mut Application,
    source: &dyn RouteSource,
    config: &ScriptConfig,
) -> RegistrationOutcome {
    match apply(app, source, config).await {
        Ok(outcome) => {
            metrics::record_routes_registered(outcome.endpoints);
            tracing::info!(
                routes = outcome.routes,
                endpoints = outcome.endpoints,
                models = app.models().len(),
                docs = outcome.docs_path.is_some(),
                should_start_server = outcome.should_start_server,
                "Registration complete"
            );
            outcome
        }
        Err(e) => {
            tracing::error!(error = %e, cause = ?std::error::Error::source(&e), "Registration failed, nothing to serve");
            RegistrationOutcome::nothing_to_serve()
        }
    }
}

async fn apply(
    app: &mut Application,
    source: &dyn RouteSource,
    config: &ScriptConfig,
) -> Result<RegistrationOutcome, RegistrationError> {
    for model in &config.models {
        app.register_model(model)?;
    }

    let mut applied = HashSet::new();
    for route in &config.routes {
        apply_route(app, source, route)?;
        applied.insert(route.name.clone());
    }

    if config.auto_require_routes {
        for route in source.discover().await? {
            if applied.contains(&route.name) {
                tracing::debug!(route = %route.name, "Discovered route already configured, skipping");
                continue;
            }
            apply_route(app, source, &route)?;
            applied.insert(route.name.clone());
        }
    }

    let explicitly_empty =
        config.routes.is_empty() && config.models.is_empty() && !config.auto_require_routes;
    let should_start_server = !app.routes().is_empty() || explicitly_empty;

    let routes = app.routes().route_count();
    let endpoints = app.routes().len();

    let mut docs_path = None;
    if should_start_server && config.register_docs_route {
        let document = docs::build_document(app.routes(), app.models());
        app.add_endpoint(docs::docs_endpoint(&config.server.docs_path, document))?;
        docs_path = Some(config.server.docs_path.clone());
    }

    Ok(RegistrationOutcome {
        should_start_server,
        routes,
        endpoints,
        docs_path,
    })
}

fn apply_route(
    app: &mut Application,
    source: &dyn RouteSource,
    route: &RouteConfig,
) -> Result<(), RegistrationError> {
    let endpoints = source.resolve(route, app.models())?;
    for endpoint in endpoints {
        app.add_endpoint(endpoint)?;
    }
    Ok(())
}
