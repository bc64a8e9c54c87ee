//! The application under construction.
//!
//! # Responsibilities
//! - Own the router, route table and model registry while the bootstrap runs
//! - Enforce ordering: middleware first, then models and routes
//! - Produce the final router with the middleware stack around every route
//!
//! # Design Decisions
//! - Type-state: only `Application<Guarded>` can register routes, and the
//!   only way to get one is to attach middleware
//! - Middleware is applied in `into_router`, after the last route, so no
//!   route can exist outside the stack

use std::marker::PhantomData;

use axum::Router;

use crate::config::validation::check_literal_path;
use crate::config::ModelConfig;
use crate::http::middleware::MiddlewareStack;
use crate::routing::{Endpoint, ModelRegistry, RegistrationError, RouteTable};

/// No middleware attached yet.
#[derive(Debug)]
pub struct Unguarded;

/// Middleware attached; routes may be registered.
#[derive(Debug)]
pub struct Guarded;

/// Application builder threaded through the bootstrap stages.
pub struct Application<S = Guarded> {
    router: Router,
    middleware: MiddlewareStack,
    routes: RouteTable,
    models: ModelRegistry,
    _state: PhantomData<S>,
}

impl Application<Unguarded> {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            middleware: MiddlewareStack::new(),
            routes: RouteTable::default(),
            models: ModelRegistry::new(),
            _state: PhantomData,
        }
    }

    /// Attach the middleware stack, unlocking registration.
    pub fn guard(self, middleware: MiddlewareStack) -> Application<Guarded> {
        tracing::debug!(layers = ?middleware.names(), "Middleware attached");
        Application {
            router: self.router,
            middleware,
            routes: self.routes,
            models: self.models,
            _state: PhantomData,
        }
    }
}

impl Default for Application<Unguarded> {
    fn default() -> Self {
        Self::new()
    }
}

impl Application<Guarded> {
    pub fn register_model(&mut self, model: &ModelConfig) -> Result<(), RegistrationError> {
        self.models.register(model)
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Add an endpoint. Fails without touching the router on a conflict or
    /// a path the router would reject.
    pub fn add_endpoint(&mut self, endpoint: Endpoint) -> Result<(), RegistrationError> {
        check_literal_path(&endpoint.path).map_err(|reason| RegistrationError::InvalidPath {
            path: endpoint.path.clone(),
            reason,
        })?;
        self.routes.insert(&endpoint)?;
        let router = std::mem::take(&mut self.router);
        self.router = router.route(&endpoint.path, endpoint.handler);
        tracing::debug!(method = %endpoint.method, path = %endpoint.path, route = %endpoint.route, "Endpoint registered");
        Ok(())
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn middleware(&self) -> &MiddlewareStack {
        &self.middleware
    }

    /// Finish the application: every route wrapped in the middleware stack.
    pub fn into_router(self) -> Router {
        self.middleware.apply(self.router)
    }
}
