//! Route and model registration subsystem.
//!
//! # Data Flow
//! ```text
//! ScriptConfig { models, routes, auto_require_routes, register_docs_route }
//!     → models.rs (register model definitions first)
//!     → source.rs (resolve explicit routes into endpoints)
//!     → source.rs (discover route manifests, if enabled)
//!     → docs.rs (documentation endpoint over the final route set)
//!     → registrar.rs (RegistrationOutcome: should the server start?)
//! ```
//!
//! # Design Decisions
//! - Models before routes, docs after everything else
//! - Every (method, path) pair is registered at most once; conflicts are
//!   caught here instead of panicking inside the router
//! - A registration problem means "nothing to serve", not a startup error

pub mod docs;
pub mod models;
pub mod registrar;
pub mod source;

use std::collections::HashSet;
use std::path::PathBuf;

use axum::http::Method;
use axum::routing::MethodRouter;
use serde::Serialize;
use thiserror::Error;

use crate::config::validation::ValidationErrors;

pub use models::ModelRegistry;
pub use registrar::{register, RegistrationOutcome};
pub use source::{ManifestRouteSource, RouteSource};

/// Errors raised while applying routes and models.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("model `{0}` is defined more than once")]
    DuplicateModel(String),

    #[error("route `{route}` references unknown model `{model}`")]
    UnknownModel { route: String, model: String },

    #[error("cannot register `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("{method} {path} is already registered")]
    DuplicateEndpoint { method: Method, path: String },

    #[error("route `{route}` declares unsupported method `{method}`")]
    UnsupportedMethod { route: String, method: String },

    #[error("route `{route}` declares invalid status {status}")]
    InvalidStatus { route: String, status: u16 },

    #[error("failed to read routes directory {}", .dir.display())]
    Discovery {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read route manifest {}", .path.display())]
    UnreadableManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse route manifest {}", .path.display())]
    InvalidManifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("route manifest {} failed validation: {}", .path.display(), .errors)]
    ManifestValidation {
        path: PathBuf,
        errors: ValidationErrors,
    },
}

/// A routable endpoint produced by a [`RouteSource`].
pub struct Endpoint {
    pub method: Method,
    /// Absolute path.
    pub path: String,
    /// Name of the route this endpoint belongs to.
    pub route: String,
    pub model: Option<String>,
    pub handler: MethodRouter,
}

impl Endpoint {
    fn doc(&self) -> EndpointDoc {
        EndpointDoc {
            method: self.method.to_string(),
            path: self.path.clone(),
            route: self.route.clone(),
            model: self.model.clone(),
        }
    }
}

/// Documentation entry for a registered endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointDoc {
    pub method: String,
    pub path: String,
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Registered endpoints in registration order.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<EndpointDoc>,
    keys: HashSet<(Method, String)>,
}

impl RouteTable {
    /// Record an endpoint. Fails if its method and path are already taken.
    pub(crate) fn insert(&mut self, endpoint: &Endpoint) -> Result<(), RegistrationError> {
        if !self
            .keys
            .insert((endpoint.method.clone(), endpoint.path.clone()))
        {
            return Err(RegistrationError::DuplicateEndpoint {
                method: endpoint.method.clone(),
                path: endpoint.path.clone(),
            });
        }
        self.entries.push(endpoint.doc());
        Ok(())
    }

    pub fn entries(&self) -> &[EndpointDoc] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct routes with at least one endpoint.
    pub fn route_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.route.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}
