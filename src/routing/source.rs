//! Route sources: turning route descriptors into endpoints.
//!
//! # Responsibilities
//! - Resolve a configured route descriptor into routable endpoints
//! - Discover additional route manifests from the conventional directory
//!
//! # Design Decisions
//! - Endpoints answer with the response declared in the descriptor
//! - Model-bound routes also expose `GET {mount}/_schema`
//! - Manifests are read in file-name order so discovery is deterministic

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, on, MethodFilter};
use axum::Json;
use serde::Deserialize;

use crate::config::validation::{validate_route, ValidationErrors};
use crate::config::{EndpointConfig, RouteConfig};
use crate::routing::models::ModelRegistry;
use crate::routing::{Endpoint, RegistrationError};

/// Supplies endpoints for route descriptors.
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Resolve a route descriptor against the registered models.
    fn resolve(
        &self,
        route: &RouteConfig,
        models: &ModelRegistry,
    ) -> Result<Vec<Endpoint>, RegistrationError>;

    /// Find route descriptors in the conventional location.
    async fn discover(&self) -> Result<Vec<RouteConfig>, RegistrationError>;
}

/// Default source: static endpoints from config, manifests from a directory.
#[derive(Debug, Clone)]
pub struct ManifestRouteSource {
    routes_dir: PathBuf,
}

impl ManifestRouteSource {
    pub fn new(routes_dir: impl Into<PathBuf>) -> Self {
        Self {
            routes_dir: routes_dir.into(),
        }
    }

    pub fn routes_dir(&self) -> &Path {
        &self.routes_dir
    }
}

#[async_trait]
impl RouteSource for ManifestRouteSource {
    fn resolve(
        &self,
        route: &RouteConfig,
        models: &ModelRegistry,
    ) -> Result<Vec<Endpoint>, RegistrationError> {
        resolve_static(route, models)
    }

    async fn discover(&self) -> Result<Vec<RouteConfig>, RegistrationError> {
        let dir = &self.routes_dir;
        let discovery_err = |source| RegistrationError::Discovery {
            dir: dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(discovery_err)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(discovery_err)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut routes = Vec::with_capacity(paths.len());
        for path in paths {
            let content = tokio::fs::read_to_string(&path).await.map_err(|source| {
                RegistrationError::UnreadableManifest {
                    path: path.clone(),
                    source,
                }
            })?;
            let manifest: RouteManifest =
                toml::from_str(&content).map_err(|source| RegistrationError::InvalidManifest {
                    path: path.clone(),
                    source,
                })?;
            let route = manifest.into_route(&path);
            let errors = validate_route(&route);
            if !errors.is_empty() {
                return Err(RegistrationError::ManifestValidation {
                    path,
                    errors: ValidationErrors(errors),
                });
            }
            tracing::debug!(route = %route.name, manifest = %path.display(), "Route manifest discovered");
            routes.push(route);
        }

        tracing::info!(dir = %dir.display(), routes = routes.len(), "Route discovery complete");
        Ok(routes)
    }
}

/// A route descriptor file. The name defaults to the file stem.
#[derive(Debug, Deserialize)]
struct RouteManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    endpoints: Vec<EndpointConfig>,
}

impl RouteManifest {
    fn into_route(self, file: &Path) -> RouteConfig {
        let name = self.name.unwrap_or_else(|| {
            file.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        RouteConfig {
            name,
            path: self.path,
            model: self.model,
            endpoints: self.endpoints,
        }
    }
}

/// Build the endpoints declared by a route descriptor.
pub fn resolve_static(
    route: &RouteConfig,
    models: &ModelRegistry,
) -> Result<Vec<Endpoint>, RegistrationError> {
    let model = match &route.model {
        Some(name) => Some(models.get(name).ok_or_else(|| RegistrationError::UnknownModel {
            route: route.name.clone(),
            model: name.clone(),
        })?),
        None => None,
    };

    let mount = route.mount_path();
    let mut endpoints = Vec::with_capacity(route.endpoints.len() + 1);

    for endpoint in &route.endpoints {
        let unsupported = || RegistrationError::UnsupportedMethod {
            route: route.name.clone(),
            method: endpoint.method.clone(),
        };
        let method = endpoint.method().ok_or_else(unsupported)?;
        let filter = MethodFilter::try_from(method.clone()).map_err(|_| unsupported())?;
        let status =
            StatusCode::from_u16(endpoint.status).map_err(|_| RegistrationError::InvalidStatus {
                route: route.name.clone(),
                status: endpoint.status,
            })?;

        let body = endpoint.body.clone();
        let handler = on(filter, move || {
            let body = body.clone();
            async move { static_response(status, body) }
        });

        endpoints.push(Endpoint {
            method,
            path: join_paths(&mount, &endpoint.path),
            route: route.name.clone(),
            model: route.model.clone(),
            handler,
        });
    }

    if let Some(model) = model {
        let schema = model.clone();
        endpoints.push(Endpoint {
            method: Method::GET,
            path: join_paths(&mount, "/_schema"),
            route: route.name.clone(),
            model: Some(model.name.clone()),
            handler: get(move || {
                let schema = schema.clone();
                async move { Json(schema) }
            }),
        });
    }

    Ok(endpoints)
}

fn static_response(status: StatusCode, body: Option<serde_json::Value>) -> Response {
    match body {
        None => status.into_response(),
        Some(serde_json::Value::String(text)) => (status, text).into_response(),
        Some(value) => (status, Json(value)).into_response(),
    }
}

/// Join a mount path and a relative endpoint path.
pub fn join_paths(mount: &str, relative: &str) -> String {
    let mount = mount.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    match (mount.is_empty(), relative.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => mount.to_string(),
        (true, false) => format!("/{}", relative),
        (false, false) => format!("{}/{}", mount, relative),
    }
}
