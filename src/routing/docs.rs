//! Documentation endpoint.
//!
//! Serves a JSON description of every registered endpoint and model. Built
//! from the final route table, so it must be attached last.

use axum::http::Method;
use axum::routing::get;
use axum::Json;
use serde::Serialize;

use crate::config::ModelConfig;
use crate::routing::models::ModelRegistry;
use crate::routing::{Endpoint, EndpointDoc, RouteTable};

/// Route name used for the documentation endpoint.
pub const DOCS_ROUTE: &str = "docs";

#[derive(Debug, Clone, Serialize)]
pub struct ApiDocument {
    pub title: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<EndpointDoc>,
    pub models: Vec<ModelConfig>,
}

/// Snapshot the route table and models into a document.
pub fn build_document(routes: &RouteTable, models: &ModelRegistry) -> ApiDocument {
    ApiDocument {
        title: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: routes.entries().to_vec(),
        models: models.iter().cloned().collect(),
    }
}

/// Endpoint serving `document` at `path`.
pub fn docs_endpoint(path: &str, document: ApiDocument) -> Endpoint {
    Endpoint {
        method: Method::GET,
        path: path.to_string(),
        route: DOCS_ROUTE.to_string(),
        model: None,
        handler: get(move || {
            let document = document.clone();
            async move { Json(document) }
        }),
    }
}
