//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential shape of routes (mount and endpoint paths, methods, status codes)
//! - Detect duplicate route, endpoint, model and field names
//! - Check plugin settings are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over `ScriptConfig`
//! - TLS credential presence is not checked here; the credential loader owns it

use std::collections::HashSet;
use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ModelConfig, RouteConfig, ScriptConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every problem found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Validate the whole script configuration.
pub fn validate_config(config: &ScriptConfig) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    let mut route_names = HashSet::new();
    for route in &config.routes {
        if !route.name.is_empty() && !route_names.insert(route.name.as_str()) {
            errors.push(ValidationError::new(
                format!("routes.{}", route.name),
                "route name is defined more than once",
            ));
        }
        errors.extend(validate_route(route));
    }

    let mut model_names = HashSet::new();
    for model in &config.models {
        if !model_names.insert(model.name.as_str()) {
            errors.push(ValidationError::new(
                format!("models.{}", model.name),
                "model name is defined more than once",
            ));
        }
        errors.extend(validate_model(model));
    }

    for (i, plugin) in config.database_plugins.iter().enumerate() {
        if plugin.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("database_plugins[{}]", i),
                "plugin identifier must not be empty",
            ));
        }
    }

    for (id, settings) in &config.plugins {
        let field = format!("plugins.{}", id);
        match Url::parse(&settings.url) {
            Ok(url) if url.host_str().is_none() => {
                errors.push(ValidationError::new(field.clone(), "url has no host"));
            }
            Ok(_) => {}
            Err(e) => {
                errors.push(ValidationError::new(field.clone(), format!("invalid url: {}", e)));
            }
        }
        if settings.max_attempts == 0 {
            errors.push(ValidationError::new(field, "max_attempts must be at least 1"));
        }
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if config.server.host.parse::<std::net::IpAddr>().is_err() {
        errors.push(ValidationError::new("server.host", "must be an IP address"));
    }
    if let Err(message) = check_literal_path(&config.server.docs_path) {
        errors.push(ValidationError::new("server.docs_path", message));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Validate a single route descriptor.
///
/// Also used for route manifests found by auto-discovery.
pub fn validate_route(route: &RouteConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let field = format!("routes.{}", route.name);

    if route.name.trim().is_empty() {
        errors.push(ValidationError::new("routes", "route name must not be empty"));
    }
    if let Err(message) = check_literal_path(&route.mount_path()) {
        errors.push(ValidationError::new(format!("{}.path", field), message));
    }

    let mut seen = HashSet::new();
    for endpoint in &route.endpoints {
        let endpoint_field = format!("{}.endpoints[{} {}]", field, endpoint.method, endpoint.path);
        if let Err(message) = check_literal_path(&endpoint.path) {
            errors.push(ValidationError::new(endpoint_field.clone(), message));
        }
        match endpoint.method() {
            Some(method) => {
                if !seen.insert((method, endpoint.path.as_str())) {
                    errors.push(ValidationError::new(
                        endpoint_field.clone(),
                        "endpoint is declared more than once",
                    ));
                }
            }
            None => errors.push(ValidationError::new(
                endpoint_field.clone(),
                format!("unsupported method `{}`", endpoint.method),
            )),
        }
        if StatusCode::from_u16(endpoint.status).is_err() {
            errors.push(ValidationError::new(
                endpoint_field,
                format!("invalid status code {}", endpoint.status),
            ));
        }
    }

    errors
}

fn validate_model(model: &ModelConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if model.name.trim().is_empty() {
        errors.push(ValidationError::new("models", "model name must not be empty"));
    }
    let mut fields = HashSet::new();
    for field in &model.fields {
        if !fields.insert(field.name.as_str()) {
            errors.push(ValidationError::new(
                format!("models.{}.{}", model.name, field.name),
                "field is defined more than once",
            ));
        }
    }
    errors
}

/// Paths must be absolute and made of literal segments only.
pub fn check_literal_path(path: &str) -> Result<(), &'static str> {
    if !path.starts_with('/') {
        return Err("path must start with '/'");
    }
    if path.contains(['{', '}', '*']) {
        return Err("path must not contain parameters or wildcards");
    }
    if path.split('/').any(|segment| segment.starts_with(':')) {
        return Err("path segments must not start with ':'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{EndpointConfig, FieldConfig, FieldKind, PluginSettings};

    fn endpoint(method: &str, path: &str, status: u16) -> EndpointConfig {
        EndpointConfig {
            method: method.into(),
            path: path.into(),
            status,
            body: None,
        }
    }

    fn route(name: &str, endpoints: Vec<EndpointConfig>) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            path: None,
            model: None,
            endpoints,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ScriptConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_route_errors() {
        let mut config = ScriptConfig::default();
        config.routes.push(route(
            "user",
            vec![
                endpoint("GET", "/", 200),
                endpoint("get", "/", 200),
                endpoint("PURGE", "/x", 200),
                endpoint("GET", "{id}", 1000),
            ],
        ));
        config.routes.push(route("user", vec![]));

        let errors = validate_config(&config).unwrap_err().0;
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"route name is defined more than once"));
        assert!(messages.contains(&"endpoint is declared more than once"));
        assert!(messages.contains(&"unsupported method `PURGE`"));
        assert!(messages.contains(&"path must start with '/'"));
        assert!(messages.contains(&"invalid status code 1000"));
    }

    #[test]
    fn test_rejects_parameterized_mount_path() {
        let mut r = route("user", vec![]);
        r.path = Some("/user/{id}".into());
        let errors = validate_route(&r);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "routes.user.path");
    }

    #[test]
    fn test_rejects_colon_segments() {
        let mut config = ScriptConfig::default();
        config
            .routes
            .push(route("user", vec![endpoint("GET", "/:id", 200)]));
        let errors = validate_config(&config).unwrap_err().0;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "path segments must not start with ':'");

        let mut r = route("user", vec![]);
        r.path = Some("/user/:id/posts".into());
        assert_eq!(validate_route(&r).len(), 1);

        assert!(check_literal_path("/time/12:30").is_ok());
    }

    #[test]
    fn test_model_and_plugin_errors() {
        let mut config = ScriptConfig::default();
        let field = FieldConfig {
            name: "email".into(),
            kind: FieldKind::String,
            required: true,
        };
        config.models.push(ModelConfig {
            name: "user".into(),
            fields: vec![field.clone(), field],
        });
        config.database_plugins.push(" ".into());
        config.plugins.insert(
            "mongo".into(),
            PluginSettings {
                url: "not a url".into(),
                max_attempts: 0,
                ..PluginSettings::default()
            },
        );

        let errors = validate_config(&config).unwrap_err().0;
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.field == "models.user.email"));
        assert!(errors.iter().any(|e| e.field == "database_plugins[0]"));
        assert!(errors
            .iter()
            .any(|e| e.field == "plugins.mongo" && e.message.starts_with("invalid url")));
    }

    #[test]
    fn test_display_joins_errors() {
        let errors = ValidationErrors(vec![
            ValidationError::new("a", "first"),
            ValidationError::new("b", "second"),
        ]);
        assert_eq!(errors.to_string(), "a: first, b: second");
    }
}
