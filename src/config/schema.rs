//! Configuration schema definitions.
//!
//! This module defines the complete script configuration for the server.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::http::Method;
use axum::routing::MethodFilter;
use serde::{Deserialize, Serialize};

/// Root configuration for a bootstrap run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ScriptConfig {
    /// Transport protocol for the listener.
    pub protocol: Protocol,

    /// Explicit route definitions, applied in order.
    pub routes: Vec<RouteConfig>,

    /// Data model definitions, applied before any route.
    pub models: Vec<ModelConfig>,

    /// Discover additional routes from the routes directory.
    pub auto_require_routes: bool,

    /// Attach the documentation endpoint after all routes.
    pub register_docs_route: bool,

    /// TLS material paths (only read for `https`).
    pub credentials: CredentialsConfig,

    /// Database plugins to synchronize before listening.
    pub database_plugins: Vec<String>,

    /// Per-plugin settings keyed by plugin identifier.
    pub plugins: BTreeMap<String, PluginSettings>,

    /// Server surface settings (host, middleware limits, docs path).
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    /// URL scheme for operator-facing output.
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// TLS credential file paths.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Path to the private key file (PEM).
    pub key: Option<PathBuf>,

    /// Path to the certificate chain file (PEM).
    pub cert: Option<PathBuf>,

    /// Passphrase for the private key, if any.
    pub passphrase: Option<String>,
}

/// A route descriptor: a named group of endpoints mounted under one path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging and docs.
    pub name: String,

    /// Mount path. Defaults to `/{name}`.
    #[serde(default)]
    pub path: Option<String>,

    /// Model this route serves, if any.
    #[serde(default)]
    pub model: Option<String>,

    /// Endpoints relative to the mount path.
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl RouteConfig {
    /// The path this route is mounted under.
    pub fn mount_path(&self) -> String {
        match &self.path {
            Some(path) => path.clone(),
            None => format!("/{}", self.name),
        }
    }
}

/// A single endpoint with a fixed response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// HTTP method (case-insensitive).
    #[serde(default = "default_method")]
    pub method: String,

    /// Path relative to the route's mount path.
    #[serde(default = "default_endpoint_path")]
    pub path: String,

    /// Response status code.
    #[serde(default = "default_status")]
    pub status: u16,

    /// Response body. Strings are sent as text, everything else as JSON.
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

impl EndpointConfig {
    /// Parsed method, if it is one the router can dispatch on.
    pub fn method(&self) -> Option<Method> {
        let method = Method::from_bytes(self.method.to_ascii_uppercase().as_bytes()).ok()?;
        MethodFilter::try_from(method.clone()).ok().map(|_| method)
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_endpoint_path() -> String {
    "/".to_string()
}

fn default_status() -> u16 {
    200
}

/// A data model descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Model name, referenced by routes.
    pub name: String,

    /// Field definitions.
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// A model field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,
}

/// Supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Json,
}

/// Settings for the built-in datastore readiness plugin.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Datastore URL, e.g. `postgres://127.0.0.1:5432/app`.
    pub url: String,

    /// Connection attempts before the sync fails.
    pub max_attempts: u32,

    /// Per-attempt connect timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_attempts: 5,
            connect_timeout_ms: 2000,
            base_delay_ms: 200,
            max_delay_ms: 5000,
        }
    }
}

/// Server surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host (IP address).
    pub host: String,

    /// Path of the documentation endpoint.
    pub docs_path: String,

    /// Conventional directory scanned when `auto_require_routes` is set.
    pub routes_dir: PathBuf,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Allow cross-origin requests from any origin.
    pub cors: bool,
}

impl ServerConfig {
    /// Socket address to listen on for the given port.
    pub fn listen_addr(&self, port: u16) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            docs_path: "/docs".to_string(),
            routes_dir: PathBuf::from("routes"),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            cors: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
