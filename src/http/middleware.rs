//! Cross-cutting request middleware.
//!
//! # Responsibilities
//! - Collect the middleware stack before any route is registered
//! - Let the stack observe the constructed transport (HSTS only over TLS)
//! - Wrap the finished router
//!
//! # Design Decisions
//! - Layers are recorded as router transforms and applied after the last
//!   route, because axum only wraps routes that already exist
//! - First pushed is outermost

use std::time::Duration;

use axum::http::{header, HeaderValue};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Protocol, ServerConfig};
use crate::http::app::{Application, Guarded, Unguarded};
use crate::net::Transport;

type Wrap = Box<dyn FnOnce(Router) -> Router + Send>;

/// Ordered set of router transforms.
#[derive(Default)]
pub struct MiddlewareStack {
    layers: Vec<(&'static str, Wrap)>,
}

impl MiddlewareStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named layer. Earlier layers wrap later ones.
    pub fn push(&mut self, name: &'static str, wrap: impl FnOnce(Router) -> Router + Send + 'static) {
        self.layers.push((name, Box::new(wrap)));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wrap `router` so the first pushed layer is outermost.
    pub fn apply(self, router: Router) -> Router {
        self.layers
            .into_iter()
            .rev()
            .fold(router, |router, (_, wrap)| wrap(router))
    }
}

impl std::fmt::Debug for MiddlewareStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Applies middleware to a fresh application.
pub trait MiddlewareAttacher: Send + Sync {
    fn attach(&self, app: Application<Unguarded>, transport: &Transport) -> Application<Guarded>;
}

/// Default stack: request id, tracing, timeout, body limit, CORS, security headers.
#[derive(Debug, Clone)]
pub struct DefaultMiddleware {
    request_timeout: Duration,
    max_body_bytes: usize,
    cors: bool,
}

impl DefaultMiddleware {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_body_bytes: config.max_body_bytes,
            cors: config.cors,
        }
    }

    /// Build the stack for a transport speaking `protocol`.
    #[allow(deprecated)]
    pub fn stack(&self, protocol: Protocol) -> MiddlewareStack {
        let mut stack = MiddlewareStack::new();

        stack.push("request-id", |router| {
            router
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        });
        stack.push("trace", |router| router.layer(TraceLayer::new_for_http()));

        let timeout = self.request_timeout;
        stack.push("timeout", move |router| router.layer(TimeoutLayer::new(timeout)));

        let limit = self.max_body_bytes;
        stack.push("body-limit", move |router| {
            router.layer(RequestBodyLimitLayer::new(limit))
        });

        if self.cors {
            stack.push("cors", |router| router.layer(CorsLayer::permissive()));
        }

        stack.push("nosniff", |router| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
        });

        if protocol == Protocol::Https {
            stack.push("strict-transport-security", |router| {
                router.layer(SetResponseHeaderLayer::if_not_present(
                    header::STRICT_TRANSPORT_SECURITY,
                    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
                ))
            });
        }

        stack
    }
}

impl MiddlewareAttacher for DefaultMiddleware {
    fn attach(&self, app: Application<Unguarded>, transport: &Transport) -> Application<Guarded> {
        app.guard(self.stack(transport.protocol()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Endpoint;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::routing::{get, post};
    use tower::ServiceExt;

    fn middleware(cors: bool) -> DefaultMiddleware {
        DefaultMiddleware::new(&ServerConfig {
            cors,
            max_body_bytes: 8,
            ..ServerConfig::default()
        })
    }

    fn endpoint(method: Method, path: &str, handler: axum::routing::MethodRouter) -> Endpoint {
        Endpoint {
            method,
            path: path.into(),
            route: "test".into(),
            model: None,
            handler,
        }
    }

    #[test]
    fn test_stack_order_and_transport_awareness() {
        let http = middleware(true).stack(Protocol::Http);
        assert_eq!(
            http.names(),
            vec!["request-id", "trace", "timeout", "body-limit", "cors", "nosniff"]
        );

        let https = middleware(false).stack(Protocol::Https);
        assert!(!https.names().contains(&"cors"));
        assert_eq!(https.names().last(), Some(&"strict-transport-security"));
    }

    #[test]
    fn test_apply_order_first_is_outermost() {
        let order = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut stack = MiddlewareStack::new();
        for name in ["outer", "inner"] {
            let order = order.clone();
            stack.push(name, move |router| {
                order.lock().unwrap().push(name);
                router
            });
        }
        stack.apply(Router::new());
        // Inner layers are applied to the router first.
        assert_eq!(*order.lock().unwrap(), vec!["inner", "outer"]);
    }

    #[tokio::test]
    async fn test_default_stack_headers() {
        let mut app = Application::new().guard(middleware(false).stack(Protocol::Https));
        app.add_endpoint(endpoint(Method::GET, "/", get(|| async { "ok" })))
            .unwrap();
        let router = app.into_router();

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(response
            .headers()
            .contains_key(header::STRICT_TRANSPORT_SECURITY));
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let mut app = Application::new().guard(middleware(false).stack(Protocol::Http));
        app.add_endpoint(endpoint(
            Method::POST,
            "/upload",
            post(|body: String| async move { body }),
        ))
        .unwrap();
        let router = app.into_router();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/upload")
                    .header(header::CONTENT_LENGTH, "32")
                    .body(Body::from("x".repeat(32)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!response
            .headers()
            .contains_key(header::STRICT_TRANSPORT_SECURITY));
    }
}
