//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the configuration API
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Serve on a bound listener until shutdown is signalled

use axum::{http::StatusCode, middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::api::{setup_config_router, ConfigAccessor};
use crate::config::{AppConfig, ServerConfig};
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::observability::metrics;

/// HTTP server for the configuration API.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `app` with the given server settings.
    pub fn new(app: Arc<AppConfig>, config: ServerConfig) -> Self {
        let accessor = ConfigAccessor::new(app);
        let router = Self::build_router(&config, accessor);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, accessor: ConfigAccessor) -> Router {
        setup_config_router(accessor)
            .route_layer(middleware::from_fn(metrics::track_requests))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.request_timeout_secs),
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the server settings.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, Environment, SecurityConfig};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let app = AppConfig::builder()
            .name("in-process")
            .version("0.0.1")
            .environment(Environment::Staging)
            .database(DatabaseConfig::builder().url("jdbc:h2:mem:x").build().unwrap())
            .security(SecurityConfig::builder().build().unwrap())
            .build()
            .unwrap();
        HttpServer::new(Arc::new(app), ServerConfig::default())
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value, bool) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let has_request_id = response.headers().contains_key("x-request-id");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json, has_request_id)
    }

    #[tokio::test]
    async fn test_router_serves_views() {
        let server = server();

        let (status, json, has_request_id) = get(server.router(), "/api/config").await;
        assert_eq!(status, StatusCode::OK);
        assert!(has_request_id);
        assert_eq!(json["name"], "in-process");
        assert_eq!(json["environment"], "STAGING");
        assert_eq!(json["security"]["tokenExpiration"], 3600);

        let (_, json, _) = get(server.router(), "/api/config/environment-info").await;
        assert_eq!(json["type"], "non-production");
        assert_eq!(json["environmentName"], "STAGING");

        let (_, json, _) = get(server.router(), "/api/config/status").await;
        assert_eq!(json["mode"], "STAGING");
        assert_eq!(json["database"]["url"], "jdbc:h2:mem:x");
    }

    #[tokio::test]
    async fn test_router_unknown_path() {
        let (status, _, _) = get(server().router(), "/api/config/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
