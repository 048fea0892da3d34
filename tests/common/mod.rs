//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use appconfig::config::{AppConfig, ServerConfig};
use appconfig::{bind, HttpServer, PropertySource, Shutdown};
use tokio::net::TcpListener;

/// A configuration service running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub url: String,
    shutdown: Shutdown,
}

impl TestServer {
    /// Bind `pairs` and serve the result.
    pub async fn start(pairs: &[(&str, &str)]) -> Self {
        let source: PropertySource = pairs.iter().copied().collect();
        let config = bind(&source).expect("test properties must bind");
        Self::serve(config).await
    }

    pub async fn serve(config: AppConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server_config = ServerConfig {
            bind_address: addr.to_string(),
            request_timeout_secs: 5,
        };
        let server = HttpServer::new(Arc::new(config), server_config);

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        // Give the accept loop a moment to start.
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            addr,
            url: format!("http://{}", addr),
            shutdown,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// The end-to-end property set used across tests.
#[allow(dead_code)]
pub fn development_properties() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Test Config"),
        ("version", "0.1.0"),
        ("enabled", "true"),
        ("maxConnections", "50"),
        ("environment", "DEVELOPMENT"),
        ("database.url", "jdbc:h2:mem:test"),
        ("database.poolSize", "5"),
        ("security.enabled", "true"),
        ("security.tokenExpiration", "1800"),
    ]
}

/// `development_properties` with the mode replaced.
#[allow(dead_code)]
pub fn properties_for(mode: &'static str) -> Vec<(&'static str, &'static str)> {
    development_properties()
        .into_iter()
        .map(|(k, v)| if k == "environment" { (k, mode) } else { (k, v) })
        .collect()
}
