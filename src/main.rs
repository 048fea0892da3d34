//! Configuration service (v1)
//!
//! Binds layered properties into an immutable `AppConfig` at startup and
//! serves read-only views of it over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!   .properties / .toml ─┐
//!   environment ─────────┼─▶ PropertySource ─▶ Binder ─▶ AppConfig (Arc)
//!   -D KEY=VALUE ────────┘                                   │
//!                                                            ▼
//!   Client ─▶ listener ─▶ request id / trace / timeout ─▶ api handlers ─▶ JSON
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use appconfig::http::HttpServer;
use appconfig::lifecycle::signals::wait_for_termination;
use appconfig::lifecycle::startup::{self, StartupOptions};
use appconfig::lifecycle::Shutdown;
use appconfig::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "appconfig")]
#[command(about = "Serve a typed, read-only view of the application configuration", long_about = None)]
struct Cli {
    /// Config file (.properties or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore environment variables
    #[arg(long)]
    no_env: bool,

    /// Property override, highest precedence (repeatable)
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    define: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let options = StartupOptions {
        config_file: cli.config,
        use_process_env: !cli.no_env,
        overrides: cli.define,
    };

    let settings = match startup::load_settings(&options) {
        Ok(settings) => settings,
        Err(e) => {
            logging::init_logging("info");
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    logging::init_logging(&settings.observability.log_level);
    tracing::info!("appconfig v{} starting", env!("CARGO_PKG_VERSION"));
    startup::report(&settings.app);

    if settings.observability.metrics_enabled {
        if let Ok(addr) = settings.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&settings.server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        request_timeout_secs = settings.server.request_timeout_secs,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::new(settings.app), settings.server);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        wait_for_termination().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
