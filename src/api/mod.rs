//! Read-only HTTP surface over the bound configuration.
//!
//! | Route | Body |
//! |---|---|
//! | `GET /api/config` | full configuration |
//! | `GET /api/config/database` | database group |
//! | `GET /api/config/security` | security group |
//! | `GET /api/config/status` | status snapshot |
//! | `GET /api/config/environment-info` | mode-dependent payload |
//! | `GET /health` | liveness |

pub mod accessor;
pub mod handlers;
pub mod views;

use axum::{routing::get, Router};

use self::handlers::*;

pub use accessor::ConfigAccessor;
pub use views::{AppSummary, ConfigInfo, DatabaseSummary, EnvironmentView, StatusView};

pub fn setup_config_router(accessor: ConfigAccessor) -> Router {
    Router::new()
        .route("/api/config", get(get_config))
        .route("/api/config/database", get(get_database))
        .route("/api/config/security", get(get_security))
        .route("/api/config/status", get(get_status))
        .route("/api/config/environment-info", get(get_environment_info))
        .route("/health", get(get_health))
        .with_state(accessor)
}
