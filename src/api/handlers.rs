use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::accessor::ConfigAccessor;
use crate::api::views::{EnvironmentView, StatusView};
use crate::config::{AppConfig, DatabaseConfig, SecurityConfig};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn get_config(State(accessor): State<ConfigAccessor>) -> Json<AppConfig> {
    Json(accessor.full().clone())
}

pub async fn get_database(State(accessor): State<ConfigAccessor>) -> Json<DatabaseConfig> {
    Json(accessor.database().clone())
}

pub async fn get_security(State(accessor): State<ConfigAccessor>) -> Json<SecurityConfig> {
    Json(accessor.security().clone())
}

pub async fn get_status(State(accessor): State<ConfigAccessor>) -> Json<StatusView> {
    Json(accessor.status())
}

pub async fn get_environment_info(
    State(accessor): State<ConfigAccessor>,
) -> Json<EnvironmentView> {
    Json(accessor.environment_info())
}

pub async fn get_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "UP",
        version: env!("CARGO_PKG_VERSION"),
    })
}
