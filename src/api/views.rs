//! Serializable views derived from the bound configuration.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{AppConfig, Environment};

/// Flattened database fields reported in [`StatusView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSummary {
    pub url: String,
    pub pool_size: i32,
    pub timeout: i64,
}

/// Point-in-time status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub name: String,
    pub version: String,
    pub mode: String,
    pub timestamp: DateTime<Utc>,
    pub enabled: bool,
    pub database: DatabaseSummary,
}

impl StatusView {
    pub fn capture(config: &AppConfig, timestamp: DateTime<Utc>) -> Self {
        let db = config.database();
        Self {
            name: config.name().to_string(),
            version: config.version().to_string(),
            mode: config.environment().to_string(),
            timestamp,
            enabled: config.enabled(),
            database: DatabaseSummary {
                url: db.url().to_string(),
                pool_size: db.pool_size(),
                timeout: db.timeout(),
            },
        }
    }
}

/// Mode-dependent payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EnvironmentView {
    #[serde(rename_all = "camelCase")]
    Development { connection_count: i32 },
    #[serde(rename_all = "camelCase")]
    Production {
        database_url: String,
        token_expiration: i64,
    },
    #[serde(rename_all = "camelCase")]
    NonProduction {
        message: String,
        environment_name: String,
    },
}

impl EnvironmentView {
    pub fn for_config(config: &AppConfig) -> Self {
        let environment = config.environment();
        match environment {
            Environment::Development => EnvironmentView::Development {
                connection_count: config.max_connections(),
            },
            Environment::Production => EnvironmentView::Production {
                database_url: config.database().url().to_string(),
                token_expiration: config.security().token_expiration(),
            },
            Environment::Testing | Environment::Staging => EnvironmentView::NonProduction {
                message: "Non-production environment".to_string(),
                environment_name: environment.to_string(),
            },
        }
    }
}

/// Lightweight description of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigInfo {
    pub name: String,
    pub version: String,
    pub environment: Environment,
    pub formats: Vec<String>,
}

impl ConfigInfo {
    pub fn of(config: &AppConfig) -> Self {
        Self {
            name: config.name().to_string(),
            version: config.version().to_string(),
            environment: config.environment(),
            formats: config.supported_formats().to_vec(),
        }
    }
}

/// One-line summary logged at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSummary {
    pub name: String,
    pub version: String,
    pub connection_count: i32,
}

impl AppSummary {
    pub fn of(config: &AppConfig) -> Self {
        Self {
            name: config.name().to_string(),
            version: config.version().to_string(),
            connection_count: config.max_connections(),
        }
    }
}

impl fmt::Display for AppSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} ({} connections)",
            self.name, self.version, self.connection_count
        )
    }
}
