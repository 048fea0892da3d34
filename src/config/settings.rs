//! Settings for the service process itself.
//!
//! These live beside the application configuration in the same property
//! sources (`server.*`, `observability.*`) and are bound with the same
//! [`Binder`], but every field has a default so a source may omit them.

use serde::Serialize;

use crate::config::binder::Binder;
use crate::config::error::BindingError;
use crate::config::properties::PropertySource;
use crate::config::schema::{fields, AppConfig, Field};

/// Property prefix of the application configuration.
pub const APP_PREFIX: &str = "app.config";
/// Property prefix of the HTTP server settings.
pub const SERVER_PREFIX: &str = "server";
/// Property prefix of the logging and metrics settings.
pub const OBSERVABILITY_PREFIX: &str = "observability";

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset (e.g. "info", "appconfig=debug").
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: false,
            metrics_address: default_metrics_address(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_address() -> String {
    "0.0.0.0:9090".to_string()
}

fn disabled() -> bool {
    false
}

const BIND_ADDRESS: Field<String> =
    Field::with_default("address", default_bind_address).aliased(&["bindAddress"]);
const REQUEST_TIMEOUT_SECS: Field<u64> =
    Field::with_default("requestTimeoutSecs", default_request_timeout_secs);
const LOG_LEVEL: Field<String> = Field::with_default("logLevel", default_log_level);
const METRICS_ENABLED: Field<bool> = Field::with_default("metricsEnabled", disabled);
const METRICS_ADDRESS: Field<String> =
    Field::with_default("metricsAddress", default_metrics_address);

impl ServerConfig {
    /// Bind from the `server.*` scope.
    pub fn bind(properties: &PropertySource) -> Result<Self, BindingError> {
        let binder = Binder::new(properties);
        Ok(Self {
            bind_address: BIND_ADDRESS.resolve(binder.scalar(&BIND_ADDRESS)?)?,
            request_timeout_secs: REQUEST_TIMEOUT_SECS
                .resolve(binder.scalar(&REQUEST_TIMEOUT_SECS)?)?,
        })
    }
}

impl ObservabilityConfig {
    /// Bind from the `observability.*` scope.
    pub fn bind(properties: &PropertySource) -> Result<Self, BindingError> {
        let binder = Binder::new(properties);
        Ok(Self {
            log_level: LOG_LEVEL.resolve(binder.scalar(&LOG_LEVEL)?)?,
            metrics_enabled: METRICS_ENABLED.resolve(binder.scalar(&METRICS_ENABLED)?)?,
            metrics_address: METRICS_ADDRESS.resolve(binder.scalar(&METRICS_ADDRESS)?)?,
        })
    }
}

/// Everything bound at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Bind all three groups from one layered source.
    pub fn bind(properties: &PropertySource) -> Result<Self, BindingError> {
        let app = crate::config::binder::bind(&properties.scoped(APP_PREFIX))
            .map_err(|e| e.within(APP_PREFIX))?;
        let server = ServerConfig::bind(&properties.scoped(SERVER_PREFIX))
            .map_err(|e| e.within(SERVER_PREFIX))?;
        let observability = ObservabilityConfig::bind(&properties.scoped(OBSERVABILITY_PREFIX))
            .map_err(|e| e.within(OBSERVABILITY_PREFIX))?;

        Ok(Self {
            app,
            server,
            observability,
        })
    }

    /// Every aliased field, as the full set of keys that spell it.
    ///
    /// Layering treats each group as one property so a higher layer can
    /// override a value written under another spelling.
    pub fn synonyms() -> Vec<Vec<String>> {
        vec![
            spellings(APP_PREFIX, &fields::ENVIRONMENT),
            spellings(SERVER_PREFIX, &BIND_ADDRESS),
        ]
    }
}

fn spellings<T>(prefix: &str, field: &Field<T>) -> Vec<String> {
    field
        .keys()
        .map(|key| format!("{}.{}", prefix, key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("app.config.name", "demo"),
            ("app.config.version", "1.0.0"),
            ("app.config.environment", "STAGING"),
            ("app.config.database.url", "postgres://db"),
        ]
    }

    fn source(pairs: Vec<(&str, &str)>) -> PropertySource {
        pairs.into_iter().collect()
    }

    #[test]
    fn test_service_settings_default() {
        let settings = Settings::bind(&source(app_pairs())).unwrap();
        assert_eq!(settings.server, ServerConfig::default());
        assert_eq!(settings.observability, ObservabilityConfig::default());
        assert_eq!(settings.app.name(), "demo");
    }

    #[test]
    fn test_service_settings_override() {
        let mut pairs = app_pairs();
        pairs.extend([
            ("server.address", "127.0.0.1:0"),
            ("server.request-timeout-secs", "5"),
            ("observability.log-level", "debug"),
            ("observability.metrics-enabled", "true"),
        ]);
        let settings = Settings::bind(&source(pairs)).unwrap();
        assert_eq!(settings.server.bind_address, "127.0.0.1:0");
        assert_eq!(settings.server.request_timeout_secs, 5);
        assert_eq!(settings.observability.log_level, "debug");
        assert!(settings.observability.metrics_enabled);
    }

    #[test]
    fn test_errors_carry_full_path() {
        let mut pairs = app_pairs();
        pairs.push(("app.config.database.poolSize", "x"));
        let err = Settings::bind(&source(pairs)).unwrap_err();
        assert_eq!(err.field(), "app.config.database.poolSize");

        let mut pairs = app_pairs();
        pairs.push(("server.requestTimeoutSecs", "-1"));
        let err = Settings::bind(&source(pairs)).unwrap_err();
        assert_eq!(err.field(), "server.requestTimeoutSecs");
        assert!(matches!(
            err,
            BindingError::TypeCoercionError { target_type: "non-negative integer", .. }
        ));
    }

    #[test]
    fn test_synonyms_cover_aliased_fields() {
        let synonyms = Settings::synonyms();
        assert!(synonyms.contains(&vec![
            "app.config.environment".to_string(),
            "app.config.mode".to_string(),
        ]));
        assert!(synonyms.contains(&vec![
            "server.address".to_string(),
            "server.bindAddress".to_string(),
        ]));
    }

    #[test]
    fn test_server_default_matches_unset_binding() {
        let bound = ServerConfig::bind(&PropertySource::new()).unwrap();
        assert_eq!(bound, ServerConfig::default());
        assert_eq!(bound.request_timeout_secs, default_request_timeout_secs());
    }
}
