//! Read-only façade over the bound configuration.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::views::{ConfigInfo, EnvironmentView, StatusView};
use crate::config::{AppConfig, DatabaseConfig, SecurityConfig};

/// Cheap-to-clone accessor shared by every request handler.
///
/// Every operation is a pure read of the immutable configuration; the only
/// time-varying output is the status timestamp.
#[derive(Debug, Clone)]
pub struct ConfigAccessor {
    config: Arc<AppConfig>,
}

impl ConfigAccessor {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }

    pub fn full(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &DatabaseConfig {
        self.config.database()
    }

    pub fn security(&self) -> &SecurityConfig {
        self.config.security()
    }

    /// Status snapshot stamped with the current time.
    pub fn status(&self) -> StatusView {
        self.status_at(Utc::now())
    }

    pub fn status_at(&self, timestamp: DateTime<Utc>) -> StatusView {
        StatusView::capture(&self.config, timestamp)
    }

    pub fn environment_info(&self) -> EnvironmentView {
        EnvironmentView::for_config(&self.config)
    }

    pub fn summary(&self) -> ConfigInfo {
        ConfigInfo::of(&self.config)
    }
}

impl From<AppConfig> for ConfigAccessor {
    fn from(config: AppConfig) -> Self {
        Self::new(Arc::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{bind, PropertySource};

    fn accessor() -> ConfigAccessor {
        let source: PropertySource = [
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
        .into_iter()
        .collect();
        bind(&source).unwrap().into()
    }

    #[test]
    fn test_end_to_end_views() {
        let accessor = accessor();

        let status = accessor.status();
        assert_eq!(status.name, "Test Config");
        assert!(status.enabled);
        assert_eq!(status.database.pool_size, 5);
        assert_eq!(status.database.url, "jdbc:h2:mem:test");

        assert_eq!(
            accessor.environment_info(),
            EnvironmentView::Development {
                connection_count: 50
            }
        );
        assert_eq!(accessor.database().pool_size(), 5);
        assert!(accessor.security().enabled());
        assert_eq!(accessor.full().name(), "Test Config");
    }

    #[test]
    fn test_status_timestamp_taken_per_call() {
        let accessor = accessor();
        let first = accessor.status();
        let second = accessor.status();
        assert!(second.timestamp >= first.timestamp);

        let fixed = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(accessor.status_at(fixed).timestamp, fixed);
    }

    #[test]
    fn test_clones_share_one_config() {
        let accessor = accessor();
        let clone = accessor.clone();
        assert!(std::ptr::eq(accessor.full(), clone.full()));
    }
}
