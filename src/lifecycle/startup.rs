//! Startup orchestration.
//!
//! Loads every property layer, binds it, and reports what was bound. Any
//! error is returned to the caller and ends the process; nothing is served
//! from a partially bound configuration.

use std::path::PathBuf;

use crate::api::{AppSummary, ConfigInfo};
use crate::config::{AppConfig, ConfigError, ConfigLoader, Settings};

/// Inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_file: Option<PathBuf>,
    pub use_process_env: bool,
    pub overrides: Vec<String>,
}

/// Load and bind all settings.
pub fn load_settings(options: &StartupOptions) -> Result<Settings, ConfigError> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &options.config_file {
        loader = loader.with_file(path);
    }
    if options.use_process_env {
        loader = loader.with_process_env();
    }
    loader.with_overrides(options.overrides.iter().cloned()).load()
}

/// Log the bound configuration. Credentials are never included.
pub fn report(config: &AppConfig) {
    let status = if config.enabled() { "Enabled" } else { "Disabled" };

    tracing::info!("{}", config.environment().description());
    tracing::info!(
        name = %config.name(),
        version = %config.version(),
        status,
        database_url = %config.database().url(),
        "Configuration bound"
    );

    let info = ConfigInfo::of(config);
    tracing::info!(
        formats = %info.formats.join(", "),
        reversed = %config.reversed_formats().join(", "),
        "Supported formats"
    );
    tracing::info!(summary = %AppSummary::of(config), "Application summary");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_settings_from_overrides_only() {
        let options = StartupOptions {
            config_file: None,
            use_process_env: false,
            overrides: vec![
                "app.config.name=Startup".into(),
                "app.config.version=1.2.3".into(),
                "app.config.mode=TESTING".into(),
                "app.config.database.url=jdbc:h2:mem:startup".into(),
            ],
        };
        let settings = load_settings(&options).unwrap();
        assert_eq!(settings.app.name(), "Startup");
        report(&settings.app);
    }

    #[test]
    fn test_load_settings_fails_without_required() {
        let options = StartupOptions {
            overrides: vec!["app.config.version=1".into()],
            ..StartupOptions::default()
        };
        assert!(matches!(
            load_settings(&options),
            Err(ConfigError::Binding(_))
        ));
    }
}
