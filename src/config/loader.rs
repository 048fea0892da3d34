//! Configuration loading from disk, environment and command line.
//!
//! Sources are layered lowest to highest precedence:
//!
//! 1. Config file (`.toml` by extension, otherwise `.properties`)
//! 2. Environment variables (`APP_CONFIG_NAME` → `app.config.name`)
//! 3. Command-line overrides (`-D app.config.name=demo`)

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;
use crate::config::properties::PropertySource;
use crate::config::settings::Settings;

/// Builder for the layered property source.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<Vec<(String, String)>>,
    overrides: Vec<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Layer the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn with_process_env(self) -> Self {
        self.with_env(utf8_vars(std::env::vars_os()))
    }

    /// Layer an explicit set of environment variables.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.extend(overrides.into_iter().map(Into::into));
        self
    }

    /// Read every layer into one property source.
    pub fn properties(&self) -> Result<PropertySource, ConfigError> {
        let synonyms = Settings::synonyms();
        let mut properties = PropertySource::new();

        if let Some(path) = &self.file {
            let file = read_file(path)?;
            tracing::debug!(path = %path.display(), properties = file.len(), "Loaded config file");
            properties.overlay(file, &synonyms);
        }
        if let Some(vars) = &self.env {
            let env = PropertySource::from_env(vars.iter().map(|(k, v)| (k, v.clone())));
            properties.overlay(env, &synonyms);
        }
        if !self.overrides.is_empty() {
            properties.overlay(PropertySource::from_overrides(&self.overrides)?, &synonyms);
        }

        Ok(properties)
    }

    /// Load and bind all settings.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let properties = self.properties()?;
        Ok(Settings::bind(&properties)?)
    }
}

fn utf8_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (name, _) => {
                tracing::debug!(variable = ?name, "Skipping non-UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Parse a single config file into a property source.
pub fn read_file(path: &Path) -> Result<PropertySource, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => PropertySource::from_toml(&content),
        _ => PropertySource::parse_properties(&content),
    }
}

/// Load and bind settings from a single file.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    ConfigLoader::new().with_file(path).load()
}
