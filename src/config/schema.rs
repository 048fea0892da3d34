//! Configuration schema definitions.
//!
//! This module defines the typed shape of the application configuration:
//! the root [`AppConfig`], its two nested groups, the closed set of
//! [`Environment`] modes, and a [`Field`] descriptor per property naming its
//! key and its default (or marking it required).
//!
//! Every object is immutable once built. The builders are the only way to
//! construct one, and `build()` is where required fields and defaults are
//! resolved against the descriptors in [`fields`].

use std::fmt;

use serde::Serialize;

use crate::config::error::BindingError;

/// What to do when a property is absent from the source.
pub enum Fallback<T> {
    /// Absence is a [`BindingError::MissingRequiredField`].
    Required,
    /// Absence yields the produced default.
    Value(fn() -> T),
}

/// Declarative description of one configuration property.
pub struct Field<T> {
    /// Property key relative to the owning group, as reported in errors.
    pub key: &'static str,
    /// Alternative keys accepted for the same property.
    pub aliases: &'static [&'static str],
    pub fallback: Fallback<T>,
}

// Manual impls: the derives would demand `T: Copy`.
impl<T> Clone for Fallback<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Fallback<T> {}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> Field<T> {
    pub const fn required(key: &'static str) -> Self {
        Self {
            key,
            aliases: &[],
            fallback: Fallback::Required,
        }
    }

    pub const fn with_default(key: &'static str, default: fn() -> T) -> Self {
        Self {
            key,
            aliases: &[],
            fallback: Fallback::Value(default),
        }
    }

    pub const fn aliased(self, aliases: &'static [&'static str]) -> Self {
        Self {
            key: self.key,
            aliases,
            fallback: self.fallback,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.fallback, Fallback::Required)
    }

    /// All keys this property may be supplied under, primary key first.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.key).chain(self.aliases.iter().copied())
    }

    /// Resolve a possibly-absent value against this field's fallback.
    pub fn resolve(&self, value: Option<T>) -> Result<T, BindingError> {
        match (value, self.fallback) {
            (Some(value), _) => Ok(value),
            (None, Fallback::Value(default)) => Ok(default()),
            (None, Fallback::Required) => Err(BindingError::missing(self.key)),
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("aliases", &self.aliases)
            .field("required", &self.is_required())
            .finish()
    }
}

fn default_max_connections() -> i32 {
    100
}

fn default_timeout_secs() -> f64 {
    30.0
}

fn default_pool_size() -> i32 {
    10
}

fn default_db_timeout_ms() -> i64 {
    30_000
}

fn default_token_expiration_secs() -> i64 {
    3_600
}

fn disabled() -> bool {
    false
}

/// Property descriptors, grouped by the object they belong to.
pub mod fields {
    use super::*;

    pub const NAME: Field<String> = Field::required("name");
    pub const DESCRIPTION: Field<String> = Field::with_default("description", String::new);
    pub const VERSION: Field<String> = Field::required("version");
    pub const ENABLED: Field<bool> = Field::with_default("enabled", disabled);
    pub const MAX_CONNECTIONS: Field<i32> =
        Field::with_default("maxConnections", default_max_connections);
    pub const TIMEOUT: Field<f64> = Field::with_default("timeout", default_timeout_secs);
    pub const ENVIRONMENT: Field<Environment> = Field::required("environment").aliased(&["mode"]);
    pub const SUPPORTED_FORMATS: Field<Vec<String>> =
        Field::with_default("supportedFormats", Vec::new);
    pub const RATES: Field<Vec<f64>> = Field::with_default("rates", Vec::new);
    pub const DATABASE: Field<DatabaseConfig> = Field::required("database");
    pub const SECURITY: Field<SecurityConfig> = Field::required("security");

    pub mod database {
        use super::super::*;

        pub const URL: Field<String> = Field::required("url");
        pub const USERNAME: Field<String> = Field::with_default("username", String::new);
        pub const PASSWORD: Field<String> = Field::with_default("password", String::new);
        pub const POOL_SIZE: Field<i32> = Field::with_default("poolSize", default_pool_size);
        pub const TIMEOUT: Field<i64> = Field::with_default("timeout", default_db_timeout_ms);
    }

    pub mod security {
        use super::super::*;

        pub const ENABLED: Field<bool> = Field::with_default("enabled", disabled);
        pub const TOKEN_EXPIRATION: Field<i64> =
            Field::with_default("tokenExpiration", default_token_expiration_secs);
        pub const ALLOWED_ORIGINS: Field<Vec<String>> =
            Field::with_default("allowedOrigins", Vec::new);
    }
}

/// Deployment mode. The set is closed; unknown tags never bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    Development,
    Testing,
    Staging,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Development,
        Environment::Testing,
        Environment::Staging,
        Environment::Production,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "DEVELOPMENT",
            Environment::Testing => "TESTING",
            Environment::Staging => "STAGING",
            Environment::Production => "PRODUCTION",
        }
    }

    /// The accepted tags, in declaration order.
    pub fn allowed() -> Vec<&'static str> {
        Self::ALL.iter().map(|env| env.as_str()).collect()
    }

    /// Match a raw tag, ignoring ASCII case and `-`/`_` separators.
    pub fn from_tag(raw: &str) -> Option<Self> {
        let wanted: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect();
        Self::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(&wanted))
    }

    pub const fn description(self) -> &'static str {
        match self {
            Environment::Development => "Running in development mode",
            Environment::Testing => "Running in testing mode",
            Environment::Staging => "Running in staging mode",
            Environment::Production => "Running in production mode",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root application configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    name: String,
    description: String,
    version: String,
    enabled: bool,
    max_connections: i32,
    /// Seconds.
    timeout: f64,
    environment: Environment,
    supported_formats: Vec<String>,
    rates: Vec<f64>,
    database: DatabaseConfig,
    security: SecurityConfig,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_connections(&self) -> i32 {
        self.max_connections
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn supported_formats(&self) -> &[String] {
        &self.supported_formats
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }

    /// A reversed copy of the supported formats. The configuration is untouched.
    pub fn reversed_formats(&self) -> Vec<String> {
        self.supported_formats.iter().rev().cloned().collect()
    }
}

/// Staged construction of [`AppConfig`].
#[derive(Debug, Clone, Default)]
pub struct AppConfigBuilder {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    enabled: Option<bool>,
    max_connections: Option<i32>,
    timeout: Option<f64>,
    environment: Option<Environment>,
    supported_formats: Option<Vec<String>>,
    rates: Option<Vec<f64>>,
    database: Option<DatabaseConfig>,
    security: Option<SecurityConfig>,
}

impl AppConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn max_connections(mut self, max_connections: i32) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    pub fn timeout(mut self, timeout: f64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn supported_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    pub fn rates(mut self, rates: impl IntoIterator<Item = f64>) -> Self {
        self.rates = Some(rates.into_iter().collect());
        self
    }

    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.database = Some(database);
        self
    }

    pub fn security(mut self, security: SecurityConfig) -> Self {
        self.security = Some(security);
        self
    }

    /// Finalize. Fails on the first required field that was never set.
    pub fn build(self) -> Result<AppConfig, BindingError> {
        Ok(AppConfig {
            name: fields::NAME.resolve(self.name)?,
            description: fields::DESCRIPTION.resolve(self.description)?,
            version: fields::VERSION.resolve(self.version)?,
            enabled: fields::ENABLED.resolve(self.enabled)?,
            max_connections: fields::MAX_CONNECTIONS.resolve(self.max_connections)?,
            timeout: fields::TIMEOUT.resolve(self.timeout)?,
            environment: fields::ENVIRONMENT.resolve(self.environment)?,
            supported_formats: fields::SUPPORTED_FORMATS.resolve(self.supported_formats)?,
            rates: fields::RATES.resolve(self.rates)?,
            database: fields::DATABASE.resolve(self.database)?,
            security: fields::SECURITY.resolve(self.security)?,
        })
    }
}

/// Database connection settings, owned by [`AppConfig`].
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    url: String,
    username: String,
    password: String,
    pool_size: i32,
    /// Milliseconds.
    timeout: i64,
}

impl DatabaseConfig {
    pub fn builder() -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::default()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn pool_size(&self) -> i32 {
        self.pool_size
    }

    pub fn timeout(&self) -> i64 {
        self.timeout
    }
}

// Keeps the password out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("pool_size", &self.pool_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfigBuilder {
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    pool_size: Option<i32>,
    timeout: Option<i64>,
}

impl DatabaseConfigBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn pool_size(mut self, pool_size: i32) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn timeout(mut self, timeout: i64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<DatabaseConfig, BindingError> {
        use fields::database::*;

        Ok(DatabaseConfig {
            url: URL.resolve(self.url)?,
            username: USERNAME.resolve(self.username)?,
            password: PASSWORD.resolve(self.password)?,
            pool_size: POOL_SIZE.resolve(self.pool_size)?,
            timeout: TIMEOUT.resolve(self.timeout)?,
        })
    }
}

/// Security settings, owned by [`AppConfig`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    enabled: bool,
    /// Seconds.
    token_expiration: i64,
    allowed_origins: Vec<String>,
}

impl SecurityConfig {
    pub fn builder() -> SecurityConfigBuilder {
        SecurityConfigBuilder::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn token_expiration(&self) -> i64 {
        self.token_expiration
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }
}

#[derive(Debug, Clone, Default)]
pub struct SecurityConfigBuilder {
    enabled: Option<bool>,
    token_expiration: Option<i64>,
    allowed_origins: Option<Vec<String>>,
}

impl SecurityConfigBuilder {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn token_expiration(mut self, token_expiration: i64) -> Self {
        self.token_expiration = Some(token_expiration);
        self
    }

    pub fn allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = Some(origins.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<SecurityConfig, BindingError> {
        use fields::security::*;

        Ok(SecurityConfig {
            enabled: ENABLED.resolve(self.enabled)?,
            token_expiration: TOKEN_EXPIRATION.resolve(self.token_expiration)?,
            allowed_origins: ALLOWED_ORIGINS.resolve(self.allowed_origins)?,
        })
    }
}
