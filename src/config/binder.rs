//! Binding of flat properties onto the typed schema.
//!
//! # Algorithm
//! ```text
//! PropertySource (already scoped to the application prefix)
//!     → scalar / list / enum coercion per schema field
//!     → database.* and security.* bound from their own scopes
//!       (errors re-keyed with the namespace)
//!     → builders finalize; required fields and defaults resolved there
//! ```
//!
//! Binding is all-or-nothing: the first failure is returned and no partially
//! built configuration escapes.

use tracing::debug;

use crate::config::error::BindingError;
use crate::config::properties::PropertySource;
use crate::config::schema::{
    fields, AppConfig, DatabaseConfig, Environment, Field, SecurityConfig,
};

/// Namespace of the nested database group.
pub const DATABASE_NAMESPACE: &str = "database";
/// Namespace of the nested security group.
pub const SECURITY_NAMESPACE: &str = "security";

/// Scalar types a raw property string can be coerced into.
pub trait FromProperty: Sized {
    /// Human-readable target type, reported in coercion errors.
    const TYPE_NAME: &'static str;

    fn from_property(raw: &str) -> Option<Self>;
}

impl FromProperty for String {
    const TYPE_NAME: &'static str = "string";

    fn from_property(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromProperty for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_property(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl FromProperty for i32 {
    const TYPE_NAME: &'static str = "integer";

    fn from_property(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl FromProperty for i64 {
    const TYPE_NAME: &'static str = "long";

    fn from_property(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl FromProperty for u64 {
    const TYPE_NAME: &'static str = "non-negative integer";

    fn from_property(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl FromProperty for f64 {
    const TYPE_NAME: &'static str = "double";

    fn from_property(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

/// Field-level reader over one property scope.
pub struct Binder<'a> {
    source: &'a PropertySource,
}

impl<'a> Binder<'a> {
    pub fn new(source: &'a PropertySource) -> Self {
        Self { source }
    }

    /// The raw value and the key it was found under, primary key first.
    fn lookup<T>(&self, field: &Field<T>) -> Option<(&'static str, &'a str)> {
        field
            .keys()
            .find_map(|key| self.source.get(key).map(|raw| (key, raw)))
    }

    /// Coerce a scalar property. `Ok(None)` when absent.
    pub fn scalar<T: FromProperty>(&self, field: &Field<T>) -> Result<Option<T>, BindingError> {
        self.lookup(field)
            .map(|(key, raw)| coerce(key, raw))
            .transpose()
    }

    /// Coerce the closed-set environment mode. `Ok(None)` when absent.
    pub fn environment(
        &self,
        field: &Field<Environment>,
    ) -> Result<Option<Environment>, BindingError> {
        self.lookup(field)
            .map(|(key, raw)| {
                Environment::from_tag(raw).ok_or_else(|| BindingError::InvalidEnumValue {
                    field: key.to_string(),
                    raw_value: raw.to_string(),
                    allowed: Environment::allowed(),
                })
            })
            .transpose()
    }

    /// Coerce a list property. `Ok(None)` when absent.
    ///
    /// Indexed keys (`key[0]`, `key[1]`, ...) take precedence over a
    /// comma-delimited value. Indices must run contiguously from zero.
    pub fn list<T: FromProperty>(
        &self,
        field: &Field<Vec<T>>,
    ) -> Result<Option<Vec<T>>, BindingError> {
        for key in field.keys() {
            let indexed = self.source.indexed(key);
            if indexed.is_empty() {
                continue;
            }
            let mut items = Vec::with_capacity(indexed.len());
            for (expected, (index, raw)) in indexed.into_iter().enumerate() {
                if index != expected {
                    return Err(BindingError::missing(format!("{}[{}]", key, expected)));
                }
                items.push(coerce(&format!("{}[{}]", key, index), raw)?);
            }
            return Ok(Some(items));
        }

        let Some((key, raw)) = self.lookup(field) else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }
        raw.split(',')
            .enumerate()
            .map(|(index, item)| coerce(&format!("{}[{}]", key, index), item.trim()))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// The properties of a nested group.
    pub fn nested(&self, namespace: &str) -> PropertySource {
        self.source.scoped(namespace)
    }
}

fn coerce<T: FromProperty>(key: &str, raw: &str) -> Result<T, BindingError> {
    T::from_property(raw).ok_or_else(|| BindingError::TypeCoercionError {
        field: key.to_string(),
        raw_value: raw.to_string(),
        target_type: T::TYPE_NAME,
    })
}

/// Bind a property source (keys relative to the application root) into an
/// [`AppConfig`].
pub fn bind(properties: &PropertySource) -> Result<AppConfig, BindingError> {
    let binder = Binder::new(properties);

    let database = bind_database(&binder.nested(DATABASE_NAMESPACE))
        .map_err(|e| e.within(DATABASE_NAMESPACE))?;
    let security = bind_security(&binder.nested(SECURITY_NAMESPACE))
        .map_err(|e| e.within(SECURITY_NAMESPACE))?;

    let mut builder = AppConfig::builder().database(database).security(security);

    if let Some(name) = binder.scalar(&fields::NAME)? {
        builder = builder.name(name);
    }
    if let Some(description) = binder.scalar(&fields::DESCRIPTION)? {
        builder = builder.description(description);
    }
    if let Some(version) = binder.scalar(&fields::VERSION)? {
        builder = builder.version(version);
    }
    if let Some(enabled) = binder.scalar(&fields::ENABLED)? {
        builder = builder.enabled(enabled);
    }
    if let Some(max_connections) = binder.scalar(&fields::MAX_CONNECTIONS)? {
        builder = builder.max_connections(max_connections);
    }
    if let Some(timeout) = binder.scalar(&fields::TIMEOUT)? {
        builder = builder.timeout(timeout);
    }
    if let Some(environment) = binder.environment(&fields::ENVIRONMENT)? {
        builder = builder.environment(environment);
    }
    if let Some(formats) = binder.list(&fields::SUPPORTED_FORMATS)? {
        builder = builder.supported_formats(formats);
    }
    if let Some(rates) = binder.list(&fields::RATES)? {
        builder = builder.rates(rates);
    }

    let config = builder.build()?;
    debug!(
        name = %config.name(),
        environment = %config.environment(),
        "Configuration bound"
    );
    Ok(config)
}

/// Bind the database group from its own scope.
pub fn bind_database(properties: &PropertySource) -> Result<DatabaseConfig, BindingError> {
    use fields::database::*;

    let binder = Binder::new(properties);
    let mut builder = DatabaseConfig::builder();

    if let Some(url) = binder.scalar(&URL)? {
        builder = builder.url(url);
    }
    if let Some(username) = binder.scalar(&USERNAME)? {
        builder = builder.username(username);
    }
    if let Some(password) = binder.scalar(&PASSWORD)? {
        builder = builder.password(password);
    }
    if let Some(pool_size) = binder.scalar(&POOL_SIZE)? {
        builder = builder.pool_size(pool_size);
    }
    if let Some(timeout) = binder.scalar(&TIMEOUT)? {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Bind the security group from its own scope.
pub fn bind_security(properties: &PropertySource) -> Result<SecurityConfig, BindingError> {
    use fields::security::*;

    let binder = Binder::new(properties);
    let mut builder = SecurityConfig::builder();

    if let Some(enabled) = binder.scalar(&ENABLED)? {
        builder = builder.enabled(enabled);
    }
    if let Some(token_expiration) = binder.scalar(&TOKEN_EXPIRATION)? {
        builder = builder.token_expiration(token_expiration);
    }
    if let Some(origins) = binder.list(&ALLOWED_ORIGINS)? {
        builder = builder.allowed_origins(origins);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> PropertySource {
        pairs.iter().copied().collect()
    }

    fn valid_pairs() -> Vec<(&'static str, &'static str)> {
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

    fn with(extra: &[(&'static str, &'static str)]) -> PropertySource {
        let mut pairs = valid_pairs();
        pairs.extend_from_slice(extra);
        source(&pairs)
    }

    fn without(key: &str) -> PropertySource {
        let pairs: Vec<_> = valid_pairs().into_iter().filter(|(k, _)| *k != key).collect();
        source(&pairs)
    }

    #[test]
    fn test_bind_valid_source() {
        let config = bind(&with(&[
            ("description", "Test Configuration"),
            ("timeout", "15.5"),
            ("supportedFormats", "JSON,YAML"),
            ("rates", "1.1, 2.2, 3.3"),
            ("database.username", "test"),
            ("database.password", "secret"),
            ("database.timeout", "2000"),
            ("security.allowedOrigins", "https://a.com,https://b.com"),
        ]))
        .unwrap();

        assert_eq!(config.name(), "Test Config");
        assert_eq!(config.description(), "Test Configuration");
        assert_eq!(config.version(), "0.1.0");
        assert!(config.enabled());
        assert_eq!(config.max_connections(), 50);
        assert_eq!(config.timeout(), 15.5);
        assert_eq!(config.environment(), Environment::Development);
        assert_eq!(config.supported_formats(), &["JSON", "YAML"]);
        assert_eq!(config.rates(), &[1.1, 2.2, 3.3]);

        let db = config.database();
        assert_eq!(db.url(), "jdbc:h2:mem:test");
        assert_eq!(db.username(), "test");
        assert_eq!(db.password(), "secret");
        assert_eq!(db.pool_size(), 5);
        assert_eq!(db.timeout(), 2000);

        let security = config.security();
        assert!(security.enabled());
        assert_eq!(security.token_expiration(), 1800);
        assert_eq!(
            security.allowed_origins(),
            &["https://a.com", "https://b.com"]
        );
    }

    #[test]
    fn test_bind_is_deterministic() {
        let props = with(&[("supportedFormats", "JSON,YAML")]);
        let first = bind(&props).unwrap();
        let second = bind(&props).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_defaults_fill_absent_optional_fields() {
        let config = bind(&source(&valid_pairs())).unwrap();
        assert_eq!(config.description(), "");
        assert_eq!(config.timeout(), 30.0);
        assert!(config.supported_formats().is_empty());
        assert!(config.rates().is_empty());
        assert_eq!(config.database().username(), "");
        assert_eq!(config.database().timeout(), 30_000);
        assert!(config.security().allowed_origins().is_empty());
    }

    #[test]
    fn test_missing_name() {
        let err = bind(&without("name")).unwrap_err();
        assert_eq!(
            err,
            BindingError::MissingRequiredField {
                field: "name".into()
            }
        );
    }

    #[test]
    fn test_missing_database_url_names_namespace() {
        let err = bind(&without("database.url")).unwrap_err();
        assert_eq!(err, BindingError::missing("database.url"));
    }

    #[test]
    fn test_invalid_mode() {
        let err = bind(&without("environment").tap_insert("mode", "FOO")).unwrap_err();
        match err {
            BindingError::InvalidEnumValue {
                field,
                raw_value,
                allowed,
            } => {
                assert_eq!(field, "mode");
                assert_eq!(raw_value, "FOO");
                assert_eq!(allowed, Environment::allowed());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = bind(&with(&[("environment", "nightly")])).unwrap_err();
        assert!(matches!(err, BindingError::InvalidEnumValue { .. }));
    }

    #[test]
    fn test_mode_alias_and_relaxed_tag() {
        let config = bind(&without("environment").tap_insert("mode", "production")).unwrap();
        assert_eq!(config.environment(), Environment::Production);
    }

    #[test]
    fn test_non_numeric_max_connections() {
        let err = bind(&with(&[("maxConnections", "notanumber")])).unwrap_err();
        assert_eq!(
            err,
            BindingError::TypeCoercionError {
                field: "maxConnections".into(),
                raw_value: "notanumber".into(),
                target_type: "integer",
            }
        );
    }

    #[test]
    fn test_nested_coercion_error_names_namespace() {
        let err = bind(&with(&[("database.poolSize", "many")])).unwrap_err();
        assert_eq!(err.field(), "database.poolSize");
        assert!(matches!(err, BindingError::TypeCoercionError { .. }));

        let err = bind(&with(&[("security.enabled", "maybe")])).unwrap_err();
        assert_eq!(err.field(), "security.enabled");
    }

    #[test]
    fn test_list_element_error_names_index() {
        let err = bind(&with(&[("rates", "1.0,abc")])).unwrap_err();
        assert_eq!(err.field(), "rates[1]");
    }

    #[test]
    fn test_empty_list_value_is_empty_collection() {
        let config = bind(&with(&[("supportedFormats", "")])).unwrap();
        assert!(config.supported_formats().is_empty());
    }

    #[test]
    fn test_indexed_list_preserves_order() {
        let config = bind(&with(&[
            ("supportedFormats[1]", "YAML"),
            ("supportedFormats[0]", "JSON"),
            ("supportedFormats[2]", "JSON"),
            ("supportedFormats", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.supported_formats(), &["JSON", "YAML", "JSON"]);
    }

    #[test]
    fn test_indexed_list_gap() {
        let err = bind(&with(&[("rates[0]", "1.0"), ("rates[2]", "3.0")])).unwrap_err();
        assert_eq!(err, BindingError::missing("rates[1]"));
    }

    #[test]
    fn test_relaxed_keys() {
        let config = bind(&without("maxConnections").tap_insert("max-connections", "7")).unwrap();
        assert_eq!(config.max_connections(), 7);
    }

    #[test]
    fn test_boolean_forms() {
        assert_eq!(bool::from_property("YES"), Some(true));
        assert_eq!(bool::from_property("off"), Some(false));
        assert_eq!(bool::from_property("0"), Some(false));
        assert_eq!(bool::from_property("truthy"), None);
    }

    trait TapInsert {
        fn tap_insert(self, key: &str, value: &str) -> Self;
    }

    impl TapInsert for PropertySource {
        fn tap_insert(mut self, key: &str, value: &str) -> Self {
            self.insert(key, value);
            self
        }
    }
}
