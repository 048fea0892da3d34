//! Error types for loading and binding configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a property source into a typed configuration.
///
/// `field` is always the dotted path of the offending property relative to the
/// bound root (for example `database.poolSize`), spelled the way the schema
/// declares it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("required property '{field}' is missing")]
    MissingRequiredField { field: String },

    #[error("property '{field}' has value '{raw_value}' which is not a valid {target_type}")]
    TypeCoercionError {
        field: String,
        raw_value: String,
        target_type: &'static str,
    },

    #[error("property '{field}' has value '{raw_value}', expected one of {}", allowed.join(", "))]
    InvalidEnumValue {
        field: String,
        raw_value: String,
        allowed: Vec<&'static str>,
    },
}

impl BindingError {
    pub fn missing(field: impl Into<String>) -> Self {
        BindingError::MissingRequiredField {
            field: field.into(),
        }
    }

    /// The dotted path of the property that failed.
    pub fn field(&self) -> &str {
        match self {
            BindingError::MissingRequiredField { field }
            | BindingError::TypeCoercionError { field, .. }
            | BindingError::InvalidEnumValue { field, .. } => field,
        }
    }

    /// Re-key the error as coming from inside the `namespace` group.
    pub fn within(self, namespace: &str) -> Self {
        let prefix = |field: String| format!("{}.{}", namespace, field);
        match self {
            BindingError::MissingRequiredField { field } => BindingError::MissingRequiredField {
                field: prefix(field),
            },
            BindingError::TypeCoercionError {
                field,
                raw_value,
                target_type,
            } => BindingError::TypeCoercionError {
                field: prefix(field),
                raw_value,
                target_type,
            },
            BindingError::InvalidEnumValue {
                field,
                raw_value,
                allowed,
            } => BindingError::InvalidEnumValue {
                field: prefix(field),
                raw_value,
                allowed,
            },
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("failed to parse properties at line {line}: {message}")]
    ParseProperties { line: usize, message: String },

    #[error("invalid configuration: {0}")]
    Binding(#[from] BindingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_prefixes_every_variant() {
        let err = BindingError::missing("url").within("database");
        assert_eq!(err.field(), "database.url");

        let err = BindingError::TypeCoercionError {
            field: "poolSize".into(),
            raw_value: "lots".into(),
            target_type: "integer",
        }
        .within("database");
        assert_eq!(err.field(), "database.poolSize");
        assert_eq!(
            err.to_string(),
            "property 'database.poolSize' has value 'lots' which is not a valid integer"
        );
    }

    #[test]
    fn test_enum_error_lists_allowed_values() {
        let err = BindingError::InvalidEnumValue {
            field: "environment".into(),
            raw_value: "FOO".into(),
            allowed: vec!["DEVELOPMENT", "PRODUCTION"],
        };
        assert_eq!(
            err.to_string(),
            "property 'environment' has value 'FOO', expected one of DEVELOPMENT, PRODUCTION"
        );
    }
}
