//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (.properties / .toml), environment, -D overrides
//!     → properties.rs (flatten into canonical dotted keys, layer)
//!     → binder.rs (coerce per schema field, bind nested groups)
//!     → schema.rs builders (resolve defaults, reject missing required)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc with the API handlers
//! ```
//!
//! # Design Decisions
//! - Config is bound once at startup; there is no reload
//! - Binding fails atomically with a single `BindingError`
//! - Keys are matched relaxed: case, `-` and `_` are ignored

pub mod binder;
pub mod error;
pub mod loader;
pub mod properties;
pub mod schema;
pub mod settings;

pub use binder::bind;
pub use error::{BindingError, ConfigError};
pub use loader::{load_config, ConfigLoader};
pub use properties::PropertySource;
pub use schema::{AppConfig, DatabaseConfig, Environment, SecurityConfig};
pub use settings::{ObservabilityConfig, ServerConfig, Settings};
