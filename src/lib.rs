//! Typed configuration binding with a read-only HTTP surface.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use api::ConfigAccessor;
pub use config::schema::AppConfig;
pub use config::{bind, BindingError, PropertySource};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
