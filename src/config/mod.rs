//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML)
//!     → loader.rs (read & deserialize into schema.rs types)
//!     → validation.rs (resolve mappers, downstreams, methods, route patterns)
//!     → Configuration (validated, immutable)
//!     → shared via Arc with the listeners and their handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated; changes require a restart
//! - Validation passes are independent and every failure is reported together
//! - A failed validation never hands out a partially resolved Configuration

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError, ConfigFormat};
pub use schema::{DownstreamConfig, HttpConfig, HttpsConfig, IncomingConfig, ProxyConfig, RedirectConfig};
pub use validation::{
    validate_config, Configuration, Downstream, HttpSection, HttpsSection, Incoming, Redirect,
    ValidationError,
};
