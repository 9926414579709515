//! ferp: a configuration-driven HTTP/HTTPS reverse proxy library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod mapper;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::{load_config, Configuration, ProxyConfig};
pub use lifecycle::{serve, ProxyServer, Shutdown};
