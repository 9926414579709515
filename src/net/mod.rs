//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured port
//!     → listener.rs (bind 0.0.0.0:<port>)
//!     → tls.rs (HTTPS only: load certificate/key pair)
//!     → Hand off to the HTTP layer (axum / axum-server)
//! ```
//!
//! # Design Decisions
//! - Binding happens before serving so failures abort startup
//! - TLS material is loaded once; no reload

pub mod listener;
pub mod tls;

pub use listener::{Listener, ListenerError};
pub use tls::{load_tls_config, TlsError};
