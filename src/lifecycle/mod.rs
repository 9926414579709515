//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Build route tables → Bind listeners → Load TLS → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Every listener stops accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM/SIGHUP → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routes, then listeners
//! - Listener state: not started → listening → shutting down → stopped
//! - Shutdown errors are logged, never escalated

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::spawn_signal_handler;
pub use startup::{serve, ProxyServer, ServeError};
