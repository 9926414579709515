//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection (plain or TLS)
//!     → server.rs (Axum router, request logging)
//!     → routing::CompiledRoutes (method + path lookup)
//!     → redirect.rs (302 to a fixed location)
//!       or forward.rs
//!            → url.rs (rewrite onto the downstream base URL)
//!            → response.rs (header transfer, internal error)
//!     → Send to client
//! ```

pub mod forward;
pub mod redirect;
pub mod response;
pub mod server;
pub mod url;

pub use forward::{downstream_client, Forwarder};
pub use redirect::Redirector;
pub use server::{build_router, section_routes};
pub use url::{rewrite, rewrite_uri, BaseUrl};
