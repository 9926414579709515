//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     configured method tokens
//!     → method.rs (token → MethodRoute binding)
//!     → MethodRoute::bind registers handlers on router.rs RouteTable
//!     → RouteTable::build compiles patterns into a radix tree
//!     → Freeze as immutable CompiledRoutes
//!
//! Incoming Request (method, path)
//!     → CompiledRoutes::dispatch
//!     → Return: handler, MethodNotAllowed or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Only configured bindings are registered; 404/405 fall out of lookup
//! - A later binding for the same path and method replaces the earlier one
//! - The wildcard binding covers every method not bound explicitly afterwards

pub mod method;
pub mod router;

pub use method::{route_for, MethodRoute, UnsupportedMethod, ANY_METHOD};
pub use router::{handler, CompiledRoutes, Dispatch, Handler, RouteError, RouteTable};
