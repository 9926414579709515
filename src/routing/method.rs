//! Method router table.
//!
//! Maps a configured method token onto the binding that registers a handler
//! for that method on a [`RouteTable`].

use axum::http::Method;

use super::router::{Handler, RouteTable};

/// Configuration token meaning "bind for any method".
pub const ANY_METHOD: &str = "*";

/// The method token is not one the proxy can route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("method '{0}' is not supported")]
pub struct UnsupportedMethod(pub String);

/// Registers a handler for one method, or for all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodRoute {
    Only(Method),
    Any,
}

impl MethodRoute {
    /// Register `handler` on `table` for `path` with this binding's method.
    pub fn bind(&self, table: &mut RouteTable, path: &str, handler: Handler) {
        match self {
            MethodRoute::Only(method) => table.method(method.clone(), path, handler),
            MethodRoute::Any => table.any(path, handler),
        }
    }
}

impl std::fmt::Display for MethodRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodRoute::Only(method) => write!(f, "{}", method),
            MethodRoute::Any => write!(f, "{}", ANY_METHOD),
        }
    }
}

/// Find the binding for a configured method token.
///
/// Tokens are matched exactly: `GET` is valid, `get` is not.
pub fn route_for(token: &str) -> Result<MethodRoute, UnsupportedMethod> {
    let method = match token {
        ANY_METHOD => return Ok(MethodRoute::Any),
        "CONNECT" => Method::CONNECT,
        "DELETE" => Method::DELETE,
        "GET" => Method::GET,
        "HEAD" => Method::HEAD,
        "OPTIONS" => Method::OPTIONS,
        "PATCH" => Method::PATCH,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "TRACE" => Method::TRACE,
        other => return Err(UnsupportedMethod(other.to_string())),
    };
    Ok(MethodRoute::Only(method))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_methods_resolve() {
        for token in [
            "CONNECT", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT", "TRACE",
        ] {
            let route = route_for(token).unwrap();
            assert_eq!(route.to_string(), token);
        }
    }

    #[test]
    fn test_wildcard_resolves_to_any() {
        assert_eq!(route_for("*").unwrap(), MethodRoute::Any);
    }

    #[test]
    fn test_unknown_tokens_are_rejected() {
        for token in ["get", "FETCH", "", "ALL"] {
            let err = route_for(token).unwrap_err();
            assert_eq!(err.to_string(), format!("method '{}' is not supported", token));
        }
    }
}
