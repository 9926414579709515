//! Route table and dispatch.
//!
//! # Responsibilities
//! - Collect method bindings per route pattern
//! - Compile patterns into a radix tree (`matchit`)
//! - Look up the handler for a request's method and path
//! - Return an explicit NotFound / MethodNotAllowed rather than a silent default
//!
//! # Design Decisions
//! - Immutable after `build` (shared across connections without locks)
//! - Pattern syntax: static segments, `{param}`, trailing `{*rest}`

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use futures_util::future::BoxFuture;

/// A request handler registered on a route.
pub type Handler = Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

/// Wrap an async function as a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req: Request<Body>| -> BoxFuture<'static, Response> { Box::pin(f(req)) })
}

/// A route pattern could not be compiled.
#[derive(Debug, thiserror::Error)]
#[error("invalid route '{pattern}': {reason}")]
pub struct RouteError {
    pub pattern: String,
    pub reason: String,
}

/// Handlers registered for a single pattern.
#[derive(Clone, Default)]
struct Endpoint {
    methods: Vec<(Method, Handler)>,
    any: Option<Handler>,
}

impl Endpoint {
    fn set(&mut self, method: Method, handler: Handler) {
        match self.methods.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = handler,
            None => self.methods.push((method, handler)),
        }
    }

    fn lookup(&self, method: &Method) -> Option<&Handler> {
        self.methods
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, h)| h)
            .or(self.any.as_ref())
    }

    fn allowed(&self) -> String {
        self.methods
            .iter()
            .map(|(m, _)| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Mutable collection of bindings, built up during route registration.
#[derive(Default)]
pub struct RouteTable {
    endpoints: Vec<(String, Endpoint)>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn endpoint(&mut self, path: &str) -> &mut Endpoint {
        let idx = match self.index.get(path) {
            Some(&idx) => idx,
            None => {
                self.endpoints.push((path.to_string(), Endpoint::default()));
                self.index.insert(path.to_string(), self.endpoints.len() - 1);
                self.endpoints.len() - 1
            }
        };
        &mut self.endpoints[idx].1
    }

    /// Bind `handler` for `method` requests on `path`.
    pub fn method(&mut self, method: Method, path: &str, handler: Handler) {
        self.endpoint(path).set(method, handler);
    }

    /// Bind `handler` for requests with any method on `path`.
    ///
    /// Replaces every method bound on `path` so far.
    pub fn any(&mut self, path: &str, handler: Handler) {
        let endpoint = self.endpoint(path);
        endpoint.methods.clear();
        endpoint.any = Some(handler);
    }

    /// Compile the registered patterns.
    ///
    /// Every failing pattern is reported, not just the first.
    pub fn build(self) -> Result<CompiledRoutes, Vec<RouteError>> {
        let mut matcher = matchit::Router::new();
        let mut errors = Vec::new();

        for (pattern, endpoint) in self.endpoints {
            if !pattern.starts_with('/') {
                errors.push(RouteError {
                    reason: "paths must start with '/'".to_string(),
                    pattern,
                });
                continue;
            }
            if let Err(e) = matcher.insert(pattern.clone(), endpoint) {
                errors.push(RouteError {
                    pattern,
                    reason: e.to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(CompiledRoutes { matcher })
        } else {
            Err(errors)
        }
    }
}

/// Outcome of looking up a request.
pub enum Dispatch<'a> {
    Found(&'a Handler),
    /// Path matched but its method is not bound; carries the `Allow` value.
    MethodNotAllowed(String),
    NotFound,
}

/// Frozen route table used at request time.
pub struct CompiledRoutes {
    matcher: matchit::Router<Endpoint>,
}

impl CompiledRoutes {
    pub fn dispatch(&self, method: &Method, path: &str) -> Dispatch<'_> {
        match self.matcher.at(path) {
            Ok(matched) => match matched.value.lookup(method) {
                Some(handler) => Dispatch::Found(handler),
                None => Dispatch::MethodNotAllowed(matched.value.allowed()),
            },
            Err(_) => Dispatch::NotFound,
        }
    }
}
