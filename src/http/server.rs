//! HTTP server setup.
//!
//! # Responsibilities
//! - Register every redirect and forwarding binding of a listener section
//! - Create the Axum Router that dispatches into the compiled route table
//! - Wire up request logging middleware

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::ALLOW, HeaderValue, Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{Incoming, Redirect};
use crate::http::forward::Forwarder;
use crate::http::redirect::Redirector;
use crate::routing::{CompiledRoutes, Dispatch, RouteError, RouteTable};

/// Register the redirects, then the forwarding routes, of one listener.
pub fn section_routes(
    redirects: &[Redirect],
    incoming: &[Incoming],
    client: &reqwest::Client,
) -> Result<CompiledRoutes, Vec<RouteError>> {
    let mut table = RouteTable::new();
    let mut errors = Vec::new();

    for rd in redirects {
        let redirector = match Redirector::new(&rd.to) {
            Ok(r) => r,
            Err(e) => {
                errors.push(RouteError {
                    pattern: rd.from.clone(),
                    reason: format!("invalid redirect location '{}': {}", rd.to, e),
                });
                continue;
            }
        };
        let redirect = redirector.into_handler();
        for mr in &rd.method_routes {
            tracing::info!(from = %rd.from, to = %rd.to, method = %mr, "Configuring redirect");
            mr.bind(&mut table, &rd.from, redirect.clone());
        }
    }

    for inc in incoming {
        let forward = Forwarder::new(inc.downstream.clone(), client.clone()).into_handler();
        for mr in &inc.method_routes {
            tracing::info!(
                path = %inc.path,
                method = %mr,
                downstream = %inc.downstream.target,
                "Configuring forwarding route"
            );
            mr.bind(&mut table, &inc.path, forward.clone());
        }
    }

    let routes = table.build();
    match routes {
        Ok(routes) if errors.is_empty() => Ok(routes),
        Ok(_) => Err(errors),
        Err(route_errors) => {
            errors.extend(route_errors);
            Err(errors)
        }
    }
}

/// Build the Axum router serving `routes`.
pub fn build_router(routes: CompiledRoutes) -> Router {
    let routes = Arc::new(routes);
    Router::new()
        .route("/{*path}", any(dispatch))
        .route("/", any(dispatch))
        .with_state(routes)
        .layer(TraceLayer::new_for_http())
}

async fn dispatch(State(routes): State<Arc<CompiledRoutes>>, request: Request<Body>) -> Response {
    let handler = match routes.dispatch(request.method(), request.uri().path()) {
        Dispatch::Found(h) => h.clone(),
        Dispatch::MethodNotAllowed(allow) => {
            tracing::debug!(method = %request.method(), path = %request.uri().path(), "Method not allowed");
            let mut res = status(StatusCode::METHOD_NOT_ALLOWED);
            if let Ok(value) = HeaderValue::try_from(allow) {
                res.headers_mut().insert(ALLOW, value);
            }
            return res;
        }
        Dispatch::NotFound => {
            tracing::debug!(path = %request.uri().path(), "No route matched");
            return status(StatusCode::NOT_FOUND);
        }
    };
    handler(request).await
}

fn status(code: StatusCode) -> Response {
    let mut res = Response::new(Body::empty());
    *res.status_mut() = code;
    res
}
