//! Request forwarding to downstreams.
//!
//! # Responsibilities
//! - Rewrite the request URL onto the route's downstream
//! - Stream the request to the downstream with filtered headers
//! - Relay status, filtered headers and streamed body back to the caller
//! - Translate construction and transport failures into a fixed 500
//!
//! # Design Decisions
//! - One outbound request per incoming request: no retries, no timeout
//! - Downstream redirects are relayed, not followed
//! - Once status and headers are sent, body failures can only be logged

use std::sync::Arc;

use axum::body::{Body, HttpBody};
use axum::http::Request;
use axum::response::Response;
use futures_util::TryStreamExt;
use uuid::Uuid;

use crate::config::Downstream;
use crate::http::response::{internal_error, request_headers, response_headers};
use crate::http::url::rewrite_uri;
use crate::routing::{handler, Handler};

/// Build the client used for downstream calls.
pub fn downstream_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
}

/// Forwards requests for one incoming route to its downstream.
#[derive(Clone)]
pub struct Forwarder {
    downstream: Arc<Downstream>,
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(downstream: Arc<Downstream>, client: reqwest::Client) -> Self {
        Self { downstream, client }
    }

    /// Wrap this forwarder as a route handler.
    pub fn into_handler(self) -> Handler {
        let forwarder = Arc::new(self);
        handler(move |req| {
            let forwarder = forwarder.clone();
            async move { forwarder.forward(req).await }
        })
    }

    /// Forward `req` downstream and produce the response for the caller.
    pub async fn forward(&self, req: Request<Body>) -> Response {
        let request_id = Uuid::new_v4();
        let base = self.downstream.base_url();
        let url = rewrite_uri(req.uri(), &base, |p| self.downstream.mapper.map(p));
        let incoming_uri = req.uri().to_string();

        let (parts, body) = req.into_parts();
        let mut builder = self
            .client
            .request(parts.method.clone(), &url)
            .headers(request_headers(&parts.headers));
        if body.size_hint().exact() != Some(0) {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let outbound = match builder.build() {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    url = %url,
                    error = %e,
                    "Failed to construct downstream request"
                );
                return internal_error();
            }
        };

        let res = match self.client.execute(outbound).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    downstream = %self.downstream.target,
                    url = %url,
                    error = %e,
                    "Failed to send downstream request"
                );
                return internal_error();
            }
        };

        let status = res.status();
        let headers = response_headers(res.headers());
        let stream = res.bytes_stream().inspect_err(move |e| {
            tracing::error!(
                request_id = %request_id,
                error = %e,
                "Failed to forward response body"
            );
        });

        let mut response = Response::new(Body::from_stream(stream));
        *response.status_mut() = status;
        *response.headers_mut() = headers;

        tracing::info!(
            request_id = %request_id,
            method = %parts.method,
            from = %incoming_uri,
            to = %url,
            status = status.as_u16(),
            "Proxied request"
        );
        response
    }
}
