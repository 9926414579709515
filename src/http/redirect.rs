//! Redirect responses served by the proxy itself.

use axum::body::Body;
use axum::http::header::{InvalidHeaderValue, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;

use crate::routing::{handler, Handler};

/// Answers every request with `302 Found` to a fixed location.
#[derive(Debug, Clone)]
pub struct Redirector {
    location: HeaderValue,
}

impl Redirector {
    /// The location is sent verbatim; it must be a valid header value.
    pub fn new(to: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            location: HeaderValue::try_from(to)?,
        })
    }

    pub fn respond(&self) -> Response {
        let mut res = Response::new(Body::empty());
        *res.status_mut() = StatusCode::FOUND;
        res.headers_mut().insert(LOCATION, self.location.clone());
        res
    }

    pub fn into_handler(self) -> Handler {
        handler(move |_req| {
            let res = self.respond();
            async move { res }
        })
    }
}
