//! Header transfer and synthesized responses.
//!
//! # Responsibilities
//! - Copy headers between proxied messages, minus the denylist
//! - Build the fixed internal error response
//!
//! # Design Decisions
//! - Connection-scoped and length headers are regenerated, never copied
//! - Repeated headers keep every value
//! - Internal errors never leak their cause to the caller

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::Response;

/// Body of every synthesized internal error response.
pub const INTERNAL_ERROR_MESSAGE: &str = "500: something went wrong";

/// Headers never transferred through the proxy in either direction.
pub const DO_NOT_TRANSFER: [&str; 4] = ["content-length", "connection", "close", "keep-alive"];

/// Framing headers the HTTP stack regenerates for each hop.
const REQUEST_FRAMING: [&str; 2] = ["host", "transfer-encoding"];
const RESPONSE_FRAMING: [&str; 1] = ["transfer-encoding"];

fn transferable(name: &HeaderName, framing: &[&str]) -> bool {
    let name = name.as_str();
    !DO_NOT_TRANSFER.contains(&name) && !framing.contains(&name)
}

/// Headers to send downstream for an incoming request.
pub fn request_headers(from: &HeaderMap) -> HeaderMap {
    transfer(from, &REQUEST_FRAMING)
}

/// Headers to relay to the caller from a downstream response.
pub fn response_headers(from: &HeaderMap) -> HeaderMap {
    transfer(from, &RESPONSE_FRAMING)
}

fn transfer(from: &HeaderMap, framing: &[&str]) -> HeaderMap {
    let mut to = HeaderMap::with_capacity(from.len());
    for (name, value) in from.iter().filter(|(n, _)| transferable(n, framing)) {
        to.append(name.clone(), value.clone());
    }
    to
}

/// 500 with the fixed message and no other headers.
pub fn internal_error() -> Response {
    let mut res = Response::new(Body::from(INTERNAL_ERROR_MESSAGE));
    *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(
                HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_static(v),
            );
        }
        map
    }

    #[test]
    fn test_denylisted_request_headers_are_dropped() {
        let from = headers(&[
            ("Content-Length", "12"),
            ("Connection", "keep-alive"),
            ("Close", "true"),
            ("Keep-Alive", "timeout=5"),
            ("Host", "proxy.local"),
            ("Foo", "bar"),
        ]);
        let to = request_headers(&from);

        assert_eq!(to.len(), 1);
        assert_eq!(to["foo"], "bar");
    }

    #[test]
    fn test_repeated_values_are_kept_in_order() {
        let from = headers(&[("Oof", "rab"), ("Accept", "*/*"), ("Oof", "ferp")]);
        let to = request_headers(&from);

        let values: Vec<_> = to.get_all("oof").iter().collect();
        assert_eq!(values, ["rab", "ferp"]);
        assert_eq!(to["accept"], "*/*");
    }

    #[test]
    fn test_response_keeps_host_but_not_denylist() {
        let from = headers(&[
            ("Host", "downstream"),
            ("Keep-Alive", "timeout=5"),
            ("Transfer-Encoding", "chunked"),
            ("X-Custom", "1"),
        ]);
        let to = response_headers(&from);

        assert_eq!(to.len(), 2);
        assert!(to.contains_key("host"));
        assert!(to.contains_key("x-custom"));
    }

    #[tokio::test]
    async fn test_internal_error_has_fixed_body_and_no_headers() {
        let res = internal_error();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(res.headers().is_empty());

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], INTERNAL_ERROR_MESSAGE.as_bytes());
    }
}
