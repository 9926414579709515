//! End-to-end forwarding through a running proxy.

mod common;

use std::collections::BTreeMap;

use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::{any, get};
use axum::{Json, Router};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use common::{client, downstream_yaml, start_mock_backend, start_proxy};

const MAPPER_UNCHANGED: &str = "    path-mapper:\n      type: forward-unchanged\n";

async fn echo_uri(uri: Uri) -> String {
    uri.to_string()
}

async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, Vec<String>>> {
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &headers {
        seen.entry(name.as_str().to_string())
            .or_default()
            .push(value.to_str().unwrap_or_default().to_string());
    }
    Json(seen)
}

#[tokio::test]
async fn test_get_is_forwarded_and_other_methods_are_rejected() {
    let backend = start_mock_backend(Router::new().route("/test", get(|| async { "X" }))).await;
    let yaml = format!(
        "downstreams:\n{}http:\n  port: 0\n  incoming:\n    - path: /test\n      methods: [GET]\n      target: svc\n",
        downstream_yaml("svc", backend, MAPPER_UNCHANGED)
    );
    let proxy = start_proxy(&yaml).await;
    let client = client();

    let res = client.get(proxy.url("/test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "X");

    let res = client.put(proxy.url("/test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "GET");

    let res = client.get(proxy.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    proxy.stop().await.unwrap();
}

#[tokio::test]
async fn test_prefix_is_removed_and_base_and_query_are_kept() {
    let backend = start_mock_backend(Router::new().route("/{*rest}", get(echo_uri))).await;
    let yaml = format!(
        "downstreams:\n{}http:\n  port: 0\n  incoming:\n    - path: /api/{{*rest}}\n      methods: [GET]\n      target: svc\n",
        downstream_yaml(
            "svc",
            backend,
            "    base: /v1\n    path-mapper:\n      type: remove-prefix\n      prefix: /api\n"
        )
    );
    let proxy = start_proxy(&yaml).await;

    let res = client()
        .get(proxy.url("/api/users/7?expand=true"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "/v1/users/7?expand=true");

    proxy.stop().await.unwrap();
}

#[tokio::test]
async fn test_wildcard_method_forwards_any_method_with_body() {
    let backend = start_mock_backend(Router::new().route(
        "/submit",
        any(|method: axum::http::Method, body: String| async move {
            format!("{method} {body}")
        }),
    ))
    .await;
    let yaml = format!(
        "downstreams:\n{}http:\n  port: 0\n  incoming:\n    - path: /submit\n      methods: ['*']\n      target: svc\n",
        downstream_yaml("svc", backend, MAPPER_UNCHANGED)
    );
    let proxy = start_proxy(&yaml).await;
    let client = client();

    let res = client
        .post(proxy.url("/submit"))
        .body("hello downstream")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "POST hello downstream");

    let res = client.delete(proxy.url("/submit")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "DELETE ");

    proxy.stop().await.unwrap();
}

#[tokio::test]
async fn test_request_headers_are_forwarded_without_denylisted_ones() {
    let backend = start_mock_backend(Router::new().route("/headers", get(echo_headers))).await;
    let yaml = format!(
        "downstreams:\n{}http:\n  port: 0\n  incoming:\n    - path: /headers\n      methods: [GET]\n      target: svc\n",
        downstream_yaml("svc", backend, MAPPER_UNCHANGED)
    );
    let proxy = start_proxy(&yaml).await;

    let res = client()
        .get(proxy.url("/headers"))
        .header("oof", "rab")
        .header("keep-alive", "timeout=5")
        .header("close", "yes")
        .header("x-trace", "abc")
        .header("oof", "ferp")
        .send()
        .await
        .unwrap();
    let seen: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&res.text().await.unwrap()).unwrap();

    assert_eq!(seen["oof"], ["rab", "ferp"]);
    assert_eq!(seen["x-trace"], ["abc"]);
    assert!(!seen.contains_key("keep-alive"));
    assert!(!seen.contains_key("close"));

    proxy.stop().await.unwrap();
}

#[tokio::test]
async fn test_response_headers_and_status_are_relayed() {
    let backend = start_mock_backend(Router::new().route(
        "/created",
        get(|| async {
            (
                StatusCode::CREATED,
                [("x-custom", "1"), ("keep-alive", "timeout=5"), ("close", "yes")],
                "made",
            )
        }),
    ))
    .await;
    let yaml = format!(
        "downstreams:\n{}http:\n  port: 0\n  incoming:\n    - path: /created\n      methods: [GET]\n      target: svc\n",
        downstream_yaml("svc", backend, MAPPER_UNCHANGED)
    );
    let proxy = start_proxy(&yaml).await;

    let res = client().get(proxy.url("/created")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["x-custom"], "1");
    assert!(res.headers().get("keep-alive").is_none());
    assert!(res.headers().get("close").is_none());
    assert_eq!(res.text().await.unwrap(), "made");

    proxy.stop().await.unwrap();
}

#[tokio::test]
async fn test_downstream_redirects_are_relayed_not_followed() {
    let backend = start_mock_backend(Router::new().route(
        "/moved",
        get(|| async { (StatusCode::FOUND, [("location", "/elsewhere")]) }),
    ))
    .await;
    let yaml = format!(
        "downstreams:\n{}http:\n  port: 0\n  incoming:\n    - path: /moved\n      methods: [GET]\n      target: svc\n",
        downstream_yaml("svc", backend, MAPPER_UNCHANGED)
    );
    let proxy = start_proxy(&yaml).await;

    let res = client().get(proxy.url("/moved")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/elsewhere");

    proxy.stop().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_downstream_is_internal_error() {
    // Grab a free port, then release it so nothing is listening there.
    let port = {
        let reserved = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        reserved.local_addr().unwrap().port()
    };
    let yaml = format!(
        "downstreams:\n  - target: gone\n    protocol: http\n    host: 127.0.0.1\n    port: {port}\n{MAPPER_UNCHANGED}http:\n  port: 0\n  incoming:\n    - path: /gone\n      methods: [GET]\n      target: gone\n"
    );
    let proxy = start_proxy(&yaml).await;

    let res = client().get(proxy.url("/gone")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.headers().get("content-type").is_none());
    assert_eq!(res.text().await.unwrap(), "500: something went wrong");

    proxy.stop().await.unwrap();
}

#[tokio::test]
async fn test_redirect_responds_with_location() {
    let yaml = "http:\n  port: 0\n  redirects:\n    - from: /go\n      to: /there\n      methods: [GET]\n";
    let proxy = start_proxy(yaml).await;

    let res = client().get(proxy.url("/go")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/there");
    assert_eq!(res.text().await.unwrap(), "");

    proxy.stop().await.unwrap();
}

#[tokio::test]
async fn test_connection_and_content_length_are_not_forwarded() {
    let backend = start_mock_backend(Router::new().route("/headers", any(echo_headers))).await;
    let yaml = format!(
        "downstreams:\n{}http:\n  port: 0\n  incoming:\n    - path: /headers\n      methods: [POST]\n      target: svc\n",
        downstream_yaml("svc", backend, MAPPER_UNCHANGED)
    );
    let proxy = start_proxy(&yaml).await;

    let res = client()
        .post(proxy.url("/headers"))
        .header("connection", "keep-alive")
        .header("x-trace", "abc")
        .body("twelve bytes")
        .send()
        .await
        .unwrap();
    let seen: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&res.text().await.unwrap()).unwrap();

    assert_eq!(seen["x-trace"], ["abc"]);
    assert!(!seen.contains_key("connection"));
    assert!(!seen.contains_key("content-length"));

    proxy.stop().await.unwrap();
}

/// A downstream that promises 100 body bytes, sends 5 and hangs up.
async fn start_truncating_backend() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nX-Custom: 1\r\n\r\nhello")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn test_body_failure_after_headers_keeps_proxy_serving() {
    let backend = start_truncating_backend().await;
    let yaml = format!(
        "downstreams:\n{}http:\n  port: 0\n  incoming:\n    - path: /partial\n      methods: [GET]\n      target: svc\n",
        downstream_yaml("svc", backend, MAPPER_UNCHANGED)
    );
    let proxy = start_proxy(&yaml).await;

    let res = client().get(proxy.url("/partial")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-custom"], "1");
    if let Ok(body) = res.bytes().await {
        assert!(body.len() < 100);
    }

    let res = client().get(proxy.url("/partial")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    drop(res);

    proxy.stop().await.unwrap();
}
