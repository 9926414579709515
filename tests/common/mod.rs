//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use ferp::config::{parse_config, ConfigFormat};
use ferp::lifecycle::{ProxyServer, ServeError, Shutdown};

/// Serve `router` as a mock downstream on an ephemeral loopback port.
pub async fn start_mock_backend(router: Router) -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

/// A proxy serving plain HTTP for the duration of a test.
pub struct RunningProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), ServeError>>,
}

impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for every listener to drain.
    pub async fn stop(self) -> Result<(), ServeError> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("proxy did not shut down in time")
            .expect("proxy task panicked")
    }
}

/// Start a proxy from a YAML document. The HTTP listener must use port 0.
pub async fn start_proxy(yaml: &str) -> RunningProxy {
    let config = parse_config(yaml, ConfigFormat::Yaml).unwrap();
    let server = ProxyServer::bind(&config).await.unwrap();

    // Listeners bind the unspecified address; talk to them over loopback.
    let port = server.http_addr().expect("http listener not bound").port();
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

    let shutdown = Shutdown::new();
    let task = tokio::spawn(server.run(shutdown.clone()));

    RunningProxy {
        addr,
        shutdown,
        task,
    }
}

/// A client that talks to the proxy directly and never follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// A downstream section pointing at a mock backend.
pub fn downstream_yaml(target: &str, addr: SocketAddr, extra: &str) -> String {
    format!(
        "  - target: {target}\n    protocol: http\n    host: 127.0.0.1\n    port: {port}\n{extra}",
        port = addr.port()
    )
}
