//! Startup orchestration and serving.
//!
//! # Responsibilities
//! - Build the route table of each listener section
//! - Bind listeners and load TLS material
//! - Serve until shutdown, then drain gracefully
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and nothing keeps serving
//! - A section without redirects and incoming routes gets no listener
//! - A listener dying outside shutdown is fatal and stops the others
//! - Draining relies on the server libraries; no extra deadline

use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tokio::task::JoinSet;

use crate::config::Configuration;
use crate::http::{build_router, downstream_client, section_routes};
use crate::lifecycle::shutdown::Shutdown;
use crate::net::{load_tls_config, Listener, ListenerError, TlsError};
use crate::routing::RouteError;

/// Error type for starting and running the listeners.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to build downstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid {listener} routes: {}", join(.errors))]
    Route {
        listener: &'static str,
        errors: Vec<RouteError>,
    },

    #[error(transparent)]
    Bind(#[from] ListenerError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("{listener} server stopped: {source}")]
    Serve {
        listener: &'static str,
        source: std::io::Error,
    },

    #[error("{listener} server task failed: {reason}")]
    Task {
        listener: &'static str,
        reason: String,
    },
}

fn join(errors: &[RouteError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

struct PlainListener {
    listener: Listener,
    router: Router,
}

struct SecureListener {
    listener: Listener,
    tls: RustlsConfig,
    router: Router,
}

/// Listeners bound and ready to serve.
pub struct ProxyServer {
    http: Option<PlainListener>,
    https: Option<SecureListener>,
}

impl ProxyServer {
    /// Perform every fallible startup step without serving yet.
    pub async fn bind(config: &Configuration) -> Result<Self, ServeError> {
        let client = downstream_client()?;

        let http = if config.http.is_empty() {
            tracing::info!("No HTTP routes or redirects configured, not starting HTTP");
            None
        } else {
            let routes = section_routes(&config.http.redirects, &config.http.incoming, &client)
                .map_err(|errors| ServeError::Route {
                    listener: "http",
                    errors,
                })?;
            Some(PlainListener {
                listener: Listener::bind("http", config.http.port).await?,
                router: build_router(routes),
            })
        };

        let https = if config.https.is_empty() {
            tracing::info!("No HTTPS routes or redirects configured, not starting HTTPS");
            None
        } else {
            let routes = section_routes(&config.https.redirects, &config.https.incoming, &client)
                .map_err(|errors| ServeError::Route {
                    listener: "https",
                    errors,
                })?;
            let tls = load_tls_config(&config.https.cert_file, &config.https.key_file).await?;
            Some(SecureListener {
                listener: Listener::bind("https", config.https.port).await?,
                tls,
                router: build_router(routes),
            })
        };

        Ok(Self { http, https })
    }

    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http.as_ref().map(|l| l.listener.local_addr())
    }

    pub fn https_addr(&self) -> Option<SocketAddr> {
        self.https.as_ref().map(|l| l.listener.local_addr())
    }

    /// Serve every bound listener until `shutdown` is triggered.
    ///
    /// If a listener fails, shutdown is triggered for the rest and the
    /// first failure is returned once all of them have stopped.
    pub async fn run(self, shutdown: Shutdown) -> Result<(), ServeError> {
        let mut tasks: JoinSet<Result<(), ServeError>> = JoinSet::new();

        if let Some(http) = self.http {
            let signal = shutdown.subscribe();
            tasks.spawn(async move {
                tracing::info!(address = %http.listener.local_addr(), "Starting http server");
                axum::serve(http.listener.into_tokio(), http.router)
                    .with_graceful_shutdown(signal.recv())
                    .await
                    .map_err(|source| ServeError::Serve {
                        listener: "http",
                        source,
                    })?;
                tracing::info!("http server stopped");
                Ok(())
            });
        }

        if let Some(https) = self.https {
            let addr = https.listener.local_addr();
            let std_listener = https.listener.into_std()?;
            let handle = axum_server::Handle::new();

            let signal = shutdown.subscribe();
            let drain = handle.clone();
            tokio::spawn(async move {
                signal.recv().await;
                drain.graceful_shutdown(None);
            });

            tasks.spawn(async move {
                tracing::info!(address = %addr, "Starting https server");
                axum_server::from_tcp_rustls(std_listener, https.tls)
                    .handle(handle)
                    .serve(https.router.into_make_service())
                    .await
                    .map_err(|source| ServeError::Serve {
                        listener: "https",
                        source,
                    })?;
                tracing::info!("https server stopped");
                Ok(())
            });
        }

        if tasks.is_empty() {
            tracing::warn!("No listeners configured, waiting for shutdown");
            shutdown.subscribe().recv().await;
            return Ok(());
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined.unwrap_or_else(|e| {
                Err(ServeError::Task {
                    listener: "listener",
                    reason: e.to_string(),
                })
            });
            if let Err(e) = result {
                tracing::error!(error = %e, "Listener failed, shutting down");
                shutdown.trigger();
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Bind and serve `config` until `shutdown` is triggered.
pub async fn serve(config: &Configuration, shutdown: Shutdown) -> Result<(), ServeError> {
    let server = ProxyServer::bind(config).await?;
    server.run(shutdown).await
}
