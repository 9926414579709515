//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind each configured port on all interfaces
//! - Report the bound address (ephemeral when the port is 0)
//! - Surface bind failures as fatal startup errors

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::TcpListener;

/// Interface every listener binds on.
pub const BIND_HOST: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind { addr: SocketAddr, source: std::io::Error },
    /// Failed to hand the socket over to another runtime component.
    Convert(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind { addr, source } => write!(f, "Failed to bind {}: {}", addr, source),
            ListenerError::Convert(e) => write!(f, "Failed to convert listener: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Bind { source, .. } => Some(source),
            ListenerError::Convert(e) => Some(e),
        }
    }
}

/// A bound listener and the address it ended up on.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind `0.0.0.0:<port>`.
    pub async fn bind(name: &'static str, port: u16) -> Result<Self, ListenerError> {
        let addr = SocketAddr::from((BIND_HOST, port));
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|source| ListenerError::Bind { addr, source })?;
        let local_addr = inner
            .local_addr()
            .map_err(|source| ListenerError::Bind { addr, source })?;

        tracing::info!(listener = name, address = %local_addr, "Listener bound");
        Ok(Self { inner, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn into_tokio(self) -> TcpListener {
        self.inner
    }

    /// Convert for servers driving their own accept loop; stays non-blocking.
    pub fn into_std(self) -> Result<std::net::TcpListener, ListenerError> {
        self.inner.into_std().map_err(ListenerError::Convert)
    }
}
