//! TLS configuration and certificate loading.

use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;

/// Error type for loading the HTTPS certificate pair.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("{kind} file not found: {path:?}")]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("failed to load certificate {cert:?} and key {key:?}: {source}")]
    Load {
        cert: PathBuf,
        key: PathBuf,
        source: std::io::Error,
    },
}

/// Load TLS configuration from certificate and key files (PEM).
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    for (kind, path) in [("Certificate", cert_path), ("Private key", key_path)] {
        if !path.is_file() {
            return Err(TlsError::NotFound {
                kind,
                path: path.to_path_buf(),
            });
        }
    }

    RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|source| TlsError::Load {
            cert: cert_path.to_path_buf(),
            key: key_path.to_path_buf(),
            source,
        })
}
