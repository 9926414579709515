//! Configuration schema definitions.
//!
//! This module defines the raw configuration document as read from disk.
//! All types derive `Deserialize` and are read from YAML or TOML;
//! nothing here is resolved or cross-referenced yet (see `validation.rs`).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Root configuration for the reverse proxy.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Services requests can be forwarded to.
    #[serde(alias = "downstream")]
    pub downstreams: Vec<DownstreamConfig>,

    /// Routes served over plain HTTP.
    pub http: HttpConfig,

    /// Routes served over HTTPS.
    pub https: HttpsConfig,
}

/// A downstream service, referenced from incoming routes by `target`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DownstreamConfig {
    /// Unique name incoming routes use to reference this downstream.
    pub target: String,

    /// Scheme used to reach the downstream ("http" or "https").
    pub protocol: String,

    pub host: String,

    pub port: u16,

    /// Base path prepended to every forwarded path.
    #[serde(default)]
    pub base: String,

    /// Flat field map selecting and configuring the path mapper.
    #[serde(default)]
    pub path_mapper: BTreeMap<String, String>,
}

/// Plain HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub port: u16,

    #[serde(alias = "redirect")]
    pub redirects: Vec<RedirectConfig>,

    pub incoming: Vec<IncomingConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 80,
            redirects: Vec::new(),
            incoming: Vec::new(),
        }
    }
}

/// HTTPS listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpsConfig {
    pub port: u16,

    /// Path to certificate file (PEM).
    pub cert_file: PathBuf,

    /// Path to private key file (PEM).
    pub key_file: PathBuf,

    #[serde(alias = "redirect")]
    pub redirects: Vec<RedirectConfig>,

    pub incoming: Vec<IncomingConfig>,
}

impl Default for HttpsConfig {
    fn default() -> Self {
        Self {
            port: 443,
            cert_file: PathBuf::new(),
            key_file: PathBuf::new(),
            redirects: Vec::new(),
            incoming: Vec::new(),
        }
    }
}

/// A route answered with a redirect instead of being forwarded.
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectConfig {
    /// Route pattern to match.
    pub from: String,

    /// Value of the `Location` header, sent verbatim.
    pub to: String,

    /// Method tokens, or `*` for every method.
    #[serde(default)]
    pub methods: Vec<String>,
}

/// A route forwarded to a downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingConfig {
    /// Route pattern to match.
    pub path: String,

    /// Method tokens, or `*` for every method.
    #[serde(default)]
    pub methods: Vec<String>,

    /// `target` of the downstream to forward to.
    pub target: String,
}
