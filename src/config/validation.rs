//! Configuration validation.
//!
//! # Responsibilities
//! - Resolve each downstream's path mapper
//! - Check referential integrity (incoming routes reference exactly one downstream)
//! - Resolve method tokens into method routes
//! - Check every route pattern and redirect location can be registered
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Passes run independently; one failing pass does not hide another's errors
//! - Validation is a pure function: &ProxyConfig → Result<Configuration, Vec<ValidationError>>

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderValue;

use crate::config::schema::{DownstreamConfig, IncomingConfig, ProxyConfig, RedirectConfig};
use crate::http::url::BaseUrl;
use crate::mapper::{PathMapper, ResolveMapperError};
use crate::routing::{handler, route_for, MethodRoute, RouteError, RouteTable, UnsupportedMethod};

/// A single problem found while validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid mapper configuration for downstream '{target}': {source}")]
    Mapper {
        target: String,
        source: ResolveMapperError,
    },

    #[error("invalid downstream target '{target}' from incoming '{path}': {matches} downstreams match")]
    Downstream {
        path: String,
        target: String,
        matches: usize,
    },

    #[error("invalid methods in route '{route}': {source}")]
    Method {
        route: String,
        source: UnsupportedMethod,
    },

    #[error("no methods configured for route '{route}'")]
    NoMethods { route: String },

    #[error("invalid {section} route: {source}")]
    Route {
        section: &'static str,
        source: RouteError,
    },

    #[error("configuration has unresolved entries after validation")]
    Unresolved,
}

/// A validated downstream with its resolved path mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downstream {
    pub target: String,
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub base: String,
    pub mapper: PathMapper,
}

impl Downstream {
    /// Base URL forwarded requests are rewritten onto.
    pub fn base_url(&self) -> BaseUrl {
        BaseUrl {
            protocol: self.protocol.clone(),
            host: self.host.clone(),
            port: self.port,
            path: self.base.clone(),
        }
    }
}

/// A validated incoming route, bound to its downstream.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub path: String,
    pub methods: Vec<String>,
    pub target: String,
    pub downstream: Arc<Downstream>,
    /// One per configured method, in configuration order.
    pub method_routes: Vec<MethodRoute>,
}

/// A validated redirect route.
#[derive(Debug, Clone)]
pub struct Redirect {
    pub from: String,
    pub to: String,
    pub methods: Vec<String>,
    pub method_routes: Vec<MethodRoute>,
}

#[derive(Debug, Clone)]
pub struct HttpSection {
    pub port: u16,
    pub redirects: Vec<Redirect>,
    pub incoming: Vec<Incoming>,
}

impl HttpSection {
    /// A section with no routes is not served at all.
    pub fn is_empty(&self) -> bool {
        self.redirects.is_empty() && self.incoming.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct HttpsSection {
    pub port: u16,
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
    pub redirects: Vec<Redirect>,
    pub incoming: Vec<Incoming>,
}

impl HttpsSection {
    pub fn is_empty(&self) -> bool {
        self.redirects.is_empty() && self.incoming.is_empty()
    }
}

/// Validated configuration, ready to be served.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub downstreams: Vec<Arc<Downstream>>,
    pub http: HttpSection,
    pub https: HttpsSection,
}

/// Validate a raw configuration document.
pub fn validate_config(raw: &ProxyConfig) -> Result<Configuration, Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Pass 1: path mappers
    let downstreams = resolve_mappers(&raw.downstreams, &mut errors);

    // Passes 2 and 3: downstream targets and method routes, per section
    let http = resolve_section(
        &raw.downstreams,
        &downstreams,
        &raw.http.incoming,
        &raw.http.redirects,
        &mut errors,
    );
    let https = resolve_section(
        &raw.downstreams,
        &downstreams,
        &raw.https.incoming,
        &raw.https.redirects,
        &mut errors,
    );

    // Pass 4: route patterns
    check_routes("http", &raw.http.redirects, &raw.http.incoming, &mut errors);
    check_routes("https", &raw.https.redirects, &raw.https.incoming, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    assemble(raw, downstreams, http, https).ok_or_else(|| {
        tracing::error!("Configuration passed every check but has unresolved entries");
        vec![ValidationError::Unresolved]
    })
}

/// Per-route results of passes 2 and 3 for one listener section.
struct SectionResolution {
    targets: Vec<Option<Arc<Downstream>>>,
    incoming_routes: Vec<Option<Vec<MethodRoute>>>,
    redirect_routes: Vec<Option<Vec<MethodRoute>>>,
}

fn resolve_section(
    raw: &[DownstreamConfig],
    resolved: &[Option<Arc<Downstream>>],
    incoming: &[IncomingConfig],
    redirects: &[RedirectConfig],
    errors: &mut Vec<ValidationError>,
) -> SectionResolution {
    SectionResolution {
        targets: resolve_downstreams(raw, resolved, incoming, errors),
        incoming_routes: resolve_incoming_methods(incoming, errors),
        redirect_routes: resolve_redirect_methods(redirects, errors),
    }
}

/// Build the validated configuration; `None` if any slot is unresolved.
fn assemble(
    raw: &ProxyConfig,
    downstreams: Vec<Option<Arc<Downstream>>>,
    http: SectionResolution,
    https: SectionResolution,
) -> Option<Configuration> {
    Some(Configuration {
        downstreams: downstreams.into_iter().collect::<Option<Vec<_>>>()?,
        http: HttpSection {
            port: raw.http.port,
            redirects: assemble_redirects(&raw.http.redirects, http.redirect_routes)?,
            incoming: assemble_incoming(&raw.http.incoming, http.targets, http.incoming_routes)?,
        },
        https: HttpsSection {
            port: raw.https.port,
            cert_file: raw.https.cert_file.clone(),
            key_file: raw.https.key_file.clone(),
            redirects: assemble_redirects(&raw.https.redirects, https.redirect_routes)?,
            incoming: assemble_incoming(&raw.https.incoming, https.targets, https.incoming_routes)?,
        },
    })
}

fn resolve_mappers(
    raw: &[DownstreamConfig],
    errors: &mut Vec<ValidationError>,
) -> Vec<Option<Arc<Downstream>>> {
    raw.iter()
        .map(|d| match PathMapper::resolve(&d.path_mapper) {
            Ok(mapper) => {
                tracing::debug!(downstream = %d.target, mapper = ?mapper, "Resolved path mapper");
                Some(Arc::new(Downstream {
                    target: d.target.clone(),
                    protocol: d.protocol.clone(),
                    host: d.host.clone(),
                    port: d.port,
                    base: d.base.clone(),
                    mapper,
                }))
            }
            Err(source) => {
                errors.push(ValidationError::Mapper {
                    target: d.target.clone(),
                    source,
                });
                None
            }
        })
        .collect()
}

/// A target matched by a downstream whose mapper failed yields `None`
/// without a second error; pass 1 already reported it.
fn resolve_downstreams(
    raw: &[DownstreamConfig],
    resolved: &[Option<Arc<Downstream>>],
    incoming: &[IncomingConfig],
    errors: &mut Vec<ValidationError>,
) -> Vec<Option<Arc<Downstream>>> {
    incoming
        .iter()
        .map(|i| {
            let matches: Vec<usize> = raw
                .iter()
                .enumerate()
                .filter(|(_, d)| d.target == i.target)
                .map(|(idx, _)| idx)
                .collect();
            match matches.as_slice() {
                [idx] => resolved[*idx].clone(),
                _ => {
                    errors.push(ValidationError::Downstream {
                        path: i.path.clone(),
                        target: i.target.clone(),
                        matches: matches.len(),
                    });
                    None
                }
            }
        })
        .collect()
}

fn resolve_methods(
    route: &str,
    methods: &[String],
    errors: &mut Vec<ValidationError>,
) -> Option<Vec<MethodRoute>> {
    if methods.is_empty() {
        errors.push(ValidationError::NoMethods {
            route: route.to_string(),
        });
        return None;
    }

    let mut routes = Vec::with_capacity(methods.len());
    let mut valid = true;
    for token in methods {
        match route_for(token) {
            Ok(r) => routes.push(r),
            Err(source) => {
                valid = false;
                errors.push(ValidationError::Method {
                    route: route.to_string(),
                    source,
                });
            }
        }
    }
    valid.then_some(routes)
}

fn resolve_incoming_methods(
    incoming: &[IncomingConfig],
    errors: &mut Vec<ValidationError>,
) -> Vec<Option<Vec<MethodRoute>>> {
    incoming
        .iter()
        .map(|i| resolve_methods(&i.path, &i.methods, errors))
        .collect()
}

fn resolve_redirect_methods(
    redirects: &[RedirectConfig],
    errors: &mut Vec<ValidationError>,
) -> Vec<Option<Vec<MethodRoute>>> {
    redirects
        .iter()
        .map(|r| resolve_methods(&r.from, &r.methods, errors))
        .collect()
}

fn check_routes(
    section: &'static str,
    redirects: &[RedirectConfig],
    incoming: &[IncomingConfig],
    errors: &mut Vec<ValidationError>,
) {
    let noop = handler(|_req| async { axum::response::Response::default() });
    let mut table = RouteTable::new();

    for r in redirects {
        if let Err(e) = HeaderValue::try_from(r.to.as_str()) {
            errors.push(ValidationError::Route {
                section,
                source: RouteError {
                    pattern: r.from.clone(),
                    reason: format!("redirect location '{}' is not a valid header value: {}", r.to, e),
                },
            });
        }
        table.any(&r.from, noop.clone());
    }
    for i in incoming {
        table.any(&i.path, noop.clone());
    }

    if let Err(route_errors) = table.build() {
        errors.extend(
            route_errors
                .into_iter()
                .map(|source| ValidationError::Route { section, source }),
        );
    }
}

fn assemble_redirects(
    raw: &[RedirectConfig],
    routes: Vec<Option<Vec<MethodRoute>>>,
) -> Option<Vec<Redirect>> {
    raw.iter()
        .zip(routes)
        .map(|(r, method_routes)| {
            Some(Redirect {
                from: r.from.clone(),
                to: r.to.clone(),
                methods: r.methods.clone(),
                method_routes: method_routes?,
            })
        })
        .collect()
}

fn assemble_incoming(
    raw: &[IncomingConfig],
    targets: Vec<Option<Arc<Downstream>>>,
    routes: Vec<Option<Vec<MethodRoute>>>,
) -> Option<Vec<Incoming>> {
    raw.iter()
        .zip(targets)
        .zip(routes)
        .map(|((i, downstream), method_routes)| {
            Some(Incoming {
                path: i.path.clone(),
                methods: i.methods.clone(),
                target: i.target.clone(),
                downstream: downstream?,
                method_routes: method_routes?,
            })
        })
        .collect()
}
