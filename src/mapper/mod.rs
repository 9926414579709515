//! Path mapping subsystem.
//!
//! # Data Flow
//! ```text
//! downstream `path-mapper` field map
//!     → resolve() tries each variant in declaration order
//!     → first variant whose configure() accepts the map wins
//!     → PathMapper stored on the validated Downstream
//!
//! Per request:
//!     incoming path → PathMapper::map → path sent downstream
//! ```
//!
//! # Design Decisions
//! - Closed set of variants; adding one means adding it to `resolve`
//! - Ties between variants accepting the same map go to the first declared
//! - Mapping is total: a mapper never fails at request time

pub mod passthrough;
pub mod remove_prefix;

use std::collections::BTreeMap;

pub use passthrough::Passthrough;
pub use remove_prefix::RemovePrefix;

/// Flat string-keyed configuration consumed by the mapper variants.
pub type MapperFields = BTreeMap<String, String>;

/// Key every mapper configuration carries to name its variant.
pub const TYPE_FIELD: &str = "type";

/// A mapper variant rejected a configuration map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{mapper}: {reason}")]
pub struct MapperError {
    pub mapper: &'static str,
    pub reason: String,
}

impl MapperError {
    pub(crate) fn new(mapper: &'static str, reason: impl Into<String>) -> Self {
        Self {
            mapper,
            reason: reason.into(),
        }
    }
}

/// No mapper variant accepted a configuration map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no mapper matching configuration {fields:?} (failed to match: {})", join(.rejections))]
pub struct ResolveMapperError {
    pub fields: MapperFields,
    pub rejections: Vec<MapperError>,
}

fn join(errors: &[MapperError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rewrites an incoming request path into the path sent to a downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMapper {
    Passthrough(Passthrough),
    RemovePrefix(RemovePrefix),
}

impl PathMapper {
    /// Map an incoming path onto the downstream path.
    pub fn map(&self, path: &str) -> String {
        match self {
            PathMapper::Passthrough(m) => m.map(path),
            PathMapper::RemovePrefix(m) => m.map(path),
        }
    }

    /// Resolve the first mapper variant that accepts `fields`.
    ///
    /// Variants are tried in declaration order: `Passthrough`, then `RemovePrefix`.
    pub fn resolve(fields: &MapperFields) -> Result<Self, ResolveMapperError> {
        let attempts: [fn(&MapperFields) -> Result<PathMapper, MapperError>; 2] = [
            |f| Passthrough::configure(f).map(PathMapper::Passthrough),
            |f| RemovePrefix::configure(f).map(PathMapper::RemovePrefix),
        ];

        let mut rejections = Vec::with_capacity(attempts.len());
        for attempt in attempts {
            match attempt(fields) {
                Ok(mapper) => return Ok(mapper),
                Err(e) => rejections.push(e),
            }
        }

        Err(ResolveMapperError {
            fields: fields.clone(),
            rejections,
        })
    }
}
