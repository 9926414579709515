//! Mapper that strips a configured prefix from the path.

use super::{MapperError, MapperFields, TYPE_FIELD};

const TYPE: &str = "remove-prefix";
const PREFIX_FIELD: &str = "prefix";

/// Removes `prefix` from the start of the path when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovePrefix {
    prefix: String,
}

impl RemovePrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A path without the prefix is returned unchanged.
    pub fn map(&self, path: &str) -> String {
        let mapped = path.strip_prefix(self.prefix.as_str()).unwrap_or(path);
        tracing::debug!(prefix = %self.prefix, from = %path, to = %mapped, "Removing prefix");
        mapped.to_string()
    }

    /// Accepts exactly `{type: remove-prefix, prefix: <string>}`.
    pub fn configure(fields: &MapperFields) -> Result<Self, MapperError> {
        if fields.len() != 2 {
            return Err(MapperError::new(
                "RemovePrefix",
                format!(
                    "configuration has {} fields, requires exactly 2 (type == {TYPE}, prefix)",
                    fields.len()
                ),
            ));
        }
        match fields.get(TYPE_FIELD).map(String::as_str) {
            Some(TYPE) => {}
            Some(other) => {
                return Err(MapperError::new(
                    "RemovePrefix",
                    format!("configuration has type {other}, requires {TYPE}"),
                ))
            }
            None => return Err(MapperError::new("RemovePrefix", "configuration has no type field")),
        }
        let prefix = fields
            .get(PREFIX_FIELD)
            .ok_or_else(|| MapperError::new("RemovePrefix", "configuration has no prefix field"))?;
        Ok(Self::new(prefix.clone()))
    }
}
