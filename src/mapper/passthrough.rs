//! Mapper that forwards the path unchanged.

use super::{MapperError, MapperFields, TYPE_FIELD};

const TYPE: &str = "forward-unchanged";

/// Forwards the incoming path to the downstream as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Passthrough;

impl Passthrough {
    pub fn map(&self, path: &str) -> String {
        path.to_string()
    }

    /// Accepts exactly `{type: forward-unchanged}`.
    pub fn configure(fields: &MapperFields) -> Result<Self, MapperError> {
        if fields.len() != 1 {
            return Err(MapperError::new(
                "Passthrough",
                format!(
                    "configuration has {} fields, requires exactly 1 (type == {TYPE})",
                    fields.len()
                ),
            ));
        }
        match fields.get(TYPE_FIELD).map(String::as_str) {
            Some(TYPE) => Ok(Self),
            Some(other) => Err(MapperError::new(
                "Passthrough",
                format!("configuration has type {other}, requires {TYPE}"),
            )),
            None => Err(MapperError::new("Passthrough", "configuration has no type field")),
        }
    }
}
