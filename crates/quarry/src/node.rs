// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node kind classification for `serde_json` values

use std::fmt;

use serde_json::{Number, Value};

/// Kind of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// JSON object
    Object,
    /// JSON array
    Array,
    /// JSON string
    String,
    /// JSON number
    Number,
    /// `true` or `false`
    Bool,
    /// `null`
    Null,
}

impl NodeKind {
    /// Classify a value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Bool,
            Value::Null => Self::Null,
        }
    }

    /// Objects and arrays.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }
}

/// Parse text as a JSON number, rejecting surrounding whitespace.
pub(crate) fn parse_json_number(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.len() != text.len() {
        return None;
    }
    serde_json::from_str(text).ok()
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}
