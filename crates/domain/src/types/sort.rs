//! Sort order model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_wire_keyword_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl_wire_keyword_conversions!(SortDirection {
    Asc => "ASC",
    Desc => "DESC",
});

impl SortDirection {
    /// Parse the way the remote API does: anything unrecognised is `ASC`.
    pub fn lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Lenient parse of a JSON direction value; non-strings are `ASC`.
    pub fn from_value(value: &Value) -> Self {
        value.as_str().map(Self::lenient).unwrap_or_default()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One key of a multi-key client-side sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }
}
