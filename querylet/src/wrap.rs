//! JSON aggregation wrappers.
//!
//! The exact text matters: downstream SQL relies on the `array_row` and
//! `object_row` aliases and on the `COALESCE` defaults.

use crate::ast::{BlockKind, PartialKind};

/// Aggregates every row of `content` into a JSON array, `[]` when empty
pub fn array(content: &str) -> String {
    format!(
        "(SELECT COALESCE(array_to_json(array_agg(row_to_json(array_row))),'[]'::json) FROM (\n{}\n) array_row)",
        content
    )
}

/// Turns the single row of `content` into a JSON object, `{}` when empty
pub fn object(content: &str) -> String {
    format!(
        "(SELECT COALESCE(row_to_json(object_row),'{{}}'::json) FROM (\n{}\n) object_row)",
        content
    )
}

impl PartialKind {
    pub fn wrap(&self, content: String) -> String {
        match self {
            PartialKind::Array => array(&content),
            PartialKind::Object => object(&content),
            PartialKind::Include => content,
        }
    }
}

impl BlockKind {
    pub fn wrap(&self, content: String) -> String {
        match self {
            BlockKind::Array => array(&content),
            BlockKind::Object => object(&content),
            BlockKind::Plain => content,
        }
    }
}
