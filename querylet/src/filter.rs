//! Typed filters: check the raw bound value and encode it as a SQL literal.

use crate::ast::FilterKind;
use crate::error::{Error, Result};
use crate::value::Value;

impl FilterKind {
    /// What the filter accepts, as it appears in type errors
    pub fn expected(&self) -> &'static str {
        match self {
            FilterKind::Int => "an Integer",
            FilterKind::Float => "a Float",
            FilterKind::Str => "a String",
            FilterKind::Arr => {
                "an Array with all of the same datatype eg String, Integer, Float"
            }
            FilterKind::Wild => "String, Integer or Float",
        }
    }

    /// Encodes `value`, bound to `parameter`, as a SQL literal.
    ///
    /// Quoted output is not escaped; the text is placed between the quotes
    /// exactly as bound.
    pub fn apply(&self, parameter: &str, value: &Value) -> Result<String> {
        let mismatch = || Error::FilterType {
            parameter: parameter.to_string(),
            kind: *self,
        };
        match (self, value) {
            (FilterKind::Int, Value::Integer(_)) | (FilterKind::Float, Value::Float(_)) => {
                Ok(value.to_string())
            }
            (FilterKind::Str, Value::Text(text)) => Ok(format!("'{}'", text)),
            (FilterKind::Arr, Value::Collection(items)) => encode_array(items).ok_or_else(mismatch),
            (FilterKind::Wild, Value::Text(_) | Value::Integer(_) | Value::Float(_)) => {
                Ok(format!("'%{}%'", value))
            }
            _ => Err(mismatch()),
        }
    }
}

/// Text collections become a quoted list, numeric ones a bare list. Returns
/// `None` when the elements are mixed or not scalars.
fn encode_array(items: &[Value]) -> Option<String> {
    let joined = |glue: &str| {
        items
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(glue)
    };
    if items.iter().all(|v| matches!(v, Value::Text(_))) {
        return Some(format!("'{}'", joined("','")));
    }
    let numeric = items.iter().all(|v| matches!(v, Value::Integer(_)))
        || items.iter().all(|v| matches!(v, Value::Float(_)));
    numeric.then(|| joined(","))
}
