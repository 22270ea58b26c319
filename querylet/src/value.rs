//! Runtime values bound to template variables.
//!
//! Caller data is converted into [`Value`] once, when it enters the crate.
//! Filters and conditions then match on the variant instead of inspecting
//! the shape of the data again.

use std::collections::HashMap;
use std::fmt::{self, Display, Write};

use crate::error::{Error, Result};

/// A single bound value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Collection(Vec<Value>),
    /// No binding, or an explicit null
    #[default]
    Absent,
}

impl Value {
    /// Everything except `false` and [`Value::Absent`] is truthy, including
    /// `0`, the empty string and the empty collection.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Absent)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

/// Floats always keep a fractional part so `1.0` does not turn into an
/// integer literal in the generated SQL.
fn write_float(f: &mut impl Write, value: f64) -> fmt::Result {
    let text = value.to_string();
    f.write_str(&text)?;
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        f.write_str(".0")?;
    }
    Ok(())
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(value) => write_float(f, *value),
            Value::Bool(b) => write!(f, "{}", b),
            // nested collections flatten, elements are joined without a separator
            Value::Collection(items) => items.iter().try_for_each(|item| item.fmt(f)),
            Value::Absent => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Collection(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => Value::Absent,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Absent, Value::Float),
            },
            Json::String(s) => Value::Text(s),
            Json::Array(items) => Value::Collection(items.into_iter().map(Value::from).collect()),
            object @ Json::Object(_) => Value::Text(object.to_string()),
        }
    }
}

/// The name to value mapping a template is evaluated against
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Data(HashMap<String, Value>);

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Binds `name`, replacing any previous binding
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Converts a JSON object into bindings, one per top level key
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(Error::InvalidData(format!(
                "expected a JSON object at the top level, found {}",
                other
            ))),
        }
    }
}

impl TryFrom<serde_json::Value> for Data {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        Self::from_json(json)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Data {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Data::new();
        data.extend(iter);
        data
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Data {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Data {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Data {
    type Item = (String, Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
