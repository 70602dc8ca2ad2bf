use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::MatchError;

/// Primitive value captured by a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Captured {
    String(String),
    Long(i64),
    Bool(bool),
}

impl Captured {
    /// Coerces an input JSON value into a captured primitive.
    ///
    /// Only strings, integers and booleans can be captured.
    pub fn from_json(value: &Value, path: &str) -> Result<Self, MatchError> {
        match value {
            Value::String(text) => Ok(Captured::String(text.clone())),
            Value::Bool(flag) => Ok(Captured::Bool(*flag)),
            Value::Number(number) => number.as_i64().map(Captured::Long).ok_or_else(|| {
                MatchError::UnsupportedToken {
                    path: path.to_string(),
                    kind: "float",
                }
            }),
            other => Err(MatchError::UnsupportedToken {
                path: path.to_string(),
                kind: token_kind(other),
            }),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Captured::String(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Captured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Captured::String(text) => f.write_str(text),
            Captured::Long(number) => write!(f, "{}", number),
            Captured::Bool(flag) => write!(f, "{}", flag),
        }
    }
}

/// A captured value together with the JSON path it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub value: Captured,
    pub path: String,
}

/// One consistent set of placeholder bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Match {
    bindings: BTreeMap<String, Binding>,
}

impl Match {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(name: impl Into<String>, binding: Binding) -> Self {
        let mut bindings = BTreeMap::new();
        bindings.insert(name.into(), binding);
        Self { bindings }
    }

    /// Union of two binding sets. Names bound on both sides take the value of `other`.
    pub fn merged(&self, other: &Match) -> Match {
        let mut bindings = self.bindings.clone();
        for (name, binding) in &other.bindings {
            bindings.insert(name.clone(), binding.clone());
        }
        Match { bindings }
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&Captured> {
        self.bindings.get(name).map(|binding| &binding.value)
    }

    pub fn bindings(&self) -> &BTreeMap<String, Binding> {
        &self.bindings
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The longest binding path, which points at the most deeply nested capture.
    pub fn most_specific_path(&self) -> Option<&str> {
        self.bindings
            .values()
            .map(|binding| binding.path.as_str())
            .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
    }
}

pub(crate) fn token_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_i64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
