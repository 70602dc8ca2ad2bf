//! JSON pattern compilation and structural matching.
//!
//! A pattern is a JSON tree whose string leaves are either literals, the
//! wildcard `*`, or a single placeholder `{name}` capturing the input value
//! found at the same position. `{{` and `}}` escape literal braces.

mod binding;
mod match_set;
mod matcher;

use std::collections::BTreeSet;

use serde_json::Value;
use thiserror::Error;

pub use binding::{Binding, Captured, Match};
pub use match_set::MatchSet;

use crate::error::MatchError;

const WILDCARD: &str = "*";

/// Compiled pattern tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternNode {
    Wildcard,
    Placeholder(String),
    /// Literal text, already unescaped.
    Literal(String),
    Integer(i64),
    Boolean(bool),
    Object(Vec<(String, PatternNode)>),
    Array(Vec<PatternNode>),
}

/// Error raised when a pattern document cannot be compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported {kind} leaf at '{path}'")]
pub struct PatternError {
    pub path: String,
    pub kind: &'static str,
}

impl PatternNode {
    /// Compiles a JSON pattern document.
    pub fn compile(value: &Value) -> Result<Self, PatternError> {
        compile_node(value, "")
    }

    fn collect_placeholders(&self, names: &mut BTreeSet<String>) {
        match self {
            PatternNode::Placeholder(name) => {
                names.insert(name.clone());
            }
            PatternNode::Object(properties) => {
                for (_, child) in properties {
                    child.collect_placeholders(names);
                }
            }
            PatternNode::Array(items) => {
                for item in items {
                    item.collect_placeholders(names);
                }
            }
            _ => {}
        }
    }
}

/// A compiled pattern bound to its case-sensitivity setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    root: PatternNode,
    ignore_case: bool,
}

impl Pattern {
    pub fn compile(value: &Value, ignore_case: bool) -> Result<Self, PatternError> {
        Ok(Self {
            root: PatternNode::compile(value)?,
            ignore_case,
        })
    }

    pub fn root(&self) -> &PatternNode {
        &self.root
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Names of every placeholder in the pattern.
    pub fn placeholders(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.root.collect_placeholders(&mut names);
        names
    }

    /// Matches the pattern against `input`.
    ///
    /// `Ok(None)` means a structural mismatch. `Ok(Some(set))` may still hold
    /// zero matches, which also counts as a failed match.
    pub fn matches(&self, input: &Value) -> Result<Option<MatchSet>, MatchError> {
        matcher::match_node(&self.root, input, "", self.ignore_case)
    }
}

/// Parses a `{name}` placeholder token. Escaped braces never form a placeholder.
pub fn parse_placeholder(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains('{') || inner.contains('}') {
        return None;
    }
    Some(inner)
}

/// Replaces `{{` and `}}` with single braces.
pub fn unescape_braces(text: &str) -> String {
    text.replace("{{", "{").replace("}}", "}")
}

pub(crate) fn child_path(parent: &str, key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '@' || c == '-');
    match (parent.is_empty(), plain) {
        (true, true) => key.to_string(),
        (false, true) => format!("{}.{}", parent, key),
        (_, false) => format!("{}['{}']", parent, key),
    }
}

pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn compile_node(value: &Value, path: &str) -> Result<PatternNode, PatternError> {
    match value {
        Value::String(text) if text == WILDCARD => Ok(PatternNode::Wildcard),
        Value::String(text) => Ok(match parse_placeholder(text) {
            Some(name) => PatternNode::Placeholder(name.to_string()),
            None => PatternNode::Literal(unescape_braces(text)),
        }),
        Value::Bool(flag) => Ok(PatternNode::Boolean(*flag)),
        Value::Number(number) => number.as_i64().map(PatternNode::Integer).ok_or_else(|| {
            PatternError {
                path: path.to_string(),
                kind: "float",
            }
        }),
        Value::Object(map) => map
            .iter()
            .map(|(key, child)| Ok((key.clone(), compile_node(child, &child_path(path, key))?)))
            .collect::<Result<Vec<_>, _>>()
            .map(PatternNode::Object),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| compile_node(item, &index_path(path, index)))
            .collect::<Result<Vec<_>, _>>()
            .map(PatternNode::Array),
        Value::Null => Err(PatternError {
            path: path.to_string(),
            kind: "null",
        }),
    }
}
