use std::collections::BTreeSet;
use std::path::PathBuf;

use parity_core::ParityError;
use thiserror::Error;

/// Errors raised while loading, resolving or validating rule sets.
///
/// All of them are fatal for an assessment run: a partially loaded rule set
/// cannot be trusted.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("configuration value not found: {key}")]
    MissingConfig { key: String },
    #[error("failed to read configuration {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {key}: {message}")]
    Parse { key: String, message: String },
    #[error("duplicate rule '{rule}' in rule set '{rule_set}'")]
    DuplicateRule { rule_set: String, rule: String },
    #[error("unable to resolve base rules in rule set '{rule_set}': {}", join(.rules))]
    UnresolvedDependencies {
        rule_set: String,
        rules: Vec<String>,
    },
    #[error("rule '{rule}' in rule set '{rule_set}' is not qualified, missing: {}", join(.missing))]
    UnqualifiedRule {
        rule_set: String,
        rule: String,
        missing: Vec<String>,
    },
    #[error("rule '{rule}' in rule set '{rule_set}' uses unknown evaluator type '{kind}'")]
    UnknownEvaluatorType {
        rule_set: String,
        rule: String,
        kind: String,
    },
    #[error(
        "placeholder mismatch for rule '{rule}' in rule set '{rule_set}' (unexpected: [{}], missing: [{}]) in item {item}",
        join_set(.unexpected),
        join_set(.missing)
    )]
    PlaceholderMismatch {
        rule_set: String,
        rule: String,
        unexpected: BTreeSet<String>,
        missing: BTreeSet<String>,
        item: String,
    },
    #[error("invalid pattern for rule '{rule}' in rule set '{rule_set}': {message}")]
    InvalidPattern {
        rule_set: String,
        rule: String,
        message: String,
    },
    #[error("invalid evaluator configuration for rule '{rule}' in rule set '{rule_set}': {message}")]
    InvalidEvaluatorConfig {
        rule_set: String,
        rule: String,
        message: String,
    },
}

impl RuleError {
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RuleError::Io {
            path: path.into().display().to_string(),
            source,
        }
    }

    pub fn parse_error(key: impl Into<String>, message: impl Into<String>) -> Self {
        RuleError::Parse {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the match engine while matching a single rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("array pattern with {len} elements cannot be matched against the array at '{path}'")]
    ArrayToArrayUnsupported { path: String, len: usize },
    #[error("unsupported JSON token type '{kind}' at '{path}'")]
    UnsupportedToken { path: String, kind: &'static str },
}

impl From<RuleError> for ParityError {
    fn from(err: RuleError) -> Self {
        ParityError::RuleConfiguration(err.to_string())
    }
}

impl From<MatchError> for ParityError {
    fn from(err: MatchError) -> Self {
        ParityError::RuleEvaluation(err.to_string())
    }
}

fn join(items: &[String]) -> String {
    items.join(", ")
}

fn join_set(items: &BTreeSet<String>) -> String {
    items.iter().cloned().collect::<Vec<_>>().join(", ")
}
