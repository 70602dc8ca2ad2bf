//! Evaluators turn a captured match into a pass/fail verdict.

mod list;
mod message;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

pub use list::{
    BlacklistItem, ListEvaluator, ListEvaluatorConfig, WhitelistItem,
    DEFAULT_BLACKLIST_HIT_MESSAGE, DEFAULT_WHITELIST_NO_HIT_MESSAGE,
};
pub use message::{render_message, NULL_REPLACEMENT};

use crate::error::RuleError;
use crate::pattern::Match;
use crate::rule::EvaluatorKind;
use crate::store::{evaluator_config_key, ConfigStore, ConfigType};

/// Outcome of evaluating one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub pass: bool,
    pub message: Option<String>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            pass: true,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            pass: false,
            message: Some(message.into()),
        }
    }
}

/// What an evaluator needs to know about the rule it is built for.
#[derive(Debug, Clone, Copy)]
pub struct EvaluatorContext<'a> {
    pub rule_set: &'a str,
    pub rule: &'a str,
    pub placeholders: &'a BTreeSet<String>,
    pub ignore_case: bool,
}

impl EvaluatorContext<'_> {
    pub(crate) fn invalid_config(&self, message: impl Into<String>) -> RuleError {
        RuleError::InvalidEvaluatorConfig {
            rule_set: self.rule_set.to_string(),
            rule: self.rule.to_string(),
            message: message.into(),
        }
    }
}

/// Built-in evaluators.
#[derive(Debug, Clone)]
pub enum Evaluator {
    List(ListEvaluator),
}

impl Evaluator {
    /// Loads the configuration blob `config_key` of the rule set and builds
    /// the evaluator of the given kind.
    pub fn load(
        kind: EvaluatorKind,
        config_key: &str,
        store: &dyn ConfigStore,
        context: &EvaluatorContext<'_>,
    ) -> Result<Self, RuleError> {
        let key = evaluator_config_key(context.rule_set, config_key);
        let raw = store.get_value(&key, ConfigType::EvaluatorConfig)?;
        debug!(
            rule_set = context.rule_set,
            rule = context.rule,
            kind = kind.as_str(),
            key = %key,
            "building evaluator"
        );

        match kind {
            EvaluatorKind::List => ListEvaluator::from_json(&raw, context).map(Evaluator::List),
        }
    }

    pub fn kind(&self) -> EvaluatorKind {
        match self {
            Evaluator::List(_) => EvaluatorKind::List,
        }
    }

    pub fn evaluate(&self, captured: &Match, additional: &BTreeMap<String, String>) -> Verdict {
        match self {
            Evaluator::List(list) => list.evaluate(captured, additional),
        }
    }
}
