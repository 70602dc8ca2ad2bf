//! Blacklist / whitelist evaluator (`BuiltIn.List`).

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::{Map, Value};

use super::message::render_message;
use super::{EvaluatorContext, Verdict};
use crate::error::RuleError;
use crate::pattern::{Captured, Match};

const WILDCARD: &str = "*";

pub const DEFAULT_BLACKLIST_HIT_MESSAGE: &str =
    "The configuration is not supported in {TargetRegionName}.";
pub const DEFAULT_WHITELIST_NO_HIT_MESSAGE: &str =
    "The configuration is not in the list of configurations supported in {TargetRegionName}.";

/// Raw evaluator configuration as stored in the config store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEvaluatorConfig {
    /// Resource table: resource key to message template.
    #[serde(default)]
    pub localization: BTreeMap<String, String>,
    #[serde(default)]
    pub blacklist: Vec<BlacklistItem>,
    #[serde(default)]
    pub blacklist_default_hit_message: Option<String>,
    #[serde(default)]
    pub blacklist_default_hit_resource: Option<String>,
    #[serde(default)]
    pub whitelist: Option<Vec<WhitelistItem>>,
    #[serde(default)]
    pub whitelist_no_hit_message: Option<String>,
    #[serde(default)]
    pub whitelist_no_hit_resource: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistItem {
    pub values: Map<String, Value>,
    #[serde(default)]
    pub hit_message: Option<String>,
    #[serde(default)]
    pub hit_resource: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistItem {
    pub values: Map<String, Value>,
}

/// Flat placeholder-to-value set after array expansion.
type ValueSet = BTreeMap<String, Value>;

#[derive(Debug, Clone)]
struct CompiledBlacklistItem {
    value_sets: Vec<ValueSet>,
    hit_message: Option<String>,
}

/// Validated list evaluator.
#[derive(Debug, Clone)]
pub struct ListEvaluator {
    ignore_case: bool,
    blacklist: Vec<CompiledBlacklistItem>,
    blacklist_default_hit_message: String,
    whitelist: Option<Vec<ValueSet>>,
    whitelist_no_hit_message: String,
}

impl ListEvaluator {
    /// Parses and validates a JSON configuration blob.
    pub fn from_json(raw: &str, context: &EvaluatorContext<'_>) -> Result<Self, RuleError> {
        let config: ListEvaluatorConfig =
            serde_json::from_str(raw).map_err(|err| context.invalid_config(err.to_string()))?;
        Self::new(config, context)
    }

    /// Expands array-valued entries and checks every flat value set binds
    /// exactly the placeholders of the rule pattern.
    pub fn new(config: ListEvaluatorConfig, context: &EvaluatorContext<'_>) -> Result<Self, RuleError> {
        let resource = |key: &Option<String>| {
            key.as_deref()
                .and_then(|name| config.localization.get(name))
                .cloned()
        };

        let mut blacklist = Vec::with_capacity(config.blacklist.len());
        for item in &config.blacklist {
            let value_sets = expand_values(&item.values);
            for set in &value_sets {
                validate_names(set, &item.values, context)?;
            }
            blacklist.push(CompiledBlacklistItem {
                value_sets,
                hit_message: item
                    .hit_message
                    .clone()
                    .or_else(|| resource(&item.hit_resource)),
            });
        }

        let whitelist = match &config.whitelist {
            Some(items) if !items.is_empty() => {
                let mut sets = Vec::new();
                for item in items {
                    for set in expand_values(&item.values) {
                        validate_names(&set, &item.values, context)?;
                        sets.push(set);
                    }
                }
                Some(sets)
            }
            _ => None,
        };

        let blacklist_default_hit_message = config
            .blacklist_default_hit_message
            .clone()
            .or_else(|| resource(&config.blacklist_default_hit_resource))
            .unwrap_or_else(|| DEFAULT_BLACKLIST_HIT_MESSAGE.to_string());
        let whitelist_no_hit_message = config
            .whitelist_no_hit_message
            .clone()
            .or_else(|| resource(&config.whitelist_no_hit_resource))
            .unwrap_or_else(|| DEFAULT_WHITELIST_NO_HIT_MESSAGE.to_string());

        Ok(Self {
            ignore_case: context.ignore_case,
            blacklist,
            blacklist_default_hit_message,
            whitelist,
            whitelist_no_hit_message,
        })
    }

    pub fn blacklist_len(&self) -> usize {
        self.blacklist.iter().map(|item| item.value_sets.len()).sum()
    }

    pub fn whitelist_len(&self) -> Option<usize> {
        self.whitelist.as_ref().map(Vec::len)
    }

    pub fn evaluate(&self, captured: &Match, additional: &BTreeMap<String, String>) -> Verdict {
        let hit = self.blacklist.iter().find(|item| {
            item.value_sets
                .iter()
                .any(|set| set_matches(set, captured, self.ignore_case))
        });

        if let Some(item) = hit {
            let template = item
                .hit_message
                .as_deref()
                .unwrap_or(&self.blacklist_default_hit_message);
            return Verdict::fail(render_message(template, captured, additional));
        }

        if let Some(whitelist) = &self.whitelist {
            if !whitelist
                .iter()
                .any(|set| set_matches(set, captured, self.ignore_case))
            {
                return Verdict::fail(render_message(
                    &self.whitelist_no_hit_message,
                    captured,
                    additional,
                ));
            }
        }

        Verdict::pass()
    }
}

/// Cross product of array-valued entries.
fn expand_values(values: &Map<String, Value>) -> Vec<ValueSet> {
    values.iter().fold(vec![ValueSet::new()], |sets, (name, value)| {
        let choices: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        sets.iter()
            .flat_map(|set| {
                choices.iter().map(move |choice| {
                    let mut expanded = set.clone();
                    expanded.insert(name.clone(), (*choice).clone());
                    expanded
                })
            })
            .collect()
    })
}

fn validate_names(
    set: &ValueSet,
    item: &Map<String, Value>,
    context: &EvaluatorContext<'_>,
) -> Result<(), RuleError> {
    let names: BTreeSet<String> = set.keys().cloned().collect();
    if &names == context.placeholders {
        return Ok(());
    }

    Err(RuleError::PlaceholderMismatch {
        rule_set: context.rule_set.to_string(),
        rule: context.rule.to_string(),
        unexpected: names.difference(context.placeholders).cloned().collect(),
        missing: context.placeholders.difference(&names).cloned().collect(),
        item: Value::Object(item.clone()).to_string(),
    })
}

fn set_matches(set: &ValueSet, captured: &Match, ignore_case: bool) -> bool {
    set.len() == captured.len()
        && set.iter().all(|(name, stored)| {
            captured
                .value(name)
                .map(|value| value_equals(stored, value, ignore_case))
                .unwrap_or(false)
        })
}

/// Structural equality where a stored `*` string matches any captured value.
fn value_equals(stored: &Value, captured: &Captured, ignore_case: bool) -> bool {
    match (stored, captured) {
        (Value::String(text), _) if text == WILDCARD => true,
        (Value::String(text), Captured::String(actual)) => {
            if ignore_case {
                text.to_lowercase() == actual.to_lowercase()
            } else {
                text == actual
            }
        }
        (Value::Number(number), Captured::Long(actual)) => number.as_i64() == Some(*actual),
        (Value::Bool(flag), Captured::Bool(actual)) => flag == actual,
        _ => false,
    }
}
