use std::collections::HashSet;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::RuleError;
use crate::evaluator::{Evaluator, EvaluatorContext};
use crate::pattern::Pattern;
use crate::resolver::resolve_rule_set;
use crate::rule::{Rule, RuleDefinition, RuleSetDocument};
use crate::store::{rule_set_key, ConfigStore, ConfigType, RULE_SET_LIST_KEY};

/// Loads every rule set listed under [`RULE_SET_LIST_KEY`] and returns the
/// resolved, evaluable rules in declaration order.
///
/// Abstract rules only serve as bases and are not returned.
pub fn load_rules(store: &dyn ConfigStore) -> Result<Vec<Rule>, RuleError> {
    let raw = store.get_value(RULE_SET_LIST_KEY, ConfigType::RuleSetList)?;
    let ids: Vec<String> = parse_json(&raw, RULE_SET_LIST_KEY)?;

    let mut seen = HashSet::new();
    let mut rules = Vec::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            warn!(rule_set = %id, "rule set listed twice, skipping");
            continue;
        }
        let mut set_rules = load_rule_set(store, &id)?;
        rules.append(&mut set_rules);
    }

    info!(rule_sets = seen.len(), rules = rules.len(), "rule sets loaded");
    Ok(rules)
}

/// Loads and resolves a single rule set.
pub fn load_rule_set(store: &dyn ConfigStore, rule_set_id: &str) -> Result<Vec<Rule>, RuleError> {
    let key = rule_set_key(rule_set_id);
    let raw = store.get_value(&key, ConfigType::RuleSet)?;
    let mut definitions = parse_rule_definitions(&raw, &key)?;

    for definition in &mut definitions {
        definition.rule_set_id = rule_set_id.to_string();
    }

    let resolved = resolve_rule_set(rule_set_id, definitions)?;
    let mut rules = Vec::with_capacity(resolved.len());
    for definition in resolved {
        // Abstract templates are never evaluated, so their evaluator type is not checked.
        if definition.is_abstract {
            continue;
        }
        check_evaluator_kind(&definition)?;
        rules.push(build_rule(definition, store)?);
    }

    debug!(rule_set = rule_set_id, rules = rules.len(), "rule set resolved");
    Ok(rules)
}

/// Accepts either a full rule-set document or a bare list of rules.
pub fn parse_rule_definitions(raw: &str, key: &str) -> Result<Vec<RuleDefinition>, RuleError> {
    let mut attempts = Vec::new();

    match serde_json::from_str::<RuleSetDocument>(raw) {
        Ok(doc) => return Ok(doc.rules),
        Err(err) => attempts.push(format!("document: {}", err)),
    }

    match serde_json::from_str::<Vec<RuleDefinition>>(raw) {
        Ok(list) => return Ok(list),
        Err(err) => attempts.push(format!("list: {}", err)),
    }

    Err(RuleError::parse_error(
        key,
        format!("unable to parse rule set ({})", attempts.join("; ")),
    ))
}

fn parse_json<T: DeserializeOwned>(raw: &str, key: &str) -> Result<T, RuleError> {
    serde_json::from_str(raw).map_err(|err| RuleError::parse_error(key, err.to_string()))
}

fn check_evaluator_kind(definition: &RuleDefinition) -> Result<(), RuleError> {
    let parsed = definition
        .evaluator_model
        .as_ref()
        .and_then(|model| model.parsed_kind());
    match parsed {
        Some(Err(kind)) => Err(RuleError::UnknownEvaluatorType {
            rule_set: definition.rule_set_id.clone(),
            rule: definition.name.clone(),
            kind,
        }),
        _ => Ok(()),
    }
}

fn build_rule(definition: RuleDefinition, store: &dyn ConfigStore) -> Result<Rule, RuleError> {
    let unqualified = || RuleError::UnqualifiedRule {
        rule_set: definition.rule_set_id.clone(),
        rule: definition.name.clone(),
        missing: definition.missing_fields(),
    };

    let pattern_doc = definition.pattern.as_ref().ok_or_else(unqualified)?;
    let pattern = Pattern::compile(pattern_doc, definition.ignore_case).map_err(|err| {
        RuleError::InvalidPattern {
            rule_set: definition.rule_set_id.clone(),
            rule: definition.name.clone(),
            message: err.to_string(),
        }
    })?;

    let model = definition.evaluator_model.as_ref().ok_or_else(unqualified)?;
    let kind = match model.parsed_kind() {
        Some(Ok(kind)) => kind,
        _ => return Err(unqualified()),
    };
    let config_key = model.config_key.as_deref().ok_or_else(unqualified)?;

    let placeholders = pattern.placeholders();
    let context = EvaluatorContext {
        rule_set: &definition.rule_set_id,
        rule: &definition.name,
        placeholders: &placeholders,
        ignore_case: definition.ignore_case,
    };
    let evaluator = Evaluator::load(kind, config_key, store, &context)?;

    let severity = definition.severity.unwrap_or_default();
    let category = definition.category.clone().ok_or_else(unqualified)?;
    let source = definition.source.clone().ok_or_else(unqualified)?;

    Ok(Rule {
        name: definition.name,
        rule_set_id: definition.rule_set_id,
        brief: definition.brief,
        description: definition.description,
        severity,
        category,
        source,
        pattern,
        evaluator,
    })
}
