//! Rule inheritance resolution.
//!
//! Rules without a base are decided up front. Rules naming a base are
//! populated once their base is decided, repeatedly, until every rule is
//! decided or no further progress is possible.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::RuleError;
use crate::rule::RuleDefinition;

/// Resolves `base` inheritance for every rule of one rule set.
///
/// The returned rules keep document order and include abstract rules.
pub fn resolve_rule_set(
    rule_set_id: &str,
    definitions: Vec<RuleDefinition>,
) -> Result<Vec<RuleDefinition>, RuleError> {
    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(definitions.len());
    let mut decided: HashMap<String, RuleDefinition> = HashMap::new();
    let mut undecided: Vec<RuleDefinition> = Vec::new();

    for definition in definitions {
        if !seen.insert(definition.name.clone()) {
            return Err(RuleError::DuplicateRule {
                rule_set: rule_set_id.to_string(),
                rule: definition.name,
            });
        }
        order.push(definition.name.clone());

        if definition.base.is_some() {
            undecided.push(definition);
        } else if definition.is_abstract || definition.is_qualified() {
            decided.insert(definition.name.clone(), definition);
        } else {
            return Err(unqualified(rule_set_id, &definition));
        }
    }

    while !undecided.is_empty() {
        let ready = undecided.iter().position(|definition| {
            definition
                .base
                .as_deref()
                .map(|base| decided.contains_key(base))
                .unwrap_or(false)
        });

        let Some(index) = ready else {
            return Err(RuleError::UnresolvedDependencies {
                rule_set: rule_set_id.to_string(),
                rules: undecided.into_iter().map(|definition| definition.name).collect(),
            });
        };

        let mut definition = undecided.remove(index);
        if let Some(base) = definition.base.as_deref().and_then(|name| decided.get(name)) {
            definition.inherit_from(base);
        }
        debug!(
            rule_set = rule_set_id,
            rule = %definition.name,
            base = ?definition.base,
            "rule resolved from base"
        );
        decided.insert(definition.name.clone(), definition);
    }

    let mut resolved = Vec::with_capacity(order.len());
    for name in order {
        let Some(definition) = decided.remove(&name) else {
            continue;
        };
        if !definition.is_abstract && !definition.is_qualified() {
            return Err(unqualified(rule_set_id, &definition));
        }
        resolved.push(definition);
    }

    Ok(resolved)
}

fn unqualified(rule_set_id: &str, definition: &RuleDefinition) -> RuleError {
    RuleError::UnqualifiedRule {
        rule_set: rule_set_id.to_string(),
        rule: definition.name.clone(),
        missing: definition.missing_fields(),
    }
}
