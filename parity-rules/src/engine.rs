use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{MatchError, RuleError};
use crate::loader::load_rules;
use crate::outcome::RuleEngineOutput;
use crate::rule::Rule;
use crate::store::ConfigStore;

/// Runs every loaded rule against a resource document.
#[derive(Debug, Default, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Loads and resolves every rule set listed in the store.
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, RuleError> {
        Ok(Self::new(load_rules(store)?))
    }

    /// Borrow the underlying rules.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn analyze(&self, resource: &Value) -> Result<Vec<RuleEngineOutput>, MatchError> {
        self.analyze_with(resource, &BTreeMap::new())
    }

    /// Evaluates every match of every rule; `additional` replacements are
    /// available to message templates alongside the captured values.
    pub fn analyze_with(
        &self,
        resource: &Value,
        additional: &BTreeMap<String, String>,
    ) -> Result<Vec<RuleEngineOutput>, MatchError> {
        let mut outputs = Vec::new();

        for rule in &self.rules {
            let Some(matches) = rule.pattern.matches(resource)? else {
                trace!(rule = %rule.name, "pattern did not match");
                continue;
            };

            for captured in matches.iter() {
                let verdict = rule.evaluator.evaluate(&captured, additional);
                debug!(
                    rule = %rule.name,
                    rule_set = %rule.rule_set_id,
                    pass = verdict.pass,
                    "rule evaluated"
                );
                let path = captured.most_specific_path().unwrap_or_default();
                outputs.push(RuleEngineOutput::new(rule, verdict.pass, verdict.message, path));
            }
        }

        Ok(outputs)
    }
}
