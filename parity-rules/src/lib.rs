//! Service-parity rule engine.
//!
//! Rules are declared in JSON rule-set documents. Each rule pairs a JSON
//! pattern, which captures values out of a resource document into named
//! placeholders, with an evaluator that decides whether a captured
//! combination passes. Rules may inherit from a `base` rule of the same set.

mod engine;
mod error;
mod loader;
mod outcome;
mod resolver;
mod rule;

pub mod evaluator;
pub mod pattern;
pub mod store;

pub use engine::RuleEngine;
pub use error::{MatchError, RuleError};
pub use evaluator::{Evaluator, EvaluatorContext, ListEvaluator, Verdict};
pub use loader::{load_rule_set, load_rules, parse_rule_definitions};
pub use outcome::RuleEngineOutput;
pub use pattern::{Captured, Match, MatchSet, Pattern, PatternError};
pub use resolver::resolve_rule_set;
pub use rule::{deep_merge, EvaluatorKind, EvaluatorModel, Rule, RuleDefinition, RuleSetDocument, Severity};
pub use store::{ConfigStore, ConfigType, FileConfigStore, MemoryConfigStore};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_rule_override_blacklists_region() {
        let rules = json!({
            "contentVersion": "1.0.0.0",
            "rules": [
                {
                    "name": "base",
                    "isAbstract": true,
                    "severity": "Error",
                    "category": "Storage",
                    "source": "https://learn.microsoft.com/azure/china",
                    "pattern": {"type": "{t}", "location": "{l}"}
                },
                {
                    "name": "storage-not-in-region",
                    "base": "base",
                    "pattern": {},
                    "evaluator": {"type": "BuiltIn.List", "configKey": "StorageRegions.json"}
                }
            ]
        });
        let config = json!({
            "blacklist": [{
                "values": {"t": "Microsoft.Storage/storageAccounts", "l": "chinaeast"},
                "hitMessage": "{t} is not available in {l}"
            }]
        });
        let store = MemoryConfigStore::new()
            .with_value(store::RULE_SET_LIST_KEY, r#"["storage"]"#)
            .with_value(store::rule_set_key("storage"), rules.to_string())
            .with_value(
                store::evaluator_config_key("storage", "StorageRegions.json"),
                config.to_string(),
            );

        let engine = RuleEngine::from_store(&store).unwrap();
        let outputs = engine
            .analyze(&json!({
                "type": "Microsoft.Storage/storageAccounts",
                "location": "chinaeast",
                "name": "logs"
            }))
            .unwrap();

        assert_eq!(outputs.len(), 1);
        let output = &outputs[0];
        assert!(!output.pass());
        assert_eq!(
            output.message(),
            Some("Microsoft.Storage/storageAccounts is not available in chinaeast")
        );
        assert_eq!(output.severity(), Severity::Error);
        assert_eq!(output.rule_set_id(), "storage");
        assert_eq!(output.brief(), "storage-not-in-region");

        let passing = engine
            .analyze(&json!({
                "type": "Microsoft.Storage/storageAccounts",
                "location": "chinanorth3"
            }))
            .unwrap();
        assert!(passing[0].pass());
    }
}
