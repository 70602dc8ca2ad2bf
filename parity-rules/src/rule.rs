use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::evaluator::Evaluator;
use crate::pattern::Pattern;

/// Severity attached to a parity rule.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Severity {
    #[default]
    #[serde(alias = "unknown")]
    Unknown,
    #[serde(alias = "information", alias = "Info", alias = "info")]
    Information,
    #[serde(alias = "warning")]
    Warning,
    #[serde(alias = "error")]
    Error,
    #[serde(alias = "critical")]
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Unknown => "Unknown",
            Severity::Information => "Information",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Built-in evaluator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvaluatorKind {
    #[serde(rename = "BuiltIn.List")]
    List,
}

impl EvaluatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluatorKind::List => "BuiltIn.List",
        }
    }
}

impl FromStr for EvaluatorKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "BuiltIn.List" => Ok(EvaluatorKind::List),
            other => Err(other.to_string()),
        }
    }
}

/// Evaluator reference declared on a rule: its type and configuration key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorModel {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub config_key: Option<String>,
}

impl EvaluatorModel {
    pub fn parsed_kind(&self) -> Option<Result<EvaluatorKind, String>> {
        self.kind.as_deref().map(EvaluatorKind::from_str)
    }

    /// Both the type and the configuration key are present and the type is known.
    pub fn is_qualified(&self) -> bool {
        matches!(self.parsed_kind(), Some(Ok(_)))
            && self
                .config_key
                .as_deref()
                .map(|key| !key.trim().is_empty())
                .unwrap_or(false)
    }
}

/// Rule as declared in a rule-set document, before inheritance resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    pub name: String,
    /// Namespace of the rule, assigned when the rule set is loaded.
    #[serde(skip)]
    pub rule_set_id: String,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub pattern: Option<Value>,
    #[serde(default, rename = "evaluator")]
    pub evaluator_model: Option<EvaluatorModel>,
    #[serde(default = "RuleDefinition::default_ignore_case")]
    pub ignore_case: bool,
}

impl RuleDefinition {
    pub fn default_ignore_case() -> bool {
        true
    }

    fn severity(&self) -> Severity {
        self.severity.unwrap_or_default()
    }

    /// Fields that keep the rule from being evaluated.
    pub fn missing_fields(&self) -> Vec<String> {
        let blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(|text| text.trim().is_empty())
                .unwrap_or(true)
        };

        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name".to_string());
        }
        if self.severity() == Severity::Unknown {
            missing.push("severity".to_string());
        }
        if blank(&self.category) {
            missing.push("category".to_string());
        }
        if blank(&self.source) {
            missing.push("source".to_string());
        }
        if self.pattern.is_none() {
            missing.push("pattern".to_string());
        }
        if !self
            .evaluator_model
            .as_ref()
            .map(EvaluatorModel::is_qualified)
            .unwrap_or(false)
        {
            missing.push("evaluator".to_string());
        }
        missing
    }

    pub fn is_qualified(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fills every inheritable field the rule leaves unset from `base`.
    ///
    /// Patterns are deep-merged: the rule's own keys win, keys only present in
    /// the base are copied in, recursively.
    pub fn inherit_from(&mut self, base: &RuleDefinition) {
        if self.description.is_none() {
            self.description = base.description.clone();
        }
        if self.severity() == Severity::Unknown {
            self.severity = base.severity;
        }
        if self.category.is_none() {
            self.category = base.category.clone();
        }
        if self.source.is_none() {
            self.source = base.source.clone();
        }
        if self.evaluator_model.is_none() {
            self.evaluator_model = base.evaluator_model.clone();
        }
        self.pattern = match (self.pattern.take(), &base.pattern) {
            (Some(own), Some(inherited)) => Some(deep_merge(own, inherited)),
            (own, inherited) => own.or_else(|| inherited.clone()),
        };
    }
}

/// Merges `base` into `own`; values already present in `own` take precedence.
pub fn deep_merge(own: Value, base: &Value) -> Value {
    match (own, base) {
        (Value::Object(mut own_map), Value::Object(base_map)) => {
            for (key, base_value) in base_map {
                let merged = match own_map.remove(key) {
                    Some(own_value) => deep_merge(own_value, base_value),
                    None => base_value.clone(),
                };
                own_map.insert(key.clone(), merged);
            }
            Value::Object(own_map)
        }
        (own, _) => own,
    }
}

/// Rule-set document stored under `ruleSets/{id}/Rules.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetDocument {
    #[serde(default)]
    pub content_version: String,
    pub rules: Vec<RuleDefinition>,
}

/// A resolved, qualified rule ready for evaluation.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub rule_set_id: String,
    pub brief: Option<String>,
    pub description: Option<String>,
    pub severity: Severity,
    pub category: String,
    pub source: String,
    pub pattern: Pattern,
    pub evaluator: Evaluator,
}

impl Rule {
    /// Short label used in outputs; falls back to the rule name.
    pub fn brief(&self) -> &str {
        self.brief.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parent() -> RuleDefinition {
        RuleDefinition {
            name: "parent".into(),
            is_abstract: true,
            description: Some("storage parity".into()),
            severity: Some(Severity::Error),
            category: Some("Storage".into()),
            source: Some("Azure docs".into()),
            pattern: Some(json!({"type": "{t}", "properties": {"sku": "{sku}", "tier": "Hot"}})),
            ..RuleDefinition::default()
        }
    }

    #[test]
    fn deserializes_rule_set_document() {
        let doc: RuleSetDocument = serde_json::from_value(json!({
            "contentVersion": "1.0.0.0",
            "rules": [{
                "name": "vm-size",
                "base": "vm",
                "severity": "warning",
                "pattern": {"properties": {"hardwareProfile": {"vmSize": "{size}"}}},
                "evaluator": {"type": "BuiltIn.List", "configKey": "VmSize.json"},
                "ignoreCase": false
            }]
        }))
        .unwrap();

        let rule = &doc.rules[0];
        assert_eq!(doc.content_version, "1.0.0.0");
        assert_eq!(rule.base.as_deref(), Some("vm"));
        assert_eq!(rule.severity, Some(Severity::Warning));
        assert!(!rule.ignore_case);
        assert!(rule.evaluator_model.as_ref().unwrap().is_qualified());
    }

    #[test]
    fn ignore_case_defaults_to_true() {
        let rule: RuleDefinition = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert!(rule.ignore_case);
        assert!(!rule.is_abstract);
    }

    #[test]
    fn reports_missing_fields() {
        let rule = RuleDefinition {
            name: "bare".into(),
            category: Some("  ".into()),
            ..RuleDefinition::default()
        };
        assert_eq!(
            rule.missing_fields(),
            vec!["severity", "category", "source", "pattern", "evaluator"]
        );
    }

    #[test]
    fn unknown_evaluator_kind_is_not_qualified() {
        let model = EvaluatorModel {
            kind: Some("Custom.Script".into()),
            config_key: Some("x.json".into()),
        };
        assert!(!model.is_qualified());
        assert_eq!(model.parsed_kind(), Some(Err("Custom.Script".to_string())));
    }

    #[test]
    fn child_inherits_unset_fields() {
        let mut child = RuleDefinition {
            name: "child".into(),
            base: Some("parent".into()),
            category: Some("Compute".into()),
            pattern: Some(json!({"properties": {"sku": "Premium_LRS"}, "kind": "{kind}"})),
            ..RuleDefinition::default()
        };
        child.inherit_from(&parent());

        assert_eq!(child.severity, Some(Severity::Error));
        assert_eq!(child.category.as_deref(), Some("Compute"));
        assert_eq!(child.source.as_deref(), Some("Azure docs"));
        assert_eq!(
            child.pattern,
            Some(json!({
                "type": "{t}",
                "kind": "{kind}",
                "properties": {"sku": "Premium_LRS", "tier": "Hot"}
            }))
        );
        assert!(!child.is_abstract);
    }

    #[test]
    fn child_without_pattern_takes_base_pattern() {
        let mut child = RuleDefinition {
            name: "child".into(),
            ..RuleDefinition::default()
        };
        child.inherit_from(&parent());
        assert_eq!(child.pattern, parent().pattern);
    }

    #[test]
    fn deep_merge_keeps_own_non_object_values() {
        let merged = deep_merge(json!({"zones": ["1"]}), &json!({"zones": {"a": 1}, "b": 2}));
        assert_eq!(merged, json!({"zones": ["1"], "b": 2}));
    }
}
