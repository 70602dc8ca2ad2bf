use serde::Serialize;

use crate::rule::{Rule, Severity};

/// Result of evaluating one match of one rule against a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEngineOutput {
    pass: bool,
    rule_name: String,
    rule_set_id: String,
    severity: Severity,
    category: String,
    source: String,
    brief: String,
    message: Option<String>,
    /// JSON path of the most specific captured value, empty when nothing was captured.
    path: String,
}

impl RuleEngineOutput {
    pub fn new(rule: &Rule, pass: bool, message: Option<String>, path: impl Into<String>) -> Self {
        Self {
            pass,
            rule_name: rule.name.clone(),
            rule_set_id: rule.rule_set_id.clone(),
            severity: rule.severity,
            category: rule.category.clone(),
            source: rule.source.clone(),
            brief: rule.brief().to_string(),
            message,
            path: path.into(),
        }
    }

    pub fn pass(&self) -> bool {
        self.pass
    }

    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    pub fn rule_set_id(&self) -> &str {
        &self.rule_set_id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn brief(&self) -> &str {
        &self.brief
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
