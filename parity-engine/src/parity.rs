//! Service parity assessment across a subscription's resources.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parity_rules::{ConfigStore, RuleEngine, RuleEngineOutput, Severity};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::region::display_name;
use crate::resource::ResourceModel;

/// Replacement key holding the target region identifier.
pub const TARGET_REGION: &str = "TargetRegion";
/// Replacement key holding the target region display name.
pub const TARGET_REGION_NAME: &str = "TargetRegionName";

/// Severity exposed in parity reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ServiceParitySeverity {
    #[default]
    Unknown,
    Information,
    Warning,
    Error,
    Critical,
}

impl From<Severity> for ServiceParitySeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Information => ServiceParitySeverity::Information,
            Severity::Warning => ServiceParitySeverity::Warning,
            Severity::Error => ServiceParitySeverity::Error,
            Severity::Critical => ServiceParitySeverity::Critical,
            Severity::Unknown => ServiceParitySeverity::Unknown,
        }
    }
}

/// One rule evaluation, as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceParityRuleResult {
    pub pass: bool,
    pub rule_name: String,
    pub rule_set_id: String,
    pub severity: ServiceParitySeverity,
    pub category: String,
    pub source: String,
    pub brief: String,
    pub message: Option<String>,
    pub path: String,
}

impl From<&RuleEngineOutput> for ServiceParityRuleResult {
    fn from(output: &RuleEngineOutput) -> Self {
        Self {
            pass: output.pass(),
            rule_name: output.rule_name().to_string(),
            rule_set_id: output.rule_set_id().to_string(),
            severity: output.severity().into(),
            category: output.category().to_string(),
            source: output.source().to_string(),
            brief: output.brief().to_string(),
            message: output.message().map(str::to_string),
            path: output.path().to_string(),
        }
    }
}

/// Outcome for one resource: rule results, or the error that stopped its analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ServiceParityResourceResult {
    Details { details: Vec<ServiceParityRuleResult> },
    Failed { error: String },
}

impl ServiceParityResourceResult {
    /// A failed analysis never passes.
    pub fn pass(&self) -> bool {
        match self {
            ServiceParityResourceResult::Details { details } => details.iter().all(|d| d.pass),
            ServiceParityResourceResult::Failed { .. } => false,
        }
    }

    pub fn details(&self) -> &[ServiceParityRuleResult] {
        match self {
            ServiceParityResourceResult::Details { details } => details,
            ServiceParityResourceResult::Failed { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ServiceParityResourceResult::Failed { error } => Some(error),
            ServiceParityResourceResult::Details { .. } => None,
        }
    }
}

/// Counts over a whole assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParitySummary {
    pub resources: usize,
    pub passed_resources: usize,
    pub failed_resources: usize,
    pub errored_resources: usize,
    pub evaluations: usize,
    pub failed_evaluations: usize,
    /// Failing evaluations per severity.
    pub failures_by_severity: BTreeMap<ServiceParitySeverity, usize>,
}

impl ParitySummary {
    fn record(&mut self, result: &ServiceParityResourceResult) {
        self.resources += 1;
        match result {
            ServiceParityResourceResult::Failed { .. } => self.errored_resources += 1,
            ServiceParityResourceResult::Details { details } => {
                if result.pass() {
                    self.passed_resources += 1;
                } else {
                    self.failed_resources += 1;
                }
                self.evaluations += details.len();
                for detail in details.iter().filter(|d| !d.pass) {
                    self.failed_evaluations += 1;
                    *self.failures_by_severity.entry(detail.severity).or_default() += 1;
                }
            }
        }
    }
}

/// Parity assessment of a set of resources against one target region.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceParityResult {
    pub id: Uuid,
    pub target_region: String,
    pub target_region_name: String,
    pub generated_at: DateTime<Utc>,
    pub pass: bool,
    pub summary: ParitySummary,
    pub resources: BTreeMap<String, ServiceParityResourceResult>,
}

impl ServiceParityResult {
    fn new(target_region: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_region: target_region.to_string(),
            target_region_name: display_name(target_region),
            generated_at: Utc::now(),
            pass: true,
            summary: ParitySummary::default(),
            resources: BTreeMap::new(),
        }
    }

    fn insert(&mut self, resource_id: &str, result: ServiceParityResourceResult) {
        if self.resources.contains_key(resource_id) {
            warn!(resource_id, "duplicate resource id, keeping the latest result");
            self.recount_without(resource_id);
        }
        self.pass &= result.pass();
        self.summary.record(&result);
        self.resources.insert(resource_id.to_string(), result);
    }

    fn recount_without(&mut self, resource_id: &str) {
        self.resources.remove(resource_id);
        self.summary = ParitySummary::default();
        for result in self.resources.values() {
            self.summary.record(result);
        }
        self.pass = self.resources.values().all(ServiceParityResourceResult::pass);
    }

    /// Subscription-level verdict: every resource passed.
    pub fn pass(&self) -> bool {
        self.pass
    }

    pub fn resource(&self, resource_id: &str) -> Option<&ServiceParityResourceResult> {
        self.resources.get(resource_id)
    }
}

/// Applies the rule engine to every resource of a subscription.
#[derive(Debug, Clone)]
pub struct ServiceParityRuleEngine {
    engine: RuleEngine,
}

impl ServiceParityRuleEngine {
    pub fn new(engine: RuleEngine) -> Self {
        Self { engine }
    }

    /// Loads every configured rule set; configuration errors abort here.
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, EngineError> {
        Ok(Self::new(RuleEngine::from_store(store)?))
    }

    pub fn rule_engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Assesses `resources` for `target_region`.
    ///
    /// A resource whose analysis fails is recorded as failed and does not
    /// stop the others. Resources without details are skipped.
    pub fn process(&self, resources: &[ResourceModel], target_region: &str) -> ServiceParityResult {
        let replacements = replacements(target_region);
        let mut result = ServiceParityResult::new(target_region);

        for resource in resources {
            let Some(outcome) = self.analyze_resource(resource, target_region, &replacements) else {
                debug!(resource_id = %resource.id, "resource has no details, skipping");
                continue;
            };
            result.insert(&resource.id, outcome);
        }

        info!(
            assessment = %result.id,
            target_region,
            resources = result.summary.resources,
            failed = result.summary.failed_resources,
            errored = result.summary.errored_resources,
            pass = result.pass,
            "service parity assessment finished"
        );
        result
    }

    /// Evaluates one resource with its location moved to `target_region`.
    pub fn analyze_resource(
        &self,
        resource: &ResourceModel,
        target_region: &str,
        replacements: &BTreeMap<String, String>,
    ) -> Option<ServiceParityResourceResult> {
        let details = resource.details_in_region(target_region)?;

        let outcome = match self.engine.analyze_with(&details, replacements) {
            Ok(outputs) => {
                debug!(resource_id = %resource.id, evaluations = outputs.len(), "resource analyzed");
                ServiceParityResourceResult::Details {
                    details: outputs.iter().map(ServiceParityRuleResult::from).collect(),
                }
            }
            Err(source) => {
                let err = EngineError::Analysis {
                    resource_id: resource.id.clone(),
                    source,
                };
                warn!(resource_id = %resource.id, error = %err, "resource analysis failed");
                ServiceParityResourceResult::Failed {
                    error: err.to_string(),
                }
            }
        };
        Some(outcome)
    }
}

/// Message replacements describing the target region.
pub fn replacements(target_region: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (TARGET_REGION.to_string(), target_region.to_string()),
        (TARGET_REGION_NAME.to_string(), display_name(target_region)),
    ])
}
