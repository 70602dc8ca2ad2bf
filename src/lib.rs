//! cloudparity: migration readiness assessment for Azure subscriptions.
//!
//! The workspace is split into:
//!
//! * `parity-core`: shared error type, tracing setup, environment configuration
//! * `parity-rules`: JSON pattern matching, rule-set resolution, evaluators, rule engine
//! * `parity-engine`: parity aggregation over resources, region catalog, cost estimation
//! * `parity-cli`: the `cloudparity` binary
//!
//! [`Assessment`] ties them together: rules are loaded once and then applied
//! to any number of subscriptions and target regions.

use std::path::Path;

use serde::Serialize;
use tracing::info;

pub use parity_core::{CoreConfig, ParityError};
pub use parity_engine::{
    CostEstimate, CostEstimationManager, Meter, ResourceModel, ServiceParityResult,
    ServiceParityRuleEngine, UsageRecord,
};
pub use parity_rules::{ConfigStore, FileConfigStore, MemoryConfigStore, RuleEngine};

pub type Result<T> = std::result::Result<T, ParityError>;

/// Usage and rate cards for a cost estimate.
#[derive(Debug, Clone, Default)]
pub struct CostInputs {
    pub usage: Vec<UsageRecord>,
    pub source_meters: Vec<Meter>,
    pub target_meters: Vec<Meter>,
    /// Region whose target meters are used. [`Assessment::run`] fills in its
    /// own target region when unset.
    pub target_region: Option<String>,
}

/// Combined output of one assessment run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    pub parity: ServiceParityResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostEstimate>,
}

impl AssessmentReport {
    pub fn pass(&self) -> bool {
        self.parity.pass()
    }
}

/// Rules loaded once, reusable across runs.
#[derive(Debug, Clone)]
pub struct Assessment {
    parity: ServiceParityRuleEngine,
}

impl Assessment {
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self> {
        let parity = ServiceParityRuleEngine::from_store(store)?;
        info!(rules = parity.rule_engine().rules().len(), "assessment rules ready");
        Ok(Self { parity })
    }

    /// Loads rules from a config store directory.
    pub fn from_config_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_store(&FileConfigStore::new(dir.as_ref()))
    }

    /// Loads rules from the directory named by `PARITY_CONFIG_DIR`.
    pub fn from_config(config: &CoreConfig) -> Result<Self> {
        Self::from_config_dir(config.require_config_dir()?)
    }

    pub fn rule_engine(&self) -> &RuleEngine {
        self.parity.rule_engine()
    }

    pub fn parity(&self, resources: &[ResourceModel], target_region: &str) -> ServiceParityResult {
        self.parity.process(resources, target_region)
    }

    /// Runs the parity assessment and, when inputs are given, the cost estimate.
    pub fn run(
        &self,
        resources: &[ResourceModel],
        target_region: &str,
        cost: Option<CostInputs>,
    ) -> Result<AssessmentReport> {
        let parity = self.parity(resources, target_region);
        let cost = match cost {
            Some(mut inputs) => {
                inputs
                    .target_region
                    .get_or_insert_with(|| target_region.to_string());
                Some(estimate_cost(inputs)?)
            }
            None => None,
        };
        Ok(AssessmentReport { parity, cost })
    }
}

pub fn estimate_cost(inputs: CostInputs) -> Result<CostEstimate> {
    let manager = CostEstimationManager::new(
        inputs.source_meters,
        inputs.target_meters,
        inputs.target_region.as_deref(),
    )?;
    Ok(manager.estimate(&inputs.usage)?)
}
