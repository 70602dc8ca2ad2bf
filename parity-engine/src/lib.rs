//! Service parity assessment and cost estimation over Azure resources.

pub mod cost;
pub mod error;
pub mod parity;
pub mod region;
pub mod resource;

pub use cost::{CostEstimate, CostEstimationManager, CrossEnvironmentMeterId, Meter, TieredRates, UsageRecord};
pub use error::EngineError;
pub use parity::{
    ParitySummary, ServiceParityResourceResult, ServiceParityResult, ServiceParityRuleEngine,
    ServiceParityRuleResult, ServiceParitySeverity,
};
pub use region::{display_name, find_region, label_matches, CloudEnvironment, Region};
pub use resource::ResourceModel;
