//! Cost estimation: rate cards, cross-environment meter mapping and tiered pricing.

mod manager;
mod meter;
mod tiered;

pub use manager::{CostEstimate, CostEstimationManager, CostLine, ResourceCost};
pub use meter::{CrossEnvironmentMeterId, Meter, UsageRecord};
pub use tiered::{PriceTier, TieredRates};
