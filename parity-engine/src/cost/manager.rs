use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::meter::{CrossEnvironmentMeterId, Meter, UsageRecord};
use super::tiered::TieredRates;
use crate::error::EngineError;
use crate::region::label_matches;

/// Cost of one meter for one resource, in both environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    pub resource_id: String,
    pub source_meter_id: String,
    pub target_meter_id: Option<String>,
    pub meter_name: String,
    pub quantity: Decimal,
    pub source_cost: Decimal,
    /// `None` when the meter has no counterpart in the target environment.
    pub target_cost: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCost {
    pub source_cost: Decimal,
    pub target_cost: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub lines: Vec<CostLine>,
    pub resources: BTreeMap<String, ResourceCost>,
    pub total_source_cost: Decimal,
    /// Sum over mapped meters only.
    pub total_target_cost: Decimal,
    /// Usage whose meter is unknown in the source rate card.
    pub unmatched_usage: Vec<UsageRecord>,
    /// Source meters without a target counterpart.
    pub unmapped_meters: Vec<String>,
}

struct PricedMeter {
    meter: Meter,
    rates: TieredRates,
}

impl PricedMeter {
    fn new(meter: Meter) -> Result<Self, EngineError> {
        let rates = meter.tiered_rates()?;
        Ok(Self { meter, rates })
    }

    fn cost(&self, quantity: Decimal) -> Result<Decimal, EngineError> {
        self.rates.cost(&self.meter.meter_id, quantity)
    }
}

/// Prices source-environment usage in both environments.
pub struct CostEstimationManager {
    source: HashMap<String, PricedMeter>,
    target: HashMap<CrossEnvironmentMeterId, PricedMeter>,
}

impl CostEstimationManager {
    /// Indexes both rate cards. Source meters are keyed by meter id (case
    /// insensitive), target meters by cross-environment id.
    ///
    /// With a `target_region`, target meters published for that region win,
    /// meters without a region act as a fallback and meters of any other
    /// region are ignored. Otherwise the first target meter wins when
    /// several share an id.
    pub fn new(
        source_meters: Vec<Meter>,
        target_meters: Vec<Meter>,
        target_region: Option<&str>,
    ) -> Result<Self, EngineError> {
        let mut source = HashMap::with_capacity(source_meters.len());
        for meter in source_meters {
            source.insert(meter.meter_id.to_lowercase(), PricedMeter::new(meter)?);
        }

        let mut regional = Vec::new();
        let mut fallback = Vec::new();
        let mut skipped = 0usize;
        for meter in target_meters {
            match target_region {
                None => regional.push(meter),
                Some(_) if meter.meter_region.trim().is_empty() => fallback.push(meter),
                Some(region) if label_matches(&meter.meter_region, region) => regional.push(meter),
                Some(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(target_region = ?target_region, skipped, "target meters of other regions ignored");
        }

        let mut target = HashMap::with_capacity(regional.len() + fallback.len());
        for meter in regional.into_iter().chain(fallback) {
            let key = meter.cross_environment_id();
            if target.contains_key(&key) {
                debug!(meter_id = %meter.meter_id, key = %key, "duplicate target meter ignored");
                continue;
            }
            target.insert(key, PricedMeter::new(meter)?);
        }

        Ok(Self { source, target })
    }

    /// Target meter equivalent to the source meter `meter_id`.
    pub fn map_meter(&self, meter_id: &str) -> Option<&Meter> {
        let source = self.source.get(&meter_id.to_lowercase())?;
        self.target
            .get(&source.meter.cross_environment_id())
            .map(|priced| &priced.meter)
    }

    /// Aggregates usage per resource and meter, then prices each line.
    pub fn estimate(&self, usage: &[UsageRecord]) -> Result<CostEstimate, EngineError> {
        let mut estimate = CostEstimate::default();
        let mut quantities: BTreeMap<(String, String), Decimal> = BTreeMap::new();

        for record in usage {
            let meter_key = record.meter_id.to_lowercase();
            if !self.source.contains_key(&meter_key) {
                estimate.unmatched_usage.push(record.clone());
                continue;
            }
            let quantity = quantities
                .entry((record.resource_id.clone(), meter_key))
                .or_insert(Decimal::ZERO);
            *quantity = quantity
                .checked_add(record.quantity)
                .ok_or_else(|| EngineError::Overflow {
                    meter_id: record.meter_id.clone(),
                })?;
        }

        let mut unmapped = BTreeSet::new();
        for ((resource_id, meter_key), quantity) in quantities {
            let Some(source) = self.source.get(&meter_key) else {
                continue;
            };
            let target = self.target.get(&source.meter.cross_environment_id());

            let source_cost = source.cost(quantity)?;
            let target_cost = target.map(|priced| priced.cost(quantity)).transpose()?;
            if target.is_none() {
                unmapped.insert(source.meter.meter_id.clone());
            }

            let meter_id = &source.meter.meter_id;
            let mapped_cost = target_cost.unwrap_or_default();
            let totals = estimate.resources.entry(resource_id.clone()).or_default();
            accumulate(&mut totals.source_cost, source_cost, meter_id)?;
            accumulate(&mut totals.target_cost, mapped_cost, meter_id)?;
            accumulate(&mut estimate.total_source_cost, source_cost, meter_id)?;
            accumulate(&mut estimate.total_target_cost, mapped_cost, meter_id)?;

            estimate.lines.push(CostLine {
                resource_id,
                source_meter_id: source.meter.meter_id.clone(),
                target_meter_id: target.map(|priced| priced.meter.meter_id.clone()),
                meter_name: source.meter.meter_name.clone(),
                quantity,
                source_cost,
                target_cost,
            });
        }

        estimate.unmapped_meters = unmapped.into_iter().collect();
        for meter_id in &estimate.unmapped_meters {
            warn!(meter_id = %meter_id, "no target meter mapped");
        }
        info!(
            lines = estimate.lines.len(),
            unmatched = estimate.unmatched_usage.len(),
            unmapped = estimate.unmapped_meters.len(),
            total_source = %estimate.total_source_cost,
            total_target = %estimate.total_target_cost,
            "cost estimation finished"
        );
        Ok(estimate)
    }
}

fn accumulate(total: &mut Decimal, amount: Decimal, meter_id: &str) -> Result<(), EngineError> {
    *total = total.checked_add(amount).ok_or_else(|| EngineError::Overflow {
        meter_id: meter_id.to_string(),
    })?;
    Ok(())
}
