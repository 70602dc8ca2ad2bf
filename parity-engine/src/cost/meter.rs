use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tiered::TieredRates;
use crate::error::EngineError;

/// A billing meter as published in a rate card.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    #[serde(alias = "MeterId")]
    pub meter_id: String,
    #[serde(default, alias = "MeterName")]
    pub meter_name: String,
    #[serde(default, alias = "MeterCategory")]
    pub meter_category: String,
    #[serde(default, alias = "MeterSubCategory")]
    pub meter_sub_category: String,
    #[serde(default, alias = "Unit")]
    pub unit: String,
    #[serde(default, alias = "MeterRegion")]
    pub meter_region: String,
    /// Threshold (as text) to unit rate.
    #[serde(default, alias = "MeterRates")]
    pub meter_rates: BTreeMap<String, Decimal>,
}

impl Meter {
    pub fn cross_environment_id(&self) -> CrossEnvironmentMeterId {
        CrossEnvironmentMeterId::new(
            &self.meter_category,
            &self.meter_sub_category,
            &self.meter_name,
            &self.unit,
        )
    }

    pub fn tiered_rates(&self) -> Result<TieredRates, EngineError> {
        TieredRates::from_rate_card(&self.meter_id, &self.meter_rates)
    }
}

/// Region-agnostic key identifying the same meter in two environments.
///
/// Built from category, subcategory, name and unit; case and whitespace are ignored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CrossEnvironmentMeterId(String);

impl CrossEnvironmentMeterId {
    pub fn new(category: &str, sub_category: &str, name: &str, unit: &str) -> Self {
        let parts: Vec<String> = [category, sub_category, name, unit]
            .iter()
            .map(|part| normalize(part))
            .collect();
        Self(parts.join("|"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CrossEnvironmentMeterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(part: &str) -> String {
    part.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Consumption of one meter by one resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub resource_id: String,
    pub meter_id: String,
    pub quantity: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cross_environment_id_ignores_case_and_whitespace() {
        let global = CrossEnvironmentMeterId::new("Storage", "General Block Blob", "LRS Data Stored", "1 GB/Month");
        let china = CrossEnvironmentMeterId::new("storage", "General  Block Blob", "LRS data stored", "1GB/Month");
        assert_eq!(global, china);
        assert_eq!(global.as_str(), "storage|generalblockblob|lrsdatastored|1gb/month");
    }

    #[test]
    fn deserializes_rate_card_meters() {
        let meter: Meter = serde_json::from_value(json!({
            "MeterId": "a1",
            "MeterName": "Data Stored",
            "MeterCategory": "Storage",
            "MeterSubCategory": "Tables",
            "Unit": "1 GB/Month",
            "MeterRegion": "CN East",
            "MeterRates": {"0": "0.5", "1024": "0.4"}
        }))
        .unwrap();

        assert_eq!(meter.meter_id, "a1");
        let rates = meter.tiered_rates().unwrap();
        assert_eq!(rates.tiers().len(), 2);
        assert_eq!(
            meter.cross_environment_id().as_str(),
            "storage|tables|datastored|1gb/month"
        );
    }
}
