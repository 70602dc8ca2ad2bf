use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::EngineError;

/// One pricing tier: usage above `threshold` is billed at `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceTier {
    pub threshold: Decimal,
    pub rate: Decimal,
}

impl PriceTier {
    pub fn new(threshold: Decimal, rate: Decimal) -> Self {
        Self { threshold, rate }
    }
}

/// Validated tiers sorted ascending by threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TieredRates {
    tiers: Vec<PriceTier>,
}

impl TieredRates {
    /// Sorts the tiers; negative or duplicate thresholds are rejected.
    pub fn new(meter_id: &str, mut tiers: Vec<PriceTier>) -> Result<Self, EngineError> {
        tiers.sort_by(|a, b| a.threshold.cmp(&b.threshold));

        let invalid = |message: String| EngineError::InvalidTier {
            meter_id: meter_id.to_string(),
            message,
        };
        if let Some(tier) = tiers.iter().find(|tier| tier.threshold.is_sign_negative()) {
            return Err(invalid(format!("negative threshold {}", tier.threshold)));
        }
        if let Some(pair) = tiers.windows(2).find(|pair| pair[0].threshold == pair[1].threshold) {
            return Err(invalid(format!("duplicate threshold {}", pair[0].threshold)));
        }

        Ok(Self { tiers })
    }

    /// Parses rate-card style tiers: threshold text to rate.
    pub fn from_rate_card<'a>(
        meter_id: &str,
        rates: impl IntoIterator<Item = (&'a String, &'a Decimal)>,
    ) -> Result<Self, EngineError> {
        let mut tiers = Vec::new();
        for (threshold, rate) in rates {
            let threshold = Decimal::from_str(threshold.trim()).map_err(|err| {
                EngineError::InvalidTier {
                    meter_id: meter_id.to_string(),
                    message: format!("threshold '{}': {}", threshold, err),
                }
            })?;
            tiers.push(PriceTier::new(threshold, *rate));
        }
        Self::new(meter_id, tiers)
    }

    pub fn tiers(&self) -> &[PriceTier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Cost of `quantity` units.
    ///
    /// Tiers are walked from the highest threshold down; the part of the
    /// remaining quantity above each threshold is billed at that tier's rate.
    /// Quantity below the lowest threshold is not billed.
    pub fn cost(&self, meter_id: &str, quantity: Decimal) -> Result<Decimal, EngineError> {
        let overflow = || EngineError::Overflow {
            meter_id: meter_id.to_string(),
        };

        let mut remaining = quantity;
        let mut total = Decimal::ZERO;
        for tier in self.tiers.iter().rev() {
            if remaining <= tier.threshold {
                continue;
            }
            let billed = (remaining - tier.threshold)
                .checked_mul(tier.rate)
                .ok_or_else(overflow)?;
            total = total.checked_add(billed).ok_or_else(overflow)?;
            remaining = tier.threshold;
        }
        Ok(total)
    }
}
