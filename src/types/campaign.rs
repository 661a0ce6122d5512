#![allow(dead_code)]
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, YieldError};

/// Raw campaign counters as reported by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterInput {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: Decimal,
}

impl CounterInput {
    pub fn new(impressions: u64, clicks: u64, conversions: u64, cost: Decimal) -> Self {
        Self {
            impressions,
            clicks,
            conversions,
            cost,
        }
    }

    /// Build from untrusted signed values, rejecting negative counters
    pub fn from_raw(impressions: i64, clicks: i64, conversions: i64, cost: Decimal) -> Result<Self> {
        Ok(Self {
            impressions: non_negative("impressions", impressions)?,
            clicks: non_negative("clicks", clicks)?,
            conversions: non_negative("conversions", conversions)?,
            cost,
        })
    }
}

fn non_negative(field: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| YieldError::invalid_input(field, format!("must be >= 0, got {}", value)))
}

/// Performance ratios derived from a single set of counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Click-through rate, 4 decimal places
    pub ctr: Decimal,
    /// Conversion rate, 4 decimal places
    pub cvr: Decimal,
    /// Effective cost per thousand impressions, 2 decimal places
    pub ecpm: Decimal,
    /// Cost per acquisition, 2 decimal places
    pub cpa: Decimal,
}

impl DerivedMetrics {
    pub fn as_tuple(&self) -> (Decimal, Decimal, Decimal, Decimal) {
        (self.ctr, self.cvr, self.ecpm, self.cpa)
    }
}
