use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use crate::error::{Result, YieldError};
use crate::types::{CounterInput, DerivedMetrics};

const RATE_DP: u32 = 4;
const MONEY_DP: u32 = 2;

/// Derives campaign performance ratios from raw counters
pub struct MetricCalculator;

impl MetricCalculator {
    /// CTR, CVR, eCPM and CPA for one set of counters.
    ///
    /// `clicks == 0` yields `cvr = 0` and `conversions == 0` yields `cpa = 0`.
    /// `impressions == 0` has no such fallback and fails with
    /// [`YieldError::DivisionUndefined`].
    pub fn compute(input: &CounterInput) -> Result<DerivedMetrics> {
        if input.cost.is_sign_negative() && !input.cost.is_zero() {
            return Err(YieldError::invalid_input(
                "cost",
                format!("must be >= 0, got {}", input.cost),
            ));
        }
        if input.impressions == 0 {
            return Err(YieldError::DivisionUndefined {
                denominator: "impressions",
            });
        }

        let impressions = Decimal::from(input.impressions);
        let clicks = Decimal::from(input.clicks);
        let conversions = Decimal::from(input.conversions);

        let ctr = round(ratio(clicks, impressions, "clicks")?, RATE_DP);

        let cvr = if input.clicks > 0 {
            round(ratio(conversions, clicks, "conversions")?, RATE_DP)
        } else {
            Decimal::ZERO
        };

        let ecpm = ratio(input.cost, impressions, "cost")?
            .checked_mul(dec!(1000))
            .ok_or_else(|| out_of_range("cost"))?;
        let ecpm = round(ecpm, MONEY_DP);

        let cpa = if input.conversions > 0 {
            round(ratio(input.cost, conversions, "cost")?, MONEY_DP)
        } else {
            Decimal::ZERO
        };

        debug!(
            "Metrics for {} impressions: ctr={} cvr={} ecpm={} cpa={}",
            input.impressions, ctr, cvr, ecpm, cpa
        );

        Ok(DerivedMetrics { ctr, cvr, ecpm, cpa })
    }
}

pub fn compute_metrics(input: &CounterInput) -> Result<DerivedMetrics> {
    MetricCalculator::compute(input)
}

// Decimal operators panic on overflow
fn ratio(numerator: Decimal, denominator: Decimal, field: &str) -> Result<Decimal> {
    numerator
        .checked_div(denominator)
        .ok_or_else(|| out_of_range(field))
}

fn out_of_range(field: &str) -> YieldError {
    YieldError::invalid_input(field, "value too large for decimal arithmetic")
}

// Banker's rounding, matching how the ratios have always been reported
fn round(value: Decimal, dp: u32) -> Decimal {
    value
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
        .normalize()
}
