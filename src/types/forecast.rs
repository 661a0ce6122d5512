#![allow(dead_code)]
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, YieldError};

pub const MAX_AR_ORDER: usize = 5;
pub const MAX_DIFF_ORDER: usize = 2;
pub const MAX_MA_ORDER: usize = 5;

/// ARIMA(p, d, q) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self { p: 1, d: 1, q: 1 }
    }
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Shortest history the order can be fitted on
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.p > MAX_AR_ORDER {
            return Err(YieldError::ModelFitting(format!(
                "AR order must be <= {}, got {}",
                MAX_AR_ORDER, self.p
            )));
        }
        if self.d > MAX_DIFF_ORDER {
            return Err(YieldError::ModelFitting(format!(
                "differencing order must be <= {}, got {}",
                MAX_DIFF_ORDER, self.d
            )));
        }
        if self.q > MAX_MA_ORDER {
            return Err(YieldError::ModelFitting(format!(
                "MA order must be <= {}, got {}",
                MAX_MA_ORDER, self.q
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Fitted coefficients of an ARIMA model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArimaParams {
    pub order: ArimaOrder,
    /// AR coefficients (phi_1..phi_p)
    pub ar: Vec<f64>,
    /// MA coefficients (theta_1..theta_q)
    pub ma: Vec<f64>,
    /// Constant term of the ARMA recursion on the differenced series
    pub intercept: f64,
    /// Implied mean of the differenced series, `intercept / (1 - sum(ar))`
    pub drift: f64,
    /// Innovation variance
    pub sigma2: f64,
    /// Conditional Gaussian log-likelihood at the optimum
    pub log_likelihood: f64,
    /// Simplex iterations used by the optimizer
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-based step ahead of the last observation
    pub day: u32,
    /// Forecast value, 2 decimal places
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub points: Vec<ForecastPoint>,
    pub params: ArimaParams,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn values(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_is_one_one_one() {
        let order = ArimaOrder::default();
        assert_eq!(order, ArimaOrder::new(1, 1, 1));
        assert_eq!(order.min_observations(), 4);
        assert_eq!(order.to_string(), "ARIMA(1,1,1)");
    }

    #[test]
    fn test_order_bounds() {
        assert!(ArimaOrder::new(5, 2, 5).validate().is_ok());
        assert!(ArimaOrder::new(6, 1, 1).validate().is_err());
        assert!(ArimaOrder::new(1, 3, 1).validate().is_err());
        assert!(ArimaOrder::new(1, 1, 6).validate().is_err());
    }
}
