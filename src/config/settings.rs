use serde::{Deserialize, Serialize};

use crate::error::{Result as YieldResult, YieldError};
use crate::forecast::FitOptions;
use crate::types::ArimaOrder;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub forecast: ForecastSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Server validation
        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be empty".to_string());
        }
        if self.server.port == 0 {
            errors.push("server.port must be > 0".to_string());
        }
        if self.server.request_timeout_secs == 0 {
            errors.push("server.request_timeout_secs must be > 0".to_string());
        }

        // Forecast validation
        let f = &self.forecast;
        if let Err(e) = f.order.validate() {
            errors.push(format!("forecast.order: {}", e));
        }
        if f.horizon == 0 {
            errors.push("forecast.horizon must be > 0".to_string());
        }
        if f.max_horizon == 0 || f.max_horizon > u32::MAX as usize {
            errors.push(format!("forecast.max_horizon must be in 1..={}", u32::MAX));
        } else if f.horizon > f.max_horizon {
            errors.push(format!(
                "forecast.horizon must be <= forecast.max_horizon ({})",
                f.max_horizon
            ));
        }
        if f.history_len < f.order.min_observations() {
            errors.push(format!(
                "forecast.history_len must be >= {} for {}",
                f.order.min_observations(),
                f.order
            ));
        }
        if !f.history_low.is_finite() || !f.history_high.is_finite() || f.history_low >= f.history_high {
            errors.push("forecast.history_low must be < forecast.history_high".to_string());
        }
        if f.max_iterations == 0 {
            errors.push("forecast.max_iterations must be > 0".to_string());
        }
        if !(f.tolerance > 0.0 && f.tolerance.is_finite()) {
            errors.push("forecast.tolerance must be a positive number".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single forecast request
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7860,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub order: ArimaOrder,
    pub horizon: usize,
    /// Largest horizon a caller may request
    pub max_horizon: usize,
    /// Seed for the demonstration history
    pub seed: u64,
    pub history_len: usize,
    pub history_low: f64,
    pub history_high: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub include_drift: bool,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            order: ArimaOrder::default(),
            horizon: 7,
            max_horizon: 365,
            seed: 42,
            history_len: 30,
            history_low: 5.0,
            history_high: 25.0,
            max_iterations: 2000,
            tolerance: 1e-10,
            include_drift: true,
        }
    }
}

impl ForecastSettings {
    pub fn check_horizon(&self) -> YieldResult<()> {
        if self.horizon > self.max_horizon {
            return Err(YieldError::invalid_input(
                "horizon",
                format!("must be <= {}, got {}", self.max_horizon, self.horizon),
            ));
        }
        Ok(())
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            max_iter: self.max_iterations,
            tolerance: self.tolerance,
            include_drift: self.include_drift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 7860);
        assert_eq!(config.forecast.order, ArimaOrder::new(1, 1, 1));
        assert_eq!(config.forecast.horizon, 7);
        assert_eq!(config.forecast.history_len, 30);
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.forecast.horizon = 0;
        config.forecast.history_low = 30.0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("server.port")));
        assert!(errors.iter().any(|e| e.contains("forecast.horizon")));
        assert!(errors.iter().any(|e| e.contains("history_low")));
    }

    #[test]
    fn test_history_must_cover_order() {
        let config = AppConfig {
            forecast: ForecastSettings {
                history_len: 3,
                ..ForecastSettings::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_horizon_is_capped() {
        let mut settings = ForecastSettings {
            horizon: 366,
            ..ForecastSettings::default()
        };
        assert!(matches!(
            settings.check_horizon(),
            Err(YieldError::InvalidInput { .. })
        ));

        let config = AppConfig {
            forecast: settings.clone(),
            ..AppConfig::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("max_horizon")));

        settings.horizon = 365;
        assert!(settings.check_horizon().is_ok());
    }

    #[test]
    fn test_fit_options_follow_settings() {
        let settings = ForecastSettings {
            max_iterations: 10,
            include_drift: false,
            ..ForecastSettings::default()
        };
        let options = settings.fit_options();
        assert_eq!(options.max_iter, 10);
        assert!(!options.include_drift);
    }
}
