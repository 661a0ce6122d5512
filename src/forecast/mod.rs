pub mod arima;
pub mod history;
pub mod optimizer;

pub use arima::{ArimaModel, FitOptions};
pub use history::generate_demo_history;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

use crate::config::ForecastSettings;
use crate::error::{Result, YieldError};
use crate::types::{ArimaOrder, ForecastPoint, ForecastResult};

const VALUE_DP: u32 = 2;

/// Fits an ARIMA model to a price history and projects it forward
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    options: FitOptions,
}

impl ForecastEngine {
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }

    /// Forecast `horizon` days past the end of `history`
    pub fn forecast(
        &self,
        history: &[f64],
        order: ArimaOrder,
        horizon: usize,
    ) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(YieldError::invalid_input("horizon", "must be > 0"));
        }
        let last_day = u32::try_from(horizon).map_err(|_| {
            YieldError::invalid_input("horizon", format!("must be <= {}, got {}", u32::MAX, horizon))
        })?;

        let model = ArimaModel::fit(history, order, &self.options)?;
        let raw = model.predict(horizon);

        let points = (1..=last_day)
            .zip(raw.iter())
            .map(|(day, &value)| {
                let value = Decimal::from_f64(value).ok_or_else(|| {
                    YieldError::ModelFitting(format!("forecast for day {} is not finite", day))
                })?;
                Ok(ForecastPoint {
                    day,
                    value: value
                        .round_dp_with_strategy(VALUE_DP, RoundingStrategy::MidpointNearestEven)
                        .normalize(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("{} forecast over {} observations: {:?}", order, history.len(), raw);

        Ok(ForecastResult {
            points,
            params: model.params().clone(),
        })
    }
}

/// Forecast using the order, horizon and fitting options from `settings`
pub fn forecast_with(history: &[f64], settings: &ForecastSettings) -> Result<ForecastResult> {
    settings.check_horizon()?;
    ForecastEngine::new(settings.fit_options()).forecast(history, settings.order, settings.horizon)
}

/// Generate the seeded demonstration history and forecast it
pub fn demo_forecast(settings: &ForecastSettings) -> Result<ForecastResult> {
    let history = generate_demo_history(
        settings.seed,
        settings.history_len,
        settings.history_low,
        settings.history_high,
    )?;
    info!(
        "Demo forecast: seed={} points={} range=[{}, {}]",
        settings.seed, settings.history_len, settings.history_low, settings.history_high
    );
    forecast_with(&history, settings)
}
