//! ARIMA(p, d, q) estimation and forecasting.
//!
//! The series is differenced `d` times and an ARMA(p, q) with an intercept is
//! fitted to the result by conditional-sum-of-squares maximum likelihood:
//!
//! ```text
//! w[t] = c + sum_i phi_i w[t-i] + e[t] + sum_j theta_j e[t-j]
//! ```
//!
//! The drift reported with the fit is the implied mean `c / (1 - sum phi)`.
//! Optimizing over `c` rather than the mean keeps the objective well
//! conditioned when the AR polynomial approaches a unit root.
//!
//! The likelihood is conditioned on the first `p` differenced observations
//! with pre-sample shocks set to zero. AR coefficients are kept stationary and
//! MA coefficients invertible by optimizing over unconstrained values mapped
//! through partial autocorrelations (`r = x / sqrt(1 + x^2)`) and the
//! Durbin-Levinson recursion. Partial autocorrelations are capped at
//! `PACF_LIMIT`, so the objective is flat past the boundary and the simplex
//! settles there instead of chasing it.

use ndarray::Array1;
use std::f64::consts::PI;
use tracing::debug;

use super::optimizer::NelderMead;
use crate::error::{Result, YieldError};
use crate::types::{ArimaOrder, ArimaParams};

/// Partial autocorrelations used as starting values are kept inside this bound
const START_PACF_LIMIT: f64 = 0.9;
/// Hard bound on every partial autocorrelation during the search
const PACF_LIMIT: f64 = 1.0 - 1e-8;

#[derive(Debug, Clone)]
pub struct FitOptions {
    pub max_iter: usize,
    pub tolerance: f64,
    pub include_drift: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-10,
            include_drift: true,
        }
    }
}

/// A fitted ARIMA model, ready to forecast
#[derive(Debug, Clone)]
pub struct ArimaModel {
    params: ArimaParams,
    /// Series after `d` differences
    differenced: Vec<f64>,
    /// In-sample shocks of the differenced series
    residuals: Vec<f64>,
    /// Last value of the series at each differencing level 0..d
    tails: Vec<f64>,
}

impl ArimaModel {
    pub fn fit(history: &[f64], order: ArimaOrder, options: &FitOptions) -> Result<Self> {
        order.validate()?;

        let required = order.min_observations();
        if history.len() < required {
            return Err(YieldError::ModelFitting(format!(
                "{} needs at least {} observations, got {}",
                order,
                required,
                history.len()
            )));
        }
        if history.iter().any(|v| !v.is_finite()) {
            return Err(YieldError::ModelFitting(
                "history contains NaN or infinite values".to_string(),
            ));
        }

        let (differenced, tails) = difference(history, order.d);
        let objective = CssObjective {
            w: &differenced,
            p: order.p,
            q: order.q,
            include_drift: options.include_drift,
        };

        let x0 = objective.start_values();
        let optimizer = NelderMead::new(options.max_iter, options.tolerance);
        let minimum = optimizer.minimize(|x| objective.sigma2(x), &x0);

        if !minimum.converged {
            debug!("{} fit gave up at sigma2={:.6}", order, minimum.value);
            return Err(YieldError::NonConvergence {
                iterations: minimum.iterations,
            });
        }

        let (ar, ma, intercept) = objective.unpack(&minimum.x);
        let (sse, residuals) = css(&differenced, &ar, &ma, intercept);
        let drift = intercept / (1.0 - ar.iter().sum::<f64>());
        let m = (differenced.len() - order.p) as f64;
        let sigma2 = sse / m;
        let log_likelihood = -0.5 * m * ((2.0 * PI * sigma2).ln() + 1.0);

        debug!(
            "Fitted {}: ar={:?} ma={:?} drift={:.4} sigma2={:.4} iterations={}",
            order, ar, ma, drift, sigma2, minimum.iterations
        );

        Ok(Self {
            params: ArimaParams {
                order,
                ar,
                ma,
                intercept,
                drift,
                sigma2,
                log_likelihood,
                iterations: minimum.iterations,
            },
            differenced,
            residuals,
            tails,
        })
    }

    pub fn params(&self) -> &ArimaParams {
        &self.params
    }

    /// Forecast `steps` values past the end of the history on the original scale
    pub fn predict(&self, steps: usize) -> Vec<f64> {
        let ArimaParams { ar, ma, intercept, .. } = &self.params;

        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();
        let n = w.len();

        for _ in 0..steps {
            let t = w.len();
            let mut next = *intercept;
            for (i, phi) in ar.iter().enumerate() {
                next += phi * w[t - i - 1];
            }
            for (j, theta) in ma.iter().enumerate() {
                if t > j {
                    next += theta * e[t - j - 1];
                }
            }
            w.push(next);
            e.push(0.0);
        }

        integrate(&w[n..], &self.tails)
    }
}

struct CssObjective<'a> {
    w: &'a [f64],
    p: usize,
    q: usize,
    include_drift: bool,
}

impl CssObjective<'_> {
    fn start_values(&self) -> Array1<f64> {
        let mean = mean(self.w);
        let pacf = sample_pacf(self.w, self.p);

        let x_ar: Vec<f64> = pacf
            .iter()
            .map(|r| unconstrain_pacf(r.clamp(-START_PACF_LIMIT, START_PACF_LIMIT)))
            .collect();
        let phi_sum: f64 = constrain_stationary(&x_ar).iter().sum();

        let mut x = Vec::with_capacity(self.p + self.q + 1);
        x.extend(x_ar);
        x.extend(std::iter::repeat(0.0).take(self.q));
        if self.include_drift {
            x.push(mean * (1.0 - phi_sum));
        }
        Array1::from(x)
    }

    fn unpack(&self, x: &Array1<f64>) -> (Vec<f64>, Vec<f64>, f64) {
        let x_ar: Vec<f64> = x.iter().take(self.p).copied().collect();
        let x_ma: Vec<f64> = x.iter().skip(self.p).take(self.q).map(|v| -v).collect();

        let ar = constrain_stationary(&x_ar);
        let ma: Vec<f64> = constrain_stationary(&x_ma).into_iter().map(|v| -v).collect();
        let intercept = if self.include_drift {
            x.get(self.p + self.q).copied().unwrap_or(0.0)
        } else {
            0.0
        };
        (ar, ma, intercept)
    }

    fn sigma2(&self, x: &Array1<f64>) -> f64 {
        let (ar, ma, intercept) = self.unpack(x);
        let (sse, _) = css(self.w, &ar, &ma, intercept);
        sse / (self.w.len() - self.p) as f64
    }
}

/// Conditional sum of squared shocks and the shocks themselves
fn css(w: &[f64], ar: &[f64], ma: &[f64], intercept: f64) -> (f64, Vec<f64>) {
    let p = ar.len();
    let mut e = vec![0.0; w.len()];
    let mut sse = 0.0;

    for t in p..w.len() {
        let mut predicted = intercept;
        for (i, phi) in ar.iter().enumerate() {
            predicted += phi * w[t - i - 1];
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                predicted += theta * e[t - j - 1];
            }
        }
        e[t] = w[t] - predicted;
        sse += e[t] * e[t];
    }

    (sse, e)
}

/// Map unconstrained values to coefficients of a stationary AR polynomial
fn constrain_stationary(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut prev: Vec<f64> = Vec::with_capacity(n);
    for (k, &xk) in x.iter().enumerate() {
        let r = (xk / (1.0 + xk * xk).sqrt()).clamp(-PACF_LIMIT, PACF_LIMIT);
        let mut next = vec![0.0; k + 1];
        for i in 0..k {
            next[i] = prev[i] - r * prev[k - i - 1];
        }
        next[k] = r;
        prev = next;
    }
    prev
}

fn unconstrain_pacf(r: f64) -> f64 {
    r / (1.0 - r * r).sqrt()
}

/// Sample partial autocorrelations at lags 1..=p via Levinson-Durbin
fn sample_pacf(w: &[f64], p: usize) -> Vec<f64> {
    if p == 0 {
        return Vec::new();
    }

    let n = w.len();
    let mean = mean(w);
    let centered: Vec<f64> = w.iter().map(|v| v - mean).collect();

    let mut acov = vec![0.0; p + 1];
    for (k, slot) in acov.iter_mut().enumerate() {
        *slot = (k..n).map(|t| centered[t] * centered[t - k]).sum::<f64>() / n as f64;
    }
    if acov[0].abs() < 1e-12 {
        return vec![0.0; p];
    }

    let mut pacf = Vec::with_capacity(p);
    let mut phi: Vec<f64> = Vec::new();
    let mut variance = acov[0];
    for k in 1..=p {
        let mut num = acov[k];
        for (j, coeff) in phi.iter().enumerate() {
            num -= coeff * acov[k - j - 1];
        }
        let r = if variance.abs() > 1e-12 { num / variance } else { 0.0 };

        let mut next = vec![0.0; k];
        for j in 0..k - 1 {
            next[j] = phi[j] - r * phi[k - j - 2];
        }
        next[k - 1] = r;
        phi = next;
        variance *= 1.0 - r * r;
        pacf.push(r);
    }
    pacf
}

/// Difference `d` times, remembering the last value at each level
fn difference(series: &[f64], d: usize) -> (Vec<f64>, Vec<f64>) {
    let mut current = series.to_vec();
    let mut tails = Vec::with_capacity(d);
    for _ in 0..d {
        tails.push(current[current.len() - 1]);
        current = current.windows(2).map(|pair| pair[1] - pair[0]).collect();
    }
    (current, tails)
}

/// Undo `difference` for values that continue past the end of the series
fn integrate(forecasts: &[f64], tails: &[f64]) -> Vec<f64> {
    let mut values = forecasts.to_vec();
    for &last in tails.iter().rev() {
        let mut level = last;
        for v in values.iter_mut() {
            level += *v;
            *v = level;
        }
    }
    values
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
