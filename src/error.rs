use thiserror::Error;

/// Result type for the yield analytics engine
pub type Result<T> = std::result::Result<T, YieldError>;

/// Errors surfaced by metric derivation and forecasting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum YieldError {
    /// Malformed or out-of-domain input (negative counters, bad bounds)
    #[error("Invalid input '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// A ratio whose denominator is zero and has no defined fallback
    #[error("Division undefined: {denominator} is zero")]
    DivisionUndefined { denominator: &'static str },

    /// History too short or malformed for the requested model
    #[error("Model fitting failed: {0}")]
    ModelFitting(String),

    /// Optimizer ran out of iterations before meeting its tolerance
    #[error("Optimizer did not converge after {iterations} iterations")]
    NonConvergence { iterations: usize },
}

impl YieldError {
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the model
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::DivisionUndefined { .. })
    }
}
