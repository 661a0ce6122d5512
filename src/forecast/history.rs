use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, YieldError};

/// Synthetic eCPM history drawn uniformly from `[low, high]`.
///
/// Only used for demonstrations and tests. ChaCha8 output is portable across
/// platforms and releases, so the same seed always yields the same series.
pub fn generate_demo_history(seed: u64, len: usize, low: f64, high: f64) -> Result<Vec<f64>> {
    if len == 0 {
        return Err(YieldError::invalid_input("history_len", "must be > 0"));
    }
    if !low.is_finite() || !high.is_finite() || low >= high {
        return Err(YieldError::invalid_input(
            "history_range",
            format!("expected finite low < high, got [{}, {}]", low, high),
        ));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Ok((0..len).map(|_| rng.gen_range(low..=high)).collect())
}
