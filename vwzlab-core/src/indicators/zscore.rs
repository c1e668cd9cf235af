//! Moving Z-score of close.
//!
//! z[t] = (close[t] - mean) / stddev over the trailing `period` closes,
//! population stddev. Undefined when the window is incomplete or flat.

use super::{closes, is_flat, window_mean_std, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct ZScore {
    period: usize,
    name: String,
}

impl ZScore {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("zscore_{period}"),
        }
    }
}

impl Indicator for ZScore {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        (0..closes.len())
            .map(|i| match window_mean_std(&closes, i, self.period) {
                Some((mean, std)) if !is_flat(std, mean, self.period) => (closes[i] - mean) / std,
                _ => f64::NAN,
            })
            .collect()
    }
}
