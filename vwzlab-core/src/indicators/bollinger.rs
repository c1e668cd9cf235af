//! Band channel, band-width and its trailing normalisation.
//!
//! Center: EMA(close, period). Bands: center ± multiplier * population
//! stddev of the trailing `period` closes. Band-width = (upper - lower) /
//! center, undefined when the center is zero.
//!
//! Normalised band-width at t is the z-score of bw[t] against the `window`
//! values strictly before t (sample stddev). Undefined until that window is
//! fully defined, and when it is flat.

use super::ema::ema_of_series;
use super::{closes, window_mean_std, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Bands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bands(closes: &[f64], period: usize, multiplier: f64) -> Bands {
    let n = closes.len();
    let middle = ema_of_series(closes, period);
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    for i in 0..n {
        if middle[i].is_nan() {
            continue;
        }
        if let Some((_, std)) = window_mean_std(closes, i, period) {
            upper[i] = middle[i] + multiplier * std;
            lower[i] = middle[i] - multiplier * std;
        }
    }
    Bands {
        upper,
        middle,
        lower,
    }
}

/// (upper - lower) / middle per index.
pub fn bandwidth(bands: &Bands) -> Vec<f64> {
    bands
        .upper
        .iter()
        .zip(&bands.lower)
        .zip(&bands.middle)
        .map(|((&u, &l), &m)| {
            if m.is_nan() || m == 0.0 {
                f64::NAN
            } else {
                (u - l) / m
            }
        })
        .collect()
}

/// Trailing-window z-score of each value against the `window` values before it.
pub fn normalize_trailing(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 {
        return result;
    }
    for i in window..n {
        let prior = &values[i - window..i];
        if values[i].is_nan() || prior.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = prior.iter().sum::<f64>() / window as f64;
        let variance =
            prior.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        let std = variance.sqrt();
        if std > 0.0 {
            result[i] = (values[i] - mean) / std;
        }
    }
    result
}

/// Band-width as a single series. Lookback: period - 1.
#[derive(Debug, Clone)]
pub struct Bandwidth {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Bandwidth {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self {
            period,
            multiplier,
            name: format!("bbw_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Bandwidth {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bandwidth(&bands(&closes(bars), self.period, self.multiplier))
    }
}

/// Normalised band-width. Lookback: period - 1 + window.
#[derive(Debug, Clone)]
pub struct NormalizedBandwidth {
    inner: Bandwidth,
    window: usize,
    name: String,
}

impl NormalizedBandwidth {
    pub fn new(period: usize, multiplier: f64, window: usize) -> Self {
        Self {
            inner: Bandwidth::new(period, multiplier),
            window,
            name: format!("bbw_z_{period}_{window}"),
        }
    }
}

impl Indicator for NormalizedBandwidth {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.inner.lookback() + self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        normalize_trailing(&self.inner.compute(bars), self.window)
    }
}
