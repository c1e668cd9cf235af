//! Volume-weighted Z-scores.
//!
//! Rolling: volume-weighted mean and variance of close over `period`.
//! Undefined when the window has no volume or its weighted stddev falls
//! below `min_std_dev`.
//!
//! Adaptive: one pass of exponentially weighted, volume-weighted moments whose
//! smoothing constant is re-derived on every bar from the trend-strength
//! reading (ADX). Strength is clamped to [min_strength, max_strength] and
//! mapped linearly onto a period between base/2 (strong trend) and base*2
//! (weak trend). While the strength reading is undefined the moments keep
//! updating with a fixed decay and the output stays undefined.

use super::adx::directional_movement;
use super::{is_flat, Indicator};
use crate::domain::Bar;

/// Decay applied while trend strength is undefined.
pub const FALLBACK_ALPHA: f64 = 0.1;

/// Added to the ADX period to get the adaptive base period.
const BASE_PERIOD_OFFSET: usize = 4;

/// Adaptive variance at or below this many ulps of mean² is cancellation noise.
const ADAPTIVE_NOISE_ULPS: f64 = 1024.0;

#[derive(Debug, Clone)]
pub struct VolumeWeightedZScore {
    period: usize,
    min_std_dev: f64,
    name: String,
}

impl VolumeWeightedZScore {
    pub fn new(period: usize, min_std_dev: f64) -> Self {
        Self {
            period,
            min_std_dev,
            name: format!("vwz_{period}"),
        }
    }
}

impl Indicator for VolumeWeightedZScore {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if self.period == 0 || n < self.period {
            return result;
        }

        for i in self.period - 1..n {
            let window = &bars[i + 1 - self.period..=i];
            let total_volume: f64 = window.iter().map(|b| b.volume).sum();
            if total_volume.is_nan() || total_volume <= 0.0 {
                continue;
            }
            let mean = window.iter().map(|b| b.close * b.volume).sum::<f64>() / total_volume;
            let variance = window
                .iter()
                .map(|b| b.volume * (b.close - mean).powi(2))
                .sum::<f64>()
                / total_volume;
            let std = variance.max(0.0).sqrt();
            if is_flat(std, mean, self.period) || std < self.min_std_dev {
                continue;
            }
            result[i] = (bars[i].close - mean) / std;
        }
        result
    }
}

/// Parameters of the adaptive smoothing schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveSmoothing {
    pub base_period: usize,
    pub min_strength: f64,
    pub max_strength: f64,
}

impl AdaptiveSmoothing {
    /// Schedule derived from the ADX period the strength series uses.
    pub fn for_adx_period(adx_period: usize, min_strength: f64, max_strength: f64) -> Self {
        Self {
            base_period: adx_period + BASE_PERIOD_OFFSET,
            min_strength,
            max_strength,
        }
    }

    /// Smoothing constant for one strength reading.
    pub fn alpha(&self, strength: f64) -> f64 {
        if strength.is_nan() {
            return FALLBACK_ALPHA;
        }
        let min_period = (self.base_period / 2).max(1) as f64;
        let max_period = (self.base_period * 2).max(1) as f64;
        let span = self.max_strength - self.min_strength;
        let ratio = if span > 0.0 {
            (strength.clamp(self.min_strength, self.max_strength) - self.min_strength) / span
        } else {
            0.0
        };
        let period = max_period - ratio * (max_period - min_period);
        2.0 / (period + 1.0)
    }
}

/// Adaptive volume-weighted Z-score driven by `strength` (usually ADX).
///
/// Index 0 seeds the moments and is undefined, as is every index whose
/// strength reading is undefined or whose variance is within rounding noise
/// of zero.
pub fn adaptive_vwz(bars: &[Bar], strength: &[f64], schedule: &AdaptiveSmoothing) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    let Some(first) = bars.first() else {
        return result;
    };

    // exponentially weighted sums of v, v*c and v*c^2
    let mut w = first.volume;
    let mut wx = first.volume * first.close;
    let mut wxx = first.volume * first.close * first.close;

    for i in 1..n {
        let bar = &bars[i];
        let s = strength.get(i).copied().unwrap_or(f64::NAN);
        let alpha = schedule.alpha(s);
        w = (1.0 - alpha) * w + alpha * bar.volume;
        wx = (1.0 - alpha) * wx + alpha * bar.volume * bar.close;
        wxx = (1.0 - alpha) * wxx + alpha * bar.volume * bar.close * bar.close;

        if s.is_nan() || w.is_nan() || w <= 0.0 {
            continue;
        }
        let mean = wx / w;
        let variance = wxx / w - mean * mean;
        if variance > ADAPTIVE_NOISE_ULPS * f64::EPSILON * mean * mean {
            result[i] = (bar.close - mean) / variance.sqrt();
        }
    }
    result
}

/// Adaptive VWZ with its own ADX strength series.
#[derive(Debug, Clone)]
pub struct AdaptiveVwz {
    adx_period: usize,
    schedule: AdaptiveSmoothing,
    name: String,
}

impl AdaptiveVwz {
    pub fn new(adx_period: usize, min_strength: f64, max_strength: f64) -> Self {
        Self {
            adx_period,
            schedule: AdaptiveSmoothing::for_adx_period(adx_period, min_strength, max_strength),
            name: format!("adaptive_vwz_{adx_period}"),
        }
    }
}

impl Indicator for AdaptiveVwz {
    fn name(&self) -> &str {
        &self.name
    }

    /// Defined once ADX is.
    fn lookback(&self) -> usize {
        (2 * self.adx_period).saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let strength = directional_movement(bars, self.adx_period).adx;
        adaptive_vwz(bars, &strength, &self.schedule)
    }
}
