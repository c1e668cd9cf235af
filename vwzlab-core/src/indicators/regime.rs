//! Band-width regime classifier.
//!
//! Combines three readings over the bar window ending at the evaluated index:
//! the trend of a short EMA of band-width, whether price and the band center
//! are rising (or falling) together, and whether ATR rose over its last three
//! values. A band-width EMA falling over three samples marks a squeeze;
//! otherwise price/center co-trending with an expanding range marks an
//! expansion in that direction, else neutral.

use serde::{Deserialize, Serialize};

use super::atr::Atr;
use super::bollinger::{bands, bandwidth, normalize_trailing};
use super::ema::ema_of_series;
use super::{closes, Indicator};
use crate::domain::Bar;

/// Smoothing period of the band-width trend EMA.
pub const BANDWIDTH_EMA_PERIOD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeStatus {
    /// Fewer than 2 * period bars.
    InsufficientData,
    /// Fewer than three defined ATR samples.
    InsufficientAtr,
    /// Fewer than three defined band-width EMA samples.
    InsufficientBandwidthSeries,
    Neutral,
    Squeeze,
    ExpandingBullish,
    ExpandingBearish,
}

/// Regime classification at one index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeState {
    pub status: RegimeStatus,
    /// Raw band-width at the evaluated index.
    pub bandwidth: f64,
    /// Band-width EMA at the evaluated index.
    pub bandwidth_avg: f64,
    /// Band-width EMA rising over three samples with band-width above it.
    pub bandwidth_trend_up: bool,
}

impl RegimeState {
    pub fn insufficient(status: RegimeStatus) -> Self {
        Self {
            status,
            bandwidth: f64::NAN,
            bandwidth_avg: f64::NAN,
            bandwidth_trend_up: false,
        }
    }
}

impl Default for RegimeState {
    fn default() -> Self {
        Self::insufficient(RegimeStatus::InsufficientData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeParams {
    pub period: usize,
    pub multiplier: f64,
    /// Minimum |normalised band-width| for a non-neutral call; 0 disables.
    pub threshold: f64,
    pub atr_period: usize,
}

/// Last three values of `series`, oldest first, if all are defined.
fn last_three(series: &[f64]) -> Option<[f64; 3]> {
    match series {
        [.., a, b, c] if !(a.is_nan() || b.is_nan() || c.is_nan()) => Some([*a, *b, *c]),
        _ => None,
    }
}

/// Classify the regime at the last bar of `bars`.
pub fn classify_regime(bars: &[Bar], params: &RegimeParams) -> RegimeState {
    if params.period == 0 || bars.len() < 2 * params.period {
        return RegimeState::insufficient(RegimeStatus::InsufficientData);
    }

    let closes = closes(bars);
    let channel = bands(&closes, params.period, params.multiplier);
    let bw = bandwidth(&channel);
    let bw_now = bw.last().copied().unwrap_or(f64::NAN);

    if params.threshold > 0.0 {
        let normalized = normalize_trailing(&bw, params.period);
        let z = normalized.last().copied().unwrap_or(f64::NAN);
        if z.abs() < params.threshold {
            return RegimeState {
                status: RegimeStatus::Neutral,
                bandwidth: bw_now,
                bandwidth_avg: f64::NAN,
                bandwidth_trend_up: false,
            };
        }
    }

    let Some([atr0, atr1, atr2]) = last_three(&Atr::new(params.atr_period).compute(bars)) else {
        return RegimeState::insufficient(RegimeStatus::InsufficientAtr);
    };
    let bw_ema = ema_of_series(&bw, BANDWIDTH_EMA_PERIOD);
    let Some([e0, e1, e2]) = last_three(&bw_ema) else {
        return RegimeState::insufficient(RegimeStatus::InsufficientBandwidthSeries);
    };
    let Some([_, mid_prev, mid]) = last_three(&channel.middle) else {
        return RegimeState::insufficient(RegimeStatus::InsufficientBandwidthSeries);
    };
    let close = closes[closes.len() - 1];

    let atr_up = atr0 < atr1 && atr1 < atr2;
    let bw_up = e0 < e1 && e1 < e2 && bw_now > e2;
    let bw_down = e0 > e1 && e1 > e2 && bw_now < e2;
    let center_up = close > mid && mid > mid_prev;
    let center_down = close < mid && mid < mid_prev;

    // a rising band-width and the co-trend fallback resolve to the same call
    let status = if bw_down {
        RegimeStatus::Squeeze
    } else if center_up && atr_up {
        RegimeStatus::ExpandingBullish
    } else if center_down && atr_up {
        RegimeStatus::ExpandingBearish
    } else {
        RegimeStatus::Neutral
    };

    RegimeState {
        status,
        bandwidth: bw_now,
        bandwidth_avg: e2,
        bandwidth_trend_up: bw_up,
    }
}
