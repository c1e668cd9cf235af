//! Indicator pipeline.
//!
//! Every indicator is a pure function of the bar series: full series in, one
//! aligned series out, `f64::NAN` marking undefined values (warm-up or a
//! degenerate window). Comparisons against NaN are false, so an undefined
//! reading can never satisfy an entry predicate.
//!
//! Single-series indicators implement [`Indicator`], which also reports the
//! lookback used to derive the engine warm-up. Multi-output families
//! (directional movement, bands, MACD) expose a function returning all their
//! series at once. [`IndicatorSet`] precomputes everything the snapshot
//! builder reads, once, ahead of the replay loop.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod box_filter;
pub mod ema;
pub mod macd;
pub mod regime;
pub mod set;
pub mod vwz;
pub mod zscore;

pub use adx::{directional_movement, Adx, DirectionalSeries};
pub use atr::{true_range, wilder_smooth, Atr};
pub use bollinger::{bands, bandwidth, normalize_trailing, Bands, Bandwidth, NormalizedBandwidth};
pub use box_filter::{is_ranging, BoxRange};
pub use ema::{ema_of_series, Ema};
pub use macd::{macd, MacdHistogram, MacdSeries};
pub use regime::{classify_regime, RegimeParams, RegimeState, RegimeStatus};
pub use set::{compute_warmup, indicator_suite, IndicatorSet};
pub use vwz::{adaptive_vwz, AdaptiveSmoothing, AdaptiveVwz, VolumeWeightedZScore};
pub use zscore::ZScore;

use crate::domain::Bar;

/// A single-series indicator.
///
/// `compute` returns a vector the same length as `bars`. Values before
/// `lookback()` are NaN; later values may also be NaN where the window is
/// degenerate (zero variance, zero volume, zero range).
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g. "zscore_20").
    fn name(&self) -> &str;

    /// Index of the first value that can be defined.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Close prices of a bar series.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Mean and population standard deviation of `values[end + 1 - period ..= end]`.
///
/// `None` if the window is incomplete or contains NaN.
pub(crate) fn window_mean_std(values: &[f64], end: usize, period: usize) -> Option<(f64, f64)> {
    if period == 0 || end + 1 < period || end >= values.len() {
        return None;
    }
    let window = &values[end + 1 - period..=end];
    if window.iter().any(|v| v.is_nan()) {
        return None;
    }
    let n = period as f64;
    let mean = window.iter().sum::<f64>() / n;
    if window.iter().all(|&v| v == window[0]) {
        return Some((mean, 0.0));
    }
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.max(0.0).sqrt()))
}

/// True when `std` is no larger than the rounding error of a mean of
/// `samples` values around `mean`. NaN counts as flat.
pub(crate) fn is_flat(std: f64, mean: f64, samples: usize) -> bool {
    !(std > f64::EPSILON * mean.abs() * samples.max(1) as f64)
}

/// Create synthetic bars from close prices for testing.
///
/// open = previous close (or close for the first bar), high/low = body ± 1.0,
/// volume = 1000, one bar per hour.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close, volume) tuples.
#[cfg(test)]
pub fn make_ohlcv_bars(data: &[(f64, f64, f64, f64, f64)]) -> Vec<Bar> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close, volume))| Bar {
            timestamp: start + chrono::Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
