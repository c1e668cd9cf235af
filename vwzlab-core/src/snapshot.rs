//! Per-index indicator snapshots.
//!
//! A snapshot is everything a condition may read at index `i`: the last up
//! to three values of every series (oldest first), the regime and volume
//! profile of the trailing window, and the last two raw bars. Series values
//! are copied out of the precomputed [`IndicatorSet`] into fixed-size
//! [`Window3`] views, so building a snapshot never allocates per series.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::config::StrategyConfig;
use crate::domain::Bar;
use crate::indicators::{classify_regime, is_ranging, IndicatorSet, RegimeState};
use crate::patterns::{detect, trend_of, CandlePattern, Trend};
use crate::profile::VolumeProfile;

// ─── Window3 ─────────────────────────────────────────────────────────

/// Up to three consecutive samples of one series ending at some index.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Window3 {
    values: [f64; 3],
    len: usize,
}

impl Window3 {
    /// The samples of `series` at `index - 2 ..= index`, clipped at the start.
    /// Empty if `index` is out of range.
    pub fn at(series: &[f64], index: usize) -> Self {
        if index >= series.len() {
            return Self::default();
        }
        let start = index.saturating_sub(2);
        let tail = &series[start..=index];
        let mut values = [f64::NAN; 3];
        values[..tail.len()].copy_from_slice(tail);
        Self {
            values,
            len: tail.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == 3
    }

    /// Newest sample, NaN when empty.
    pub fn last(&self) -> f64 {
        self.get_back(0)
    }

    /// Second newest sample, NaN when missing.
    pub fn prev(&self) -> f64 {
        self.get_back(1)
    }

    /// Sample by position, oldest first.
    pub fn get(&self, pos: usize) -> Option<f64> {
        self.as_slice().get(pos).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }

    fn get_back(&self, back: usize) -> f64 {
        self.len
            .checked_sub(back + 1)
            .map_or(f64::NAN, |pos| self.values[pos])
    }

    pub fn trend(&self) -> Trend {
        trend_of(self.as_slice())
    }

    /// Largest absolute one-step move, NaN unless full and defined.
    pub fn max_abs_step(&self) -> f64 {
        if !self.is_full() {
            return f64::NAN;
        }
        let [a, b, c] = self.values;
        (b - a).abs().max((c - b).abs())
    }

    /// Largest one-step growth ratio, NaN unless full with non-zero divisors.
    pub fn max_step_ratio(&self) -> f64 {
        if !self.is_full() {
            return f64::NAN;
        }
        let [a, b, c] = self.values;
        if a == 0.0 || b == 0.0 {
            return f64::NAN;
        }
        (b / a).max(c / b)
    }
}

impl Serialize for Window3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────

/// Immutable view of the indicator state at one index.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSnapshot {
    pub index: usize,
    pub timestamp: NaiveDateTime,

    // ── Trend and deviation ──
    pub ema_short: Window3,
    pub ema_long: Window3,
    pub zscore: Window3,
    pub vwz: Window3,
    pub adaptive_vwz: Window3,

    // ── Volatility ──
    pub bandwidth: Window3,
    pub bandwidth_z: Window3,

    // ── Directional strength ──
    pub adx: Window3,
    pub plus_di: Window3,
    pub minus_di: Window3,
    pub dx: Window3,

    // ── MACD ──
    pub macd: Window3,
    pub macd_signal: Window3,
    pub macd_hist: Window3,

    pub box_range: Window3,
    /// Box filter flags the market as ranging.
    pub ranging: bool,

    pub regime: RegimeState,
    pub profile: VolumeProfile,
    pub pattern: Option<CandlePattern>,
    pub previous_bar: Option<Bar>,
    pub bar: Bar,
}

impl IndicatorSnapshot {
    /// A snapshot with no indicator history, only the bar itself.
    pub fn bare(index: usize, bar: Bar) -> Self {
        Self {
            index,
            timestamp: bar.timestamp,
            ema_short: Window3::default(),
            ema_long: Window3::default(),
            zscore: Window3::default(),
            vwz: Window3::default(),
            adaptive_vwz: Window3::default(),
            bandwidth: Window3::default(),
            bandwidth_z: Window3::default(),
            adx: Window3::default(),
            plus_di: Window3::default(),
            minus_di: Window3::default(),
            dx: Window3::default(),
            macd: Window3::default(),
            macd_signal: Window3::default(),
            macd_hist: Window3::default(),
            box_range: Window3::default(),
            ranging: false,
            regime: RegimeState::default(),
            profile: VolumeProfile::default(),
            pattern: None,
            previous_bar: None,
            bar,
        }
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}

// ─── Builder ─────────────────────────────────────────────────────────

/// Builds snapshots from bars and their precomputed series.
pub struct SnapshotBuilder<'a> {
    bars: &'a [Bar],
    set: &'a IndicatorSet,
    config: &'a StrategyConfig,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(bars: &'a [Bar], set: &'a IndicatorSet, config: &'a StrategyConfig) -> Self {
        debug_assert_eq!(bars.len(), set.len(), "indicator set not aligned with bars");
        Self { bars, set, config }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Snapshot at `index`, or `None` past the end of the series.
    ///
    /// Regime and volume profile are recomputed from the trailing windows
    /// ending at `index` on every call.
    pub fn build(&self, index: usize) -> Option<IndicatorSnapshot> {
        let bar = self.bars.get(index)?.clone();
        let set = self.set;
        let ind = &self.config.indicators;
        let w = |series: &[f64]| Window3::at(series, index);

        let regime_start = (index + 1).saturating_sub(ind.regime_window);
        let regime = classify_regime(&self.bars[regime_start..=index], &ind.regime_params());

        let profile_start = (index + 1).saturating_sub(self.config.volume_profile.window);
        let profile = VolumeProfile::build(
            &self.bars[profile_start..=index],
            bar.close,
            &self.config.volume_profile,
        );

        let previous_bar = index.checked_sub(1).map(|p| self.bars[p].clone());
        let pattern = detect(previous_bar.as_ref(), &bar);
        let box_range = w(&set.box_range);

        Some(IndicatorSnapshot {
            index,
            timestamp: bar.timestamp,
            ema_short: w(&set.ema_short),
            ema_long: w(&set.ema_long),
            zscore: w(&set.zscore),
            vwz: w(&set.vwz),
            adaptive_vwz: w(&set.adaptive_vwz),
            bandwidth: w(&set.bandwidth),
            bandwidth_z: w(&set.bandwidth_z),
            adx: w(&set.adx),
            plus_di: w(&set.plus_di),
            minus_di: w(&set.minus_di),
            dx: w(&set.dx),
            macd: w(&set.macd),
            macd_signal: w(&set.macd_signal),
            macd_hist: w(&set.macd_hist),
            ranging: is_ranging(box_range.last(), ind.box_min_range_pct),
            box_range,
            regime,
            profile,
            pattern,
            previous_bar,
            bar,
        })
    }

    /// Snapshots for every index, in order.
    pub fn iter(&self) -> impl Iterator<Item = IndicatorSnapshot> + '_ {
        (0..self.bars.len()).filter_map(move |i| self.build(i))
    }
}
