//! Volume profile: point of control, support/resistance levels, value area.
//!
//! The price axis is cut into bins of `reference * bin_size_pct / 100`. Each
//! bar spreads its volume uniformly over every bin its [low, high] range
//! touches. The POC is the bin with the most volume; other levels are
//! interior bins that strictly exceed both neighbours, kept greedily by
//! volume as long as they stay at least `reference * min_level_distance_pct
//! / 100` away from every level already kept. The lowest and highest
//! occupied bins are never levels.
//!
//! Bars with non-finite prices or a range wider than [`MAX_BAR_BINS`] bins
//! are left out of the profile.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::VolumeProfileConfig;
use crate::domain::Bar;

/// Widest range, in bins, a single bar may spread its volume over.
pub const MAX_BAR_BINS: f64 = 10_000.0;

/// Bin indexes beyond this magnitude are not exactly representable.
const MAX_BIN_INDEX: f64 = 4_503_599_627_370_496.0;

/// Profile of one trailing window. All-zero when the window carries no volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VolumeProfile {
    /// Midpoint of the highest-volume bin.
    pub poc: f64,
    pub poc_volume: f64,
    /// Levels above the reference price, nearest first.
    pub upper_levels: Vec<f64>,
    /// Levels at or below the reference price, nearest first.
    pub lower_levels: Vec<f64>,
    pub value_area_high: f64,
    pub value_area_low: f64,
    pub bin_size: f64,
}

impl VolumeProfile {
    /// Build the profile of `window` around `reference_price`.
    pub fn build(window: &[Bar], reference_price: f64, config: &VolumeProfileConfig) -> Self {
        let bin_size = reference_price * config.bin_size_pct / 100.0;
        if !bin_size.is_finite() || bin_size <= 0.0 {
            return Self::default();
        }

        let bins = bin_volumes(window, bin_size);
        let total: f64 = bins.values().sum();
        if total <= 0.0 {
            return Self::default();
        }

        let mut poc_bin = 0_i64;
        let mut poc_volume = f64::NEG_INFINITY;
        for (&bin, &volume) in &bins {
            if volume > poc_volume {
                poc_bin = bin;
                poc_volume = volume;
            }
        }
        let midpoint = |bin: i64| bin as f64 * bin_size + bin_size / 2.0;
        let poc = midpoint(poc_bin);

        // interior local maxima other than the POC, strongest first
        let (first_bin, last_bin) = match (bins.keys().next(), bins.keys().next_back()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Self::default(),
        };
        let mut candidates: Vec<(f64, f64)> = bins
            .range(first_bin + 1..last_bin.max(first_bin + 1))
            .filter(|&(&bin, &volume)| {
                let below = bins.get(&(bin - 1)).copied().unwrap_or(0.0);
                let above = bins.get(&(bin + 1)).copied().unwrap_or(0.0);
                bin != poc_bin && volume > below && volume > above
            })
            .map(|(&bin, &volume)| (midpoint(bin), volume))
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.total_cmp(&b.0)));

        let min_distance = reference_price * config.min_level_distance_pct / 100.0;
        let mut kept = vec![poc];
        for (price, _) in candidates {
            if kept.iter().all(|k| (price - k).abs() >= min_distance) {
                kept.push(price);
            }
        }

        let (mut upper_levels, mut lower_levels): (Vec<f64>, Vec<f64>) =
            kept[1..].iter().partition(|&&p| p > reference_price);
        upper_levels.sort_by(f64::total_cmp);
        lower_levels.sort_by(|a, b| b.total_cmp(a));

        let (low_bin, high_bin) = value_area(&bins, poc_bin, total * config.value_area_pct);

        Self {
            poc,
            poc_volume,
            upper_levels,
            lower_levels,
            value_area_low: low_bin as f64 * bin_size,
            value_area_high: (high_bin + 1) as f64 * bin_size,
            bin_size,
        }
    }

    /// POC followed by every kept level.
    pub fn levels(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.poc)
            .chain(self.upper_levels.iter().copied())
            .chain(self.lower_levels.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.poc_volume <= 0.0
    }
}

/// Volume per bin index, spread uniformly across each bar's range.
pub fn bin_volumes(window: &[Bar], bin_size: f64) -> BTreeMap<i64, f64> {
    let mut bins = BTreeMap::new();
    for bar in window {
        if bar.is_void() || bar.volume <= 0.0 {
            continue;
        }
        if !(bar.low.is_finite() && bar.high.is_finite() && bar.volume.is_finite()) {
            continue;
        }
        let lo = (bar.low.min(bar.high) / bin_size).floor();
        let hi = (bar.high.max(bar.low) / bin_size).floor();
        if hi - lo >= MAX_BAR_BINS || lo.abs() > MAX_BIN_INDEX || hi.abs() > MAX_BIN_INDEX {
            tracing::debug!(low = bar.low, high = bar.high, bin_size, "bar range left out of profile");
            continue;
        }
        let (lo, hi) = (lo as i64, hi as i64);
        let share = bar.volume / (hi - lo + 1) as f64;
        for bin in lo..=hi {
            *bins.entry(bin).or_insert(0.0) += share;
        }
    }
    bins
}

/// Grow outward from the POC, absorbing the heavier neighbour (upper wins
/// ties), until `target` volume is covered or the profile is exhausted.
///
/// Runs of empty bins are crossed in one step; absorbing them one at a time
/// adds nothing and the other side cannot win while they last.
fn value_area(bins: &BTreeMap<i64, f64>, poc_bin: i64, target: f64) -> (i64, i64) {
    let (Some(&first), Some(&last)) = (bins.keys().next(), bins.keys().next_back()) else {
        return (poc_bin, poc_bin);
    };
    let volume_at = |bin: i64| bins.get(&bin).copied().unwrap_or(0.0);

    let (mut low, mut high) = (poc_bin, poc_bin);
    let mut covered = volume_at(poc_bin);
    while covered < target && (low > first || high < last) {
        let up = (high < last).then(|| volume_at(high + 1));
        let down = (low > first).then(|| volume_at(low - 1));
        let grow_up = match (up, down) {
            (Some(u), Some(d)) => u >= d,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        if grow_up {
            let Some((&next, &volume)) = bins.range(high + 1..).next() else {
                break;
            };
            if next == high + 1 {
                covered += volume;
                high = next;
            } else {
                high = next - 1;
            }
        } else {
            let Some((&prev, &volume)) = bins.range(..low).next_back() else {
                break;
            };
            if prev == low - 1 {
                covered += volume;
                low = prev;
            } else {
                low = prev + 1;
            }
        }
    }
    (low, high)
}
