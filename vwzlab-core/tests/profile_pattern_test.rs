//! Integration tests for the volume profile and candle recognizer as seen
//! through the snapshot stream.
//!
//! Tests:
//! 1. A single dominant bin becomes the POC with no other levels
//! 2. Levels split around the reference price
//! 3. Zero-body bars with range are dojis, and doji wins over every pattern
//! 4. Snapshots carry the pattern of each bar against its predecessor
//! 5. A bar with an infinite high does not derail a full run

use chrono::{Duration, NaiveDate, NaiveDateTime};
use vwzlab_core::config::{StrategyConfig, VolumeProfileConfig};
use vwzlab_core::indicators::IndicatorSet;
use vwzlab_core::patterns::{detect, CandlePattern};
use vwzlab_core::profile::VolumeProfile;
use vwzlab_core::snapshot::SnapshotBuilder;
use vwzlab_core::{run_backtest, Bar};

// ───── Helpers ─────

fn at(i: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::minutes(5 * i)
}

fn bar(i: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar {
        timestamp: at(i),
        open,
        high,
        low,
        close,
        volume,
    }
}

fn profile_config(bin_size_pct: f64) -> VolumeProfileConfig {
    VolumeProfileConfig {
        bin_size_pct,
        ..VolumeProfileConfig::default()
    }
}

// ───── 1. Dominant bin ─────

#[test]
fn dominant_bin_is_the_only_level() {
    // bin size 0.5 at reference 100; the heavy bar sits inside bin 200,
    // the light bar spreads 1.0 over bins 196..=204
    let window = vec![
        bar(0, 98.2, 102.4, 98.1, 102.0, 9.0),
        bar(1, 100.15, 100.3, 100.1, 100.2, 10_000.0),
    ];
    let profile = VolumeProfile::build(&window, 100.0, &profile_config(0.5));

    assert!((profile.poc - 100.25).abs() < 1e-9, "poc = {}", profile.poc);
    assert!((profile.poc_volume - 10_001.0).abs() < 1e-9);
    assert!(profile.upper_levels.is_empty());
    assert!(profile.lower_levels.is_empty());
    assert!(profile.value_area_low <= profile.poc && profile.poc <= profile.value_area_high);
}

// ───── 2. Level sides ─────

#[test]
fn levels_split_around_reference_price() {
    let window = vec![
        bar(0, 95.1, 95.4, 95.05, 95.3, 2_000.0),
        bar(1, 100.1, 100.4, 100.05, 100.3, 5_000.0),
        bar(2, 104.1, 104.4, 104.05, 104.3, 1_500.0),
        bar(3, 108.1, 108.4, 108.05, 108.3, 1_000.0),
        bar(4, 90.1, 90.4, 90.05, 90.3, 100.0),
        bar(5, 112.1, 112.4, 112.05, 112.3, 100.0),
    ];
    let profile = VolumeProfile::build(&window, 100.0, &profile_config(0.5));

    assert!(profile.upper_levels.iter().all(|&l| l > 100.0));
    assert!(profile.lower_levels.iter().all(|&l| l <= 100.0));
    assert!(profile.upper_levels.windows(2).all(|p| p[0] < p[1]));
    assert!(profile.lower_levels.windows(2).all(|p| p[0] > p[1]));
    assert_eq!(profile.upper_levels, vec![104.25, 108.25]);
    assert_eq!(profile.lower_levels, vec![95.25]);
}

// ───── 3. Doji ─────

#[test]
fn zero_body_with_range_is_doji() {
    let prev = bar(0, 103.0, 103.5, 99.5, 100.0, 1_000.0);
    let curr = bar(1, 101.0, 102.0, 100.0, 101.0, 1_000.0);
    assert_eq!(detect(Some(&prev), &curr), Some(CandlePattern::Doji));
    assert_eq!(detect(None, &curr), Some(CandlePattern::Doji));
}

#[test]
fn zero_range_bar_is_doji() {
    let flat = bar(0, 100.0, 100.0, 100.0, 100.0, 1_000.0);
    assert_eq!(detect(None, &flat), Some(CandlePattern::Doji));
}

// ───── 4. Snapshot patterns ─────

#[test]
fn snapshot_pattern_uses_previous_bar() {
    let bars = vec![
        bar(0, 100.0, 100.6, 99.4, 100.2, 1_000.0),
        // bearish
        bar(1, 101.0, 101.2, 99.8, 100.0, 1_000.0),
        // bullish, closes above the prior open
        bar(2, 99.9, 101.8, 99.8, 101.5, 1_000.0),
        // hammer: body 0.2, lower wick 1.0, no upper wick
        bar(3, 101.3, 101.5, 100.3, 101.5, 1_000.0),
    ];
    let config = StrategyConfig::default();
    let set = IndicatorSet::compute(&bars, &config.indicators);
    let snaps: Vec<_> = SnapshotBuilder::new(&bars, &set, &config).iter().collect();

    assert_eq!(snaps[2].pattern, Some(CandlePattern::BullishEngulfing));
    assert_eq!(snaps[3].pattern, Some(CandlePattern::BullishHammer));
    assert!(snaps[0].previous_bar.is_none());
    assert_eq!(snaps[3].previous_bar.as_ref(), Some(&bars[2]));
}

// ───── 5. Malformed bar ─────

#[test]
fn infinite_high_inside_profile_window_is_tolerated() {
    let mut window: Vec<Bar> = (0..120)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.2).sin() * 4.0;
            bar(i, close - 0.3, close + 1.0, close - 1.0, close, 1_000.0)
        })
        .collect();
    window[100].high = f64::INFINITY;

    let config = StrategyConfig::default();
    let profile = VolumeProfile::build(&window, 100.0, &config.volume_profile);
    assert!(!profile.is_empty());
    assert!(profile.value_area_high.is_finite());

    let result = run_backtest(&window, &config).unwrap();
    assert_eq!(result.bar_count, window.len());
}
