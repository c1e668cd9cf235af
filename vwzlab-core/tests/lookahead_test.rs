//! Look-ahead contamination tests for the indicator pipeline and snapshots.
//!
//! No value at bar t may depend on bar t+1 or later. Each test computes on a
//! truncated series (bars 0..100) and the full series (bars 0..200) and
//! asserts the shared prefix is identical, NaN included.

use chrono::{Duration, NaiveDate};
use vwzlab_core::config::StrategyConfig;
use vwzlab_core::indicators::{indicator_suite, Indicator, IndicatorSet};
use vwzlab_core::snapshot::SnapshotBuilder;
use vwzlab_core::Bar;

/// Deterministic pseudo-random walk with realistic OHLCV variation.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let change = ((seed >> 33) % 200) as f64 / 100.0 - 1.0; // -1.0 to +1.0
        let open = price;
        price = (price + change).max(10.0);
        let close = price;
        let wick = 0.3 + ((seed >> 40) % 10) as f64 * 0.05;

        bars.push(Bar {
            timestamp: base + Duration::minutes(i as i64),
            open,
            high: open.max(close) + wick,
            low: open.min(close) - wick,
            close,
            volume: 1_000.0 + ((seed >> 20) % 5_000) as f64,
        });
    }
    bars
}

fn same(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

fn assert_prefix_identical(name: &str, short: &[f64], full: &[f64]) {
    assert_eq!(short.len(), 100, "{name}: wrong length");
    for (i, (&s, &f)) in short.iter().zip(full).enumerate() {
        assert!(same(s, f), "{name}: bar {i} differs ({s} vs {f})");
    }
}

#[test]
fn single_series_indicators_ignore_future_bars() {
    let bars = make_test_bars(200);
    let config = StrategyConfig::default();
    for indicator in indicator_suite(&config.indicators) {
        let short = indicator.compute(&bars[..100]);
        let full = indicator.compute(&bars);
        assert_prefix_identical(indicator.name(), &short, &full);
    }
}

#[test]
fn indicator_set_ignores_future_bars() {
    let bars = make_test_bars(200);
    let config = StrategyConfig::default();
    let short = IndicatorSet::compute(&bars[..100], &config.indicators);
    let full = IndicatorSet::compute(&bars, &config.indicators);

    let pairs: [(&str, &[f64], &[f64]); 15] = [
        ("ema_short", &short.ema_short, &full.ema_short),
        ("ema_long", &short.ema_long, &full.ema_long),
        ("zscore", &short.zscore, &full.zscore),
        ("vwz", &short.vwz, &full.vwz),
        ("adaptive_vwz", &short.adaptive_vwz, &full.adaptive_vwz),
        ("bandwidth", &short.bandwidth, &full.bandwidth),
        ("bandwidth_z", &short.bandwidth_z, &full.bandwidth_z),
        ("adx", &short.adx, &full.adx),
        ("plus_di", &short.plus_di, &full.plus_di),
        ("minus_di", &short.minus_di, &full.minus_di),
        ("dx", &short.dx, &full.dx),
        ("macd", &short.macd, &full.macd),
        ("macd_signal", &short.macd_signal, &full.macd_signal),
        ("macd_hist", &short.macd_hist, &full.macd_hist),
        ("box_range", &short.box_range, &full.box_range),
    ];
    for (name, s, f) in pairs {
        assert_prefix_identical(name, s, f);
    }
}

#[test]
fn snapshots_ignore_future_bars() {
    let bars = make_test_bars(200);
    let config = StrategyConfig::default();
    let short_set = IndicatorSet::compute(&bars[..100], &config.indicators);
    let full_set = IndicatorSet::compute(&bars, &config.indicators);
    let short = SnapshotBuilder::new(&bars[..100], &short_set, &config);
    let full = SnapshotBuilder::new(&bars, &full_set, &config);

    for i in [0, 1, 50, 69, 99] {
        let a = serde_json::to_string(&short.build(i).unwrap()).unwrap();
        let b = serde_json::to_string(&full.build(i).unwrap()).unwrap();
        assert_eq!(a, b, "snapshot {i} differs");
    }
}
