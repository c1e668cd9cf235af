//! Property tests for pipeline and engine invariants.
//!
//! Uses proptest to verify:
//! 1. Alignment: every indicator output matches the input length, with an
//!    undefined prefix no longer than its lookback
//! 2. Level separation: profile levels are at least the minimum distance
//!    apart, and the POC is the heaviest bin
//! 3. P&L sign: every closed trade's P&L agrees with its direction and move
//! 4. Book exclusivity: without hedging, trades never overlap
//! 5. Candle exclusivity: hammer and shooting star never share a bar

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use vwzlab_core::config::{StrategyConfig, VolumeProfileConfig};
use vwzlab_core::indicators::{indicator_suite, Indicator};
use vwzlab_core::patterns::{is_bearish_shooting_star, is_bullish_hammer};
use vwzlab_core::profile::{bin_volumes, VolumeProfile};
use vwzlab_core::{run_backtest, Bar, Direction};

// ── Strategies (proptest) ────────────────────────────────────────────

/// One step of a random walk: (return, wick fraction, volume).
fn arb_step() -> impl Strategy<Value = (f64, f64, f64)> {
    (-1.0..1.0_f64, 0.0005..0.01_f64, 100.0..10_000.0_f64)
}

fn arb_bars(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec(arb_step(), len).prop_map(|steps| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut price = 100.0_f64;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (ret, wick, volume))| {
                let open = price;
                price = (price * (1.0 + ret * 0.02)).max(1.0);
                let close = price;
                Bar {
                    timestamp: base + Duration::minutes(i as i64),
                    open,
                    high: open.max(close) * (1.0 + wick),
                    low: open.min(close) * (1.0 - wick),
                    close,
                    volume: volume.round(),
                }
            })
            .collect()
    })
}

fn arb_profile_config() -> impl Strategy<Value = VolumeProfileConfig> {
    (0.02..1.0_f64, 0.1..3.0_f64).prop_map(|(bin_size_pct, min_level_distance_pct)| {
        VolumeProfileConfig {
            bin_size_pct,
            min_level_distance_pct,
            ..VolumeProfileConfig::default()
        }
    })
}

// ── 1. Alignment ─────────────────────────────────────────────────────

proptest! {
    /// Output length equals input length; the leading run of NaN never
    /// extends past the lookback.
    #[test]
    fn indicators_align_with_input(bars in arb_bars(1..160)) {
        let config = StrategyConfig::default();
        for indicator in indicator_suite(&config.indicators) {
            let values = indicator.compute(&bars);
            prop_assert_eq!(values.len(), bars.len(), "{}", indicator.name());
            let undefined = values.iter().take_while(|v| v.is_nan()).count();
            prop_assert!(
                undefined <= indicator.lookback(),
                "{}: {} undefined values, lookback {}",
                indicator.name(),
                undefined,
                indicator.lookback()
            );
        }
    }
}

// ── 2. Level Separation ──────────────────────────────────────────────

proptest! {
    #[test]
    fn profile_levels_are_separated(
        bars in arb_bars(5..120),
        config in arb_profile_config(),
    ) {
        let reference = bars[bars.len() - 1].close;
        let profile = VolumeProfile::build(&bars, reference, &config);
        let min_distance = reference * config.min_level_distance_pct / 100.0;

        let levels: Vec<f64> = profile.levels().collect();
        for (i, a) in levels.iter().enumerate() {
            for b in &levels[i + 1..] {
                prop_assert!((a - b).abs() >= min_distance - 1e-9, "{} and {} too close", a, b);
            }
        }
        prop_assert!(profile.upper_levels.iter().all(|&l| l > reference));
        prop_assert!(profile.lower_levels.iter().all(|&l| l <= reference));
    }

    #[test]
    fn poc_is_the_heaviest_bin(
        bars in arb_bars(5..120),
        config in arb_profile_config(),
    ) {
        let reference = bars[bars.len() - 1].close;
        let profile = VolumeProfile::build(&bars, reference, &config);
        let bins = bin_volumes(&bars, profile.bin_size);

        let heaviest = bins.values().copied().fold(0.0_f64, f64::max);
        prop_assert!((profile.poc_volume - heaviest).abs() < 1e-6);
        let poc_bin = (profile.poc / profile.bin_size).floor() as i64;
        prop_assert!((bins[&poc_bin] - heaviest).abs() < 1e-6);
        prop_assert!(profile.value_area_low <= profile.poc);
        prop_assert!(profile.poc <= profile.value_area_high);
    }
}

// ── 3. P&L Sign ──────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// pnl = sign(direction) * (exit - entry) * size, so its sign follows
    /// the price move.
    #[test]
    fn pnl_sign_follows_direction(bars in arb_bars(80..220), hedge in any::<bool>()) {
        let mut config = StrategyConfig::default();
        config.hedge.enabled = hedge;
        let result = run_backtest(&bars, &config).unwrap();

        for trade in &result.trades {
            let sign = match trade.direction {
                Direction::Long => 1.0,
                Direction::Short => -1.0,
            };
            let expected = sign * (trade.exit_price - trade.entry_price) * trade.size;
            prop_assert!((trade.pnl - expected).abs() < 1e-6 * trade.entry_price.max(1.0));
            prop_assert!(trade.exit_index >= trade.entry_index);
            prop_assert!(trade.entry_index >= result.warmup_bars);
        }
        let total: f64 = result.trades.iter().map(|t| t.pnl).sum();
        prop_assert!((result.totals.total_pnl - total).abs() < 1e-6);
        prop_assert_eq!(
            result.totals.win_count + result.totals.loss_count,
            result.trades.len()
        );
    }

    // ── 4. Book Exclusivity ──────────────────────────────────────────

    #[test]
    fn unhedged_trades_never_overlap(bars in arb_bars(80..220)) {
        let result = run_backtest(&bars, &StrategyConfig::default()).unwrap();
        for pair in result.trades.windows(2) {
            prop_assert!(pair[1].entry_index >= pair[0].exit_index);
        }
        prop_assert!(result.open_positions.len() <= 1);
    }
}

// ── 5. Candle Exclusivity ────────────────────────────────────────────

proptest! {
    #[test]
    fn hammer_and_shooting_star_are_exclusive(bars in arb_bars(1..40)) {
        for bar in &bars {
            prop_assert!(!(is_bullish_hammer(bar) && is_bearish_shooting_star(bar)));
        }
    }
}
