//! Criterion benchmarks for VWZLab hot paths.
//!
//! Benchmarks:
//! 1. Indicator precompute (full IndicatorSet)
//! 2. Snapshot construction (regime and volume profile per bar)
//! 3. Full backtest per condition family
//! 4. Hedge-mode backtest

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use vwzlab_core::config::StrategyConfig;
use vwzlab_core::indicators::IndicatorSet;
use vwzlab_core::snapshot::SnapshotBuilder;
use vwzlab_core::{Backtester, Bar};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = close - 0.3;
            Bar {
                timestamp: base + chrono::Duration::minutes(i as i64),
                open,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000.0 + (i % 500_000) as f64,
            }
        })
        .collect()
}

fn config_for(condition: &str) -> StrategyConfig {
    let mut config = StrategyConfig::default();
    config.entry.long_condition = condition.into();
    config.entry.short_condition = condition.into();
    config
}

// ── 1. Indicator Precompute ──────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_precompute");
    let config = StrategyConfig::default();

    for &bar_count in &[500, 2_000, 10_000] {
        let bars = make_bars(bar_count);
        group.bench_with_input(
            BenchmarkId::new("indicator_set", bar_count),
            &bar_count,
            |b, _| b.iter(|| IndicatorSet::compute(black_box(&bars), black_box(&config.indicators))),
        );
    }

    group.finish();
}

// ── 2. Snapshot Construction ─────────────────────────────────────────

fn bench_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshots");
    let config = StrategyConfig::default();
    let bars = make_bars(2_000);
    let set = IndicatorSet::compute(&bars, &config.indicators);
    let builder = SnapshotBuilder::new(&bars, &set, &config);

    group.bench_function("build_2000", |b| {
        b.iter(|| builder.iter().count());
    });

    group.finish();
}

// ── 3. Backtest Per Condition ────────────────────────────────────────

fn bench_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtest");
    let bars = make_bars(2_000);

    for condition in ["default", "macd", "bbw", "combined", "volume_cluster"] {
        let bt = Backtester::with_builtin(config_for(condition)).unwrap();
        group.bench_with_input(
            BenchmarkId::new(condition, bars.len()),
            &bars,
            |b, bars| b.iter(|| bt.run(black_box(bars))),
        );
    }

    group.finish();
}

// ── 4. Hedge Mode ────────────────────────────────────────────────────

fn bench_hedge(c: &mut Criterion) {
    let mut group = c.benchmark_group("hedge");
    let bars = make_bars(2_000);
    let mut config = config_for("dmi");
    config.hedge.enabled = true;
    let bt = Backtester::with_builtin(config).unwrap();

    group.bench_function("dmi_2000", |b| {
        b.iter(|| bt.run(black_box(&bars)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_indicators,
    bench_snapshots,
    bench_backtest,
    bench_hedge,
);
criterion_main!(benches);
