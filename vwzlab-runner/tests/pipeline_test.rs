//! End-to-end runs: config file → bars → engine → statistics → artifacts.
//!
//! Bars come from the seeded generator, written to a temporary CSV where a
//! test needs the file path, so every run is reproducible offline.

use std::path::Path;

use vwzlab_core::{run_backtest, Bar};
use vwzlab_runner::config::RunConfig;
use vwzlab_runner::export::TRADE_COLUMNS;
use vwzlab_runner::runner::{load_bars, run_from_config, run_on_bars};
use vwzlab_runner::synthetic::{generate_bars, SyntheticSpec};

// ───── Helpers ─────

fn spec() -> SyntheticSpec {
    SyntheticSpec {
        seed: 7,
        bars: 600,
        volatility: 0.015,
        ..SyntheticSpec::default()
    }
}

fn write_csv(bars: &[Bar], path: &Path) {
    let mut text = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        text.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(path, text).unwrap();
}

fn csv_config(dir: &Path) -> RunConfig {
    let bars_path = dir.join("bars.csv");
    write_csv(&generate_bars(&spec()), &bars_path);

    let toml = format!(
        r#"
[data]
bars = '{bars}'

[strategy.entry]
long_condition = "default"
short_condition = "default"

[strategy.exit]
take_profit_rate = 0.01
stop_loss_rate = 0.01

[output]
trades_csv = '{out}/trades.csv'
snapshots_jsonl = '{out}/snapshots.jsonl'
report_json = '{out}/report.json'
"#,
        bars = bars_path.display(),
        out = dir.join("out").display(),
    );
    let config_path = dir.join("run.toml");
    std::fs::write(&config_path, toml).unwrap();
    RunConfig::from_file(&config_path).unwrap()
}

// ───── Tests ─────

#[test]
fn csv_run_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = csv_config(dir.path());
    let report = run_from_config(&config).unwrap();
    let out = dir.path().join("out");

    assert_eq!(report.bar_count, 600);
    assert_eq!(report.statistics.trade_count, report.trades.len());

    let trades_csv = std::fs::read_to_string(out.join("trades.csv")).unwrap();
    let mut lines = trades_csv.lines();
    assert_eq!(lines.next().unwrap(), TRADE_COLUMNS.join(","));
    assert_eq!(lines.count(), report.trades.len());

    let snapshots = std::fs::read_to_string(out.join("snapshots.jsonl")).unwrap();
    assert_eq!(snapshots.lines().count(), report.bar_count);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(json["run_id"], report.run_id.as_str());
    assert_eq!(json["statistics"]["trade_count"], report.trades.len());
}

#[test]
fn csv_and_synthetic_sources_agree() {
    let dir = tempfile::tempdir().unwrap();
    let from_csv = load_bars(&csv_config(dir.path()).data).unwrap();

    let mut synthetic = RunConfig::default();
    synthetic.data.synthetic = Some(spec());
    let generated = load_bars(&synthetic.data).unwrap();

    assert_eq!(from_csv, generated);
}

#[test]
fn statistics_agree_with_engine_totals() {
    let bars = generate_bars(&spec());
    let config = RunConfig::default();
    let report = run_on_bars(&bars, &config.strategy, config.run_id()).unwrap();
    let result = run_backtest(&bars, &config.strategy).unwrap();

    assert_eq!(report.statistics.win_count, result.totals.win_count);
    assert_eq!(report.statistics.loss_count, result.totals.loss_count);
    assert!((report.statistics.total_pnl - result.totals.total_pnl).abs() < 1e-9);
    assert!((report.statistics.win_rate - result.totals.win_rate).abs() < 1e-9);

    let summed: f64 = report.trades.iter().map(|t| t.pnl).sum();
    assert!((report.statistics.total_pnl - summed).abs() < 1e-9);
    assert!(report.statistics.max_drawdown >= 0.0);
}

#[test]
fn json_config_with_synthetic_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    std::fs::write(
        &path,
        r#"{
            "data": { "synthetic": { "seed": 3, "bars": 250 } },
            "strategy": { "hedge": { "enabled": true } }
        }"#,
    )
    .unwrap();

    let config = RunConfig::from_file(&path).unwrap();
    assert!(config.strategy.hedge.enabled);

    let first = run_from_config(&config).unwrap();
    let second = run_from_config(&config).unwrap();
    assert_eq!(first.bar_count, 250);
    assert_eq!(first.run_id, second.run_id);
    assert_eq!(first.statistics, second.statistics);
}

#[test]
fn short_series_produces_empty_ledger() {
    let bars = generate_bars(&SyntheticSpec {
        bars: 20,
        ..SyntheticSpec::default()
    });
    let config = RunConfig::default();
    let report = run_on_bars(&bars, &config.strategy, config.run_id()).unwrap();
    assert!(report.trades.is_empty());
    assert!(report.open_positions.is_empty());
    assert_eq!(report.statistics.profit_factor, 0.0);
}
