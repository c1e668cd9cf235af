//! Run orchestration. Wires bar loading, the engine, statistics and export together.
//!
//! Two entry points:
//! - `run_from_config()`: loads bars, runs, writes every configured artifact.
//!   Used by the CLI.
//! - `run_on_bars()`: takes pre-loaded bars, no I/O. Used by sweeps.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use vwzlab_core::config::StrategyConfig;
use vwzlab_core::{Backtester, Bar, EngineError, Position, Trade};

use crate::config::{DataConfig, RunConfig, RunConfigError, RunId};
use crate::data_loader::{load_bars_csv, LoadError};
use crate::export::{save_report_json, save_snapshots_jsonl, save_trades_csv, ExportError};
use crate::metrics::TradeStatistics;
use crate::synthetic::generate_bars;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] RunConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// Complete result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub strategy: StrategyConfig,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub statistics: TradeStatistics,
    pub trades: Vec<Trade>,
    pub open_positions: Vec<Position>,
}

/// Bars for `data`: the CSV file when set, else the synthetic generator.
pub fn load_bars(data: &DataConfig) -> Result<Vec<Bar>, RunError> {
    if let Some(path) = &data.bars {
        return Ok(load_bars_csv(path, &data.load)?);
    }
    if let Some(spec) = &data.synthetic {
        tracing::info!(seed = spec.seed, bars = spec.bars, "generating synthetic bars");
        return Ok(generate_bars(spec));
    }
    Err(RunConfigError::NoDataSource.into())
}

/// Run `strategy` over pre-loaded bars.
pub fn run_on_bars(bars: &[Bar], strategy: &StrategyConfig, run_id: RunId) -> Result<RunReport, RunError> {
    let backtester = Backtester::with_builtin(strategy.clone())?;
    Ok(report_for(&backtester, bars, run_id))
}

/// Load, run and export everything `config.output` names.
pub fn run_from_config(config: &RunConfig) -> Result<RunReport, RunError> {
    config.validate()?;
    let bars = load_bars(&config.data)?;
    let backtester = Backtester::with_builtin(config.strategy.clone())?;
    let report = report_for(&backtester, &bars, config.run_id());

    let output = &config.output;
    if let Some(path) = &output.trades_csv {
        save_trades_csv(&report.trades, path)?;
    }
    if let Some(path) = &output.snapshots_jsonl {
        save_snapshots_jsonl(&backtester.snapshots(&bars), path)?;
    }
    if let Some(path) = &output.report_json {
        save_report_json(&report, path)?;
    }
    Ok(report)
}

fn report_for(backtester: &Backtester, bars: &[Bar], run_id: RunId) -> RunReport {
    let result = backtester.run(bars);
    let statistics = TradeStatistics::compute(&result.trades);
    tracing::debug!(
        run_id = %run_id,
        trades = statistics.trade_count,
        total_pnl = statistics.total_pnl,
        max_drawdown = statistics.max_drawdown,
        "run complete"
    );
    RunReport {
        run_id,
        strategy: backtester.config().clone(),
        bar_count: result.bar_count,
        warmup_bars: result.warmup_bars,
        first_timestamp: bars.first().map(|b| b.timestamp),
        last_timestamp: bars.last().map(|b| b.timestamp),
        statistics,
        trades: result.trades,
        open_positions: result.open_positions,
    }
}
