//! Backtest engine: one deterministic replay over a bar series.
//!
//! Indicators are precomputed once, then each bar from the warm-up index on
//! runs the fixed sequence:
//!
//! 1. Hedge: a force-exit on the only open position opens the opposite leg
//!    at `size * size_multiplier`; in `BothOpen`, a force-exit on one leg
//!    resizes the other to half its size.
//! 2. Combined: in `BothOpen`, close both legs at the close once their
//!    combined P&L is positive, then move to the next bar.
//! 3. Single exits: stop-loss, take-profit, signal, first match only.
//! 4. Minimum size: a leg below `min_position_size` closes with its
//!    counterpart.
//! 5. Entries: at most one per bar, long evaluated first, gated by ADX and
//!    the optional box filter.

pub mod exits;
pub mod loop_runner;
pub mod state;

pub use exits::{evaluate_exit, ExitFill};
pub use state::{BookError, PositionBook};

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::conditions::{ConditionError, ConditionRegistry, ConditionSignal, EntryCondition};
use crate::config::{ConfigError, StrategyConfig};
use crate::domain::{Bar, Direction, Position, Trade};
use crate::indicators::{compute_warmup, IndicatorSet};
use crate::snapshot::{IndicatorSnapshot, SnapshotBuilder};

// ─── Error type ──────────────────────────────────────────────────────

/// Raised before the first bar; a run that starts always completes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Condition(#[from] ConditionError),
}

// ─── Results ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BacktestTotals {
    pub win_count: usize,
    /// Trades with P&L at or below zero.
    pub loss_count: usize,
    pub total_pnl: f64,
    /// Percentage of winning trades, 0 without trades.
    pub win_rate: f64,
}

impl BacktestTotals {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let win_count = trades.iter().filter(|t| t.is_winner()).count();
        let total_pnl = trades.iter().map(|t| t.pnl).sum();
        let win_rate = if trades.is_empty() {
            0.0
        } else {
            win_count as f64 / trades.len() as f64 * 100.0
        };
        Self {
            win_count,
            loss_count: trades.len() - win_count,
            total_pnl,
            win_rate,
        }
    }
}

/// Outcome of one run. Positions still open at the last bar stay open and
/// are reported separately from the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub open_positions: Vec<Position>,
    pub totals: BacktestTotals,
    pub bar_count: usize,
    pub warmup_bars: usize,
}

impl BacktestResult {
    pub fn new(
        trades: Vec<Trade>,
        open_positions: Vec<Position>,
        bar_count: usize,
        warmup_bars: usize,
    ) -> Self {
        let totals = BacktestTotals::from_trades(&trades);
        Self {
            trades,
            open_positions,
            totals,
            bar_count,
            warmup_bars,
        }
    }
}

/// Both conditions' raw output at one index, plus the gated entry decision.
#[derive(Debug, Clone, Serialize)]
pub struct SignalRecord {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub long: ConditionSignal,
    pub short: ConditionSignal,
    /// Side an entry would be attempted on, after the ADX and box gates.
    pub entry: Option<Direction>,
}

// ─── Backtester ──────────────────────────────────────────────────────

/// A validated strategy with its long and short conditions resolved.
pub struct Backtester {
    config: StrategyConfig,
    long: Arc<dyn EntryCondition>,
    short: Arc<dyn EntryCondition>,
    warmup: usize,
}

impl std::fmt::Debug for Backtester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtester")
            .field("long", &self.long.name())
            .field("short", &self.short.name())
            .field("warmup", &self.warmup)
            .finish_non_exhaustive()
    }
}

impl Backtester {
    /// Validate `config` and resolve its condition names against `registry`.
    pub fn new(config: StrategyConfig, registry: &ConditionRegistry) -> Result<Self, EngineError> {
        config.validate()?;
        let long = registry.resolve(Direction::Long, &config.entry.long_condition)?;
        let short = registry.resolve(Direction::Short, &config.entry.short_condition)?;
        let warmup = compute_warmup(&config.indicators);
        Ok(Self {
            config,
            long,
            short,
            warmup,
        })
    }

    pub fn with_builtin(config: StrategyConfig) -> Result<Self, EngineError> {
        Self::new(config, &ConditionRegistry::builtin())
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// First bar index at which entries may be evaluated.
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    pub fn run(&self, bars: &[Bar]) -> BacktestResult {
        loop_runner::replay(self, bars)
    }

    /// Every post-warm-up bar's condition output, without trading.
    pub fn signals(&self, bars: &[Bar]) -> Vec<SignalRecord> {
        if bars.len() <= self.warmup {
            return Vec::new();
        }
        let set = IndicatorSet::compute(bars, &self.config.indicators);
        let builder = SnapshotBuilder::new(bars, &set, &self.config);
        (self.warmup..bars.len())
            .filter_map(|i| builder.build(i))
            .map(|snapshot| {
                let (long, short) = self.evaluate(&snapshot);
                SignalRecord {
                    index: snapshot.index,
                    timestamp: snapshot.timestamp,
                    close: snapshot.close(),
                    entry: self.gated_entry(&snapshot, long, short),
                    long,
                    short,
                }
            })
            .collect()
    }

    /// The snapshot stream for every index, warm-up included.
    pub fn snapshots(&self, bars: &[Bar]) -> Vec<IndicatorSnapshot> {
        let set = IndicatorSet::compute(bars, &self.config.indicators);
        SnapshotBuilder::new(bars, &set, &self.config).iter().collect()
    }

    pub(crate) fn evaluate(&self, snapshot: &IndicatorSnapshot) -> (ConditionSignal, ConditionSignal) {
        (
            self.long.evaluate(snapshot, &self.config),
            self.short.evaluate(snapshot, &self.config),
        )
    }

    /// Entry side after gating: ADX strictly inside the configured band and
    /// the box filter, when enabled, not flagging a range. Long wins when
    /// both conditions fire.
    pub(crate) fn gated_entry(
        &self,
        snapshot: &IndicatorSnapshot,
        long: ConditionSignal,
        short: ConditionSignal,
    ) -> Option<Direction> {
        let entry = &self.config.entry;
        let adx = snapshot.adx.last();
        let adx_ok = adx > entry.adx_threshold && entry.adx_upper_threshold.map_or(true, |upper| adx < upper);
        if !adx_ok || (entry.box_filter && snapshot.ranging) {
            return None;
        }
        if long.enter {
            Some(Direction::Long)
        } else if short.enter {
            Some(Direction::Short)
        } else {
            None
        }
    }
}

/// Validate, resolve against the built-in registry, and run.
pub fn run_backtest(bars: &[Bar], config: &StrategyConfig) -> Result<BacktestResult, EngineError> {
    Ok(Backtester::with_builtin(config.clone())?.run(bars))
}
