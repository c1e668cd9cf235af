//! Bar-by-bar replay: the backtest state machine.

use chrono::NaiveDateTime;

use super::exits::evaluate_exit;
use super::state::PositionBook;
use super::{BacktestResult, Backtester};
use crate::conditions::ConditionSignal;
use crate::config::{ExitConfig, HedgeConfig, StrategyConfig};
use crate::domain::{Bar, Direction, ExitReason, Position, Trade};
use crate::indicators::IndicatorSet;
use crate::snapshot::{IndicatorSnapshot, SnapshotBuilder};

/// Size of every non-hedge entry.
const ENTRY_SIZE: f64 = 1.0;

/// Where on the timeline a fill happens.
#[derive(Debug, Clone, Copy)]
struct Fill {
    index: usize,
    time: NaiveDateTime,
    close: f64,
}

impl Fill {
    fn of(snapshot: &IndicatorSnapshot) -> Self {
        Self {
            index: snapshot.index,
            time: snapshot.timestamp,
            close: snapshot.close(),
        }
    }

    fn close_position(&self, position: Position, price: f64, reason: ExitReason) -> Trade {
        tracing::debug!(
            index = self.index,
            side = %position.direction,
            entry = position.entry_price,
            price,
            size = position.size,
            reason = %reason,
            "close position"
        );
        position.close(self.index, self.time, price, reason)
    }
}

fn open_position(
    direction: Direction,
    size: f64,
    snapshot: &IndicatorSnapshot,
    exit: &ExitConfig,
) -> Position {
    tracing::debug!(
        index = snapshot.index,
        side = %direction,
        price = snapshot.close(),
        size,
        "open position"
    );
    Position::open(
        direction,
        snapshot.close(),
        size,
        exit.take_profit_rate,
        exit.stop_loss_rate,
        snapshot.clone(),
    )
}

/// Run the state machine over `bars`.
pub(crate) fn replay(bt: &Backtester, bars: &[Bar]) -> BacktestResult {
    let config = bt.config();
    let warmup = bt.warmup();
    let mut trades: Vec<Trade> = Vec::new();
    let mut book = PositionBook::Flat;

    if bars.len() <= warmup {
        tracing::debug!(bars = bars.len(), warmup, "not enough bars to leave warm-up");
        return BacktestResult::new(trades, Vec::new(), bars.len(), warmup);
    }

    let set = IndicatorSet::compute(bars, &config.indicators);
    let builder = SnapshotBuilder::new(bars, &set, config);

    for index in warmup..bars.len() {
        let Some(snapshot) = builder.build(index) else {
            break;
        };
        if snapshot.bar.is_void() {
            continue;
        }
        let (long_sig, short_sig) = bt.evaluate(&snapshot);
        let fill = Fill::of(&snapshot);

        // ─── 1. Hedge ───
        if config.hedge.enabled {
            apply_hedge(&mut book, &snapshot, long_sig, short_sig, config, &fill, &mut trades);
        }

        // ─── 2. Combined exit ───
        let combined = match &book {
            PositionBook::BothOpen { long, short } => {
                Some(long.unrealized_pnl(fill.close) + short.unrealized_pnl(fill.close))
            }
            _ => None,
        };
        if combined.is_some_and(|pnl| pnl > 0.0) {
            for position in book.close_all() {
                trades.push(fill.close_position(position, fill.close, ExitReason::Combined));
            }
            continue;
        }

        // ─── 3. Single-position exits ───
        let decided = book.single_mut().and_then(|position| {
            let side = position.direction;
            let force_exit = signal_for(side, long_sig, short_sig).force_exit;
            evaluate_exit(position, &snapshot, force_exit, config.exit.hold_policy).map(|f| (side, f))
        });
        if let Some((side, exit)) = decided {
            if let Some(position) = book.close_side(side) {
                trades.push(fill.close_position(position, exit.price, exit.reason));
            }
        }

        // ─── 4. Minimum size ───
        close_undersized(&mut book, &config.hedge, &fill, &mut trades);

        // ─── 5. Entries ───
        if let Some(direction) = bt.gated_entry(&snapshot, long_sig, short_sig) {
            let side_free = if config.hedge.enabled {
                !book.has(direction)
            } else {
                book.is_flat()
            };
            if side_free {
                let position = open_position(direction, ENTRY_SIZE, &snapshot, &config.exit);
                if let Err(err) = book.open(position) {
                    tracing::warn!(index, %err, "entry rejected");
                }
            }
        }
    }

    let open_positions: Vec<Position> = book.positions().into_iter().cloned().collect();
    let result = BacktestResult::new(trades, open_positions, bars.len(), warmup);
    tracing::info!(
        bars = result.bar_count,
        trades = result.trades.len(),
        open = result.open_positions.len(),
        total_pnl = result.totals.total_pnl,
        win_rate = result.totals.win_rate,
        "backtest complete"
    );
    result
}

fn signal_for(side: Direction, long: ConditionSignal, short: ConditionSignal) -> ConditionSignal {
    match side {
        Direction::Long => long,
        Direction::Short => short,
    }
}

/// Hedge adjustment requested by a force-exit.
#[derive(Debug, Clone, Copy)]
enum HedgeAction {
    Open { side: Direction, size: f64 },
    Resize { side: Direction, target: f64 },
}

/// Step 1. A force-exit never closes a position in hedge mode; it opens or
/// resizes the opposite leg instead.
fn apply_hedge(
    book: &mut PositionBook,
    snapshot: &IndicatorSnapshot,
    long_sig: ConditionSignal,
    short_sig: ConditionSignal,
    config: &StrategyConfig,
    fill: &Fill,
    trades: &mut Vec<Trade>,
) {
    let action = match &*book {
        PositionBook::Flat => None,
        PositionBook::LongOpen(p) | PositionBook::ShortOpen(p) => {
            signal_for(p.direction, long_sig, short_sig)
                .force_exit
                .then(|| HedgeAction::Open {
                    side: p.direction.opposite(),
                    size: p.size * config.hedge.size_multiplier,
                })
        }
        PositionBook::BothOpen { long, short } => {
            if long_sig.force_exit {
                Some(HedgeAction::Resize {
                    side: Direction::Short,
                    target: long.size / 2.0,
                })
            } else if short_sig.force_exit {
                Some(HedgeAction::Resize {
                    side: Direction::Long,
                    target: short.size / 2.0,
                })
            } else {
                None
            }
        }
    };

    match action {
        None => {}
        Some(HedgeAction::Open { side, size }) => {
            let leg = open_position(side, size, snapshot, &config.exit);
            match book.open(leg) {
                Ok(()) => tracing::debug!(index = fill.index, side = %side, size, "hedge opened"),
                Err(err) => tracing::warn!(index = fill.index, %err, "hedge rejected"),
            }
        }
        Some(HedgeAction::Resize { side, target }) => {
            if let Some(leg) = book.get_mut(side) {
                rebalance(leg, target, fill, trades);
            }
        }
    }
}

/// Move `leg` to `target` size. A reduction is realised as its own
/// `Rebalance` trade; an increase averages in at the close.
fn rebalance(leg: &mut Position, target: f64, fill: &Fill, trades: &mut Vec<Trade>) {
    let current = leg.size;
    tracing::debug!(index = fill.index, side = %leg.direction, from = current, to = target, "rebalance hedge leg");
    if target < current {
        trades.push(leg.close_partial(fill.index, fill.time, fill.close, current - target, ExitReason::Rebalance));
    } else if target > current {
        leg.average_in(fill.close, target - current);
    }
}

/// Step 4. Any leg below the minimum closes the whole book.
fn close_undersized(book: &mut PositionBook, hedge: &HedgeConfig, fill: &Fill, trades: &mut Vec<Trade>) {
    let undersized = book
        .positions()
        .iter()
        .any(|p| p.size < hedge.min_position_size);
    if undersized {
        for position in book.close_all() {
            trades.push(fill.close_position(position, fill.close, ExitReason::MinSize));
        }
    }
}
