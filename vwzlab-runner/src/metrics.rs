//! Trade statistics as pure functions over a closed-trade ledger.
//!
//! All figures are in price units of realized P&L; the engine tracks no
//! equity or capital. Trades are read in ledger (close) order.

use serde::{Deserialize, Serialize};
use vwzlab_core::Trade;

/// Profit factor reported when there are profits and no losses.
pub const PROFIT_FACTOR_SENTINEL: f64 = 999.0;

/// Aggregate statistics for one run's ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStatistics {
    pub trade_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    /// Percentage of winning trades.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub gross_profit: f64,
    /// Absolute sum of non-positive P&L.
    pub gross_loss: f64,
    pub profit_factor: f64,
    /// Largest peak-to-trough drop of cumulative realized P&L.
    pub max_drawdown: f64,
    pub avg_pnl: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl TradeStatistics {
    pub fn compute(trades: &[Trade]) -> Self {
        let win_count = trades.iter().filter(|t| t.is_winner()).count();
        Self {
            trade_count: trades.len(),
            win_count,
            loss_count: trades.len() - win_count,
            win_rate: win_rate(trades),
            total_pnl: total_pnl(trades),
            gross_profit: gross_profit(trades),
            gross_loss: gross_loss(trades),
            profit_factor: profit_factor(trades),
            max_drawdown: max_drawdown(trades),
            avg_pnl: avg_pnl(trades),
            max_consecutive_wins: max_consecutive(trades, true),
            max_consecutive_losses: max_consecutive(trades, false),
        }
    }

    /// Ranking key for sweeps.
    pub fn fitness(&self) -> f64 {
        self.total_pnl
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn total_pnl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

/// Winners as a percentage of all trades, 0 without trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

pub fn gross_profit(trades: &[Trade]) -> f64 {
    trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum()
}

pub fn gross_loss(trades: &[Trade]) -> f64 {
    trades.iter().filter(|t| t.pnl <= 0.0).map(|t| -t.pnl).sum()
}

/// Gross profit over gross loss.
///
/// [`PROFIT_FACTOR_SENTINEL`] when nothing was lost but something was won,
/// 0 when neither.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let profit = gross_profit(trades);
    let loss = gross_loss(trades);
    if loss > 0.0 {
        profit / loss
    } else if profit > 0.0 {
        PROFIT_FACTOR_SENTINEL
    } else {
        0.0
    }
}

/// Running peak of cumulative P&L starts at zero, so a losing first trade
/// already counts as drawdown.
pub fn max_drawdown(trades: &[Trade]) -> f64 {
    let mut running = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for trade in trades {
        running += trade.pnl;
        peak = peak.max(running);
        max_dd = max_dd.max(peak - running);
    }
    max_dd
}

pub fn avg_pnl(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    total_pnl(trades) / trades.len() as f64
}

fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if trade.is_winner() == winners {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
