//! Closed trades and exit reasons.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::position::{Direction, Position};
use crate::snapshot::IndicatorSnapshot;

/// Why a position (or part of it) was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Signal,
    Combined,
    MinSize,
    Rebalance,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "StopLoss",
            ExitReason::TakeProfit => "TakeProfit",
            ExitReason::Signal => "Signal",
            ExitReason::Combined => "Combined",
            ExitReason::MinSize => "MinSize",
            ExitReason::Rebalance => "Rebalance",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed round trip. Created when a position closes, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub direction: Direction,

    // ── Entry ──
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Size and P&L ──
    pub size: f64,
    pub pnl: f64,
    /// P&L as a percentage of entry notional.
    pub pnl_percent: f64,

    pub entry_snapshot: Box<IndicatorSnapshot>,
}

impl Trade {
    pub(crate) fn from_parts(
        position: Position,
        exit_index: usize,
        exit_time: NaiveDateTime,
        exit_price: f64,
        pnl: f64,
        exit_reason: ExitReason,
    ) -> Self {
        let notional = position.entry_price * position.size;
        let pnl_percent = if notional == 0.0 {
            0.0
        } else {
            pnl / notional * 100.0
        };
        Self {
            direction: position.direction,
            entry_index: position.entry_index,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_index,
            exit_time,
            exit_price,
            exit_reason,
            size: position.size,
            pnl,
            pnl_percent,
            entry_snapshot: position.entry_snapshot,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index.saturating_sub(self.entry_index)
    }
}
