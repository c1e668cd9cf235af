//! Open positions and their accounting.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::bar::Bar;
use super::trade::{ExitReason, Trade};
use crate::snapshot::IndicatorSnapshot;

/// Trade direction. Also names the long/short side of the condition registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }

    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open position, owned and mutated only by the engine.
///
/// Stop-loss and take-profit levels are fixed at entry. A rate of zero
/// disables the corresponding level.
#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub size: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    /// Exit latched by the directional-hold policy, released on a later bar.
    pub deferred_exit: Option<ExitReason>,
    pub entry_snapshot: Box<IndicatorSnapshot>,
}

impl Position {
    /// Open a position at `price` and derive its protective levels.
    pub fn open(
        direction: Direction,
        price: f64,
        size: f64,
        take_profit_rate: f64,
        stop_loss_rate: f64,
        snapshot: IndicatorSnapshot,
    ) -> Self {
        let sign = direction.sign();
        let level = |rate: f64, toward: f64| (rate > 0.0).then(|| price * (1.0 + toward * rate));
        Self {
            direction,
            entry_index: snapshot.index,
            entry_time: snapshot.bar.timestamp,
            entry_price: price,
            size,
            take_profit: level(take_profit_rate, sign),
            stop_loss: level(stop_loss_rate, -sign),
            deferred_exit: None,
            entry_snapshot: Box::new(snapshot),
        }
    }

    /// P&L of `size` units closed at `price`.
    pub fn pnl_for(&self, price: f64, size: f64) -> f64 {
        self.direction.sign() * (price - self.entry_price) * size
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.pnl_for(price, self.size)
    }

    /// The bar's range reached the stop level.
    pub fn stop_hit(&self, bar: &Bar) -> bool {
        match (self.stop_loss, self.direction) {
            (Some(stop), Direction::Long) => bar.low <= stop,
            (Some(stop), Direction::Short) => bar.high >= stop,
            (None, _) => false,
        }
    }

    /// The bar's range reached the profit target.
    pub fn target_hit(&self, bar: &Bar) -> bool {
        match (self.take_profit, self.direction) {
            (Some(target), Direction::Long) => bar.high >= target,
            (Some(target), Direction::Short) => bar.low <= target,
            (None, _) => false,
        }
    }

    /// Close `size` units at `price`, returning the realized P&L.
    ///
    /// The closed quantity is capped at the open size.
    pub fn partial_close(&mut self, price: f64, size: f64) -> f64 {
        let closed = size.clamp(0.0, self.size);
        self.size -= closed;
        self.pnl_for(price, closed)
    }

    /// Close `size` units at `price` as their own trade record, keeping the
    /// remainder open.
    pub fn close_partial(
        &mut self,
        exit_index: usize,
        exit_time: NaiveDateTime,
        price: f64,
        size: f64,
        reason: ExitReason,
    ) -> Trade {
        let mut part = self.clone();
        let before = self.size;
        let pnl = self.partial_close(price, size);
        part.size = before - self.size;
        Trade::from_parts(part, exit_index, exit_time, price, pnl, reason)
    }

    /// Add `size` units at `price`, moving the entry to the size-weighted average.
    pub fn average_in(&mut self, price: f64, size: f64) {
        if size <= 0.0 {
            return;
        }
        let total = self.size + size;
        self.entry_price = (self.entry_price * self.size + price * size) / total;
        self.size = total;
    }

    /// Convert into an immutable trade record.
    pub fn close(self, exit_index: usize, exit_time: NaiveDateTime, price: f64, reason: ExitReason) -> Trade {
        let pnl = self.unrealized_pnl(price);
        Trade::from_parts(self, exit_index, exit_time, price, pnl, reason)
    }
}
