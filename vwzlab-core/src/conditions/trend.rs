//! Default rule: EMA trend with a confirming Z-score.

use super::{ema_aligned, ConditionSignal, EntryCondition};
use crate::config::StrategyConfig;
use crate::domain::Direction;
use crate::snapshot::IndicatorSnapshot;

/// Enters with the trend: short EMA on the trade's side of the long EMA and
/// price deviating the same way (Z-score above zero for longs, below for
/// shorts). Never asks for an exit.
#[derive(Debug, Clone, Copy)]
pub struct TrendContinuation {
    direction: Direction,
}

impl TrendContinuation {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl EntryCondition for TrendContinuation {
    fn name(&self) -> &'static str {
        "default"
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn evaluate(&self, snapshot: &IndicatorSnapshot, _config: &StrategyConfig) -> ConditionSignal {
        let z = snapshot.zscore.last();
        let deviates = match self.direction {
            Direction::Long => z > 0.0,
            Direction::Short => z < 0.0,
        };
        ConditionSignal::entry_if(ema_aligned(snapshot, self.direction) && deviates)
    }
}
