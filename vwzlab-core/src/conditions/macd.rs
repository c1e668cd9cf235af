//! MACD histogram zero-line crossing.

use super::{ConditionSignal, EntryCondition};
use crate::config::StrategyConfig;
use crate::domain::Direction;
use crate::snapshot::IndicatorSnapshot;

/// Long when the histogram crosses from negative to positive, short on the
/// reverse crossing. Needs two defined histogram samples.
#[derive(Debug, Clone, Copy)]
pub struct MacdZeroCross {
    direction: Direction,
}

impl MacdZeroCross {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl EntryCondition for MacdZeroCross {
    fn name(&self) -> &'static str {
        "macd"
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn evaluate(&self, snapshot: &IndicatorSnapshot, _config: &StrategyConfig) -> ConditionSignal {
        let (prev, curr) = (snapshot.macd_hist.prev(), snapshot.macd_hist.last());
        let crossed = match self.direction {
            Direction::Long => prev < 0.0 && curr > 0.0,
            Direction::Short => prev > 0.0 && curr < 0.0,
        };
        ConditionSignal::entry_if(crossed)
    }
}
