//! Directional indicator crossover.

use super::{ConditionSignal, EntryCondition};
use crate::config::StrategyConfig;
use crate::domain::Direction;
use crate::snapshot::IndicatorSnapshot;

/// Enters when the trade's DI line crosses above the other one and asks for
/// an exit on the opposite crossover.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalCross {
    direction: Direction,
}

impl DirectionalCross {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl EntryCondition for DirectionalCross {
    fn name(&self) -> &'static str {
        "dmi"
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn evaluate(&self, snapshot: &IndicatorSnapshot, _config: &StrategyConfig) -> ConditionSignal {
        let (ours, theirs) = match self.direction {
            Direction::Long => (&snapshot.plus_di, &snapshot.minus_di),
            Direction::Short => (&snapshot.minus_di, &snapshot.plus_di),
        };
        let (ours_prev, ours_now) = (ours.prev(), ours.last());
        let (theirs_prev, theirs_now) = (theirs.prev(), theirs.last());

        if ours_prev <= theirs_prev && ours_now > theirs_now {
            ConditionSignal::enter()
        } else if ours_prev >= theirs_prev && ours_now < theirs_now {
            ConditionSignal::exit()
        } else {
            ConditionSignal::NONE
        }
    }
}
