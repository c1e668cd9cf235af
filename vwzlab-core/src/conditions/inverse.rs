//! Extreme band-width rule.

use super::{ema_aligned, ConditionSignal, EntryCondition};
use crate::config::StrategyConfig;
use crate::domain::Direction;
use crate::snapshot::IndicatorSnapshot;

/// Enters when |normalised band-width| exceeds `inverse_bandwidth_z` in
/// either direction, on the side the EMA pair points to.
#[derive(Debug, Clone, Copy)]
pub struct InverseBandwidth {
    direction: Direction,
}

impl InverseBandwidth {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl EntryCondition for InverseBandwidth {
    fn name(&self) -> &'static str {
        "inverse"
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn evaluate(&self, snapshot: &IndicatorSnapshot, config: &StrategyConfig) -> ConditionSignal {
        let extreme = snapshot.bandwidth_z.last().abs() > config.thresholds.inverse_bandwidth_z;
        ConditionSignal::entry_if(extreme && ema_aligned(snapshot, self.direction))
    }
}
