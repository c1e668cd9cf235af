//! Band-width regime rule.

use super::{directional_favors, ema_aligned, ConditionSignal, EntryCondition};
use crate::config::StrategyConfig;
use crate::domain::Direction;
use crate::indicators::RegimeStatus;
use crate::snapshot::IndicatorSnapshot;

/// Enters on a band-width expansion in the trade's direction, confirmed by
/// the directional pair and by short EMA and VWZ momentum over the last step.
///
/// Long: normalised band-width above `bandwidth_z_entry`, regime
/// `ExpandingBullish`, short EMA above long EMA and rising, VWZ rising,
/// +DI above -DI. Short mirrors every leg.
#[derive(Debug, Clone, Copy)]
pub struct BandwidthRegime {
    direction: Direction,
}

impl BandwidthRegime {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl EntryCondition for BandwidthRegime {
    fn name(&self) -> &'static str {
        "bbw"
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn evaluate(&self, snapshot: &IndicatorSnapshot, config: &StrategyConfig) -> ConditionSignal {
        let entry_z = config.thresholds.bandwidth_z_entry;
        let bbw_z = snapshot.bandwidth_z.last();
        let (ema, vwz) = (&snapshot.ema_short, &snapshot.vwz);

        let setup = match self.direction {
            Direction::Long => {
                bbw_z > entry_z
                    && snapshot.regime.status == RegimeStatus::ExpandingBullish
                    && ema.prev() < ema.last()
                    && vwz.prev() < vwz.last()
            }
            Direction::Short => {
                bbw_z < -entry_z
                    && snapshot.regime.status == RegimeStatus::ExpandingBearish
                    && ema.prev() > ema.last()
                    && vwz.prev() > vwz.last()
            }
        };
        ConditionSignal::entry_if(
            setup && ema_aligned(snapshot, self.direction) && directional_favors(snapshot, self.direction),
        )
    }
}
