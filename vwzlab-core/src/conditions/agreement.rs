//! Multi-indicator pattern agreement.

use super::{ConditionSignal, EntryCondition};
use crate::config::StrategyConfig;
use crate::domain::Direction;
use crate::patterns::Trend;
use crate::snapshot::IndicatorSnapshot;

/// Enters only when every reading agrees over the last three samples.
///
/// Z-score, VWZ, band-width and ADX must all be strengthening (sign-aware
/// [`Trend::Increasing`]), with Z-score and VWZ on the trade's side of zero.
/// The DI pair must diverge the trade's way. Any one-step Z-score or VWZ move
/// above its spike threshold, or band-width growth above
/// `bandwidth_spike_ratio` in one step, vetoes the entry.
#[derive(Debug, Clone, Copy)]
pub struct PatternAgreement {
    direction: Direction,
}

impl PatternAgreement {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl EntryCondition for PatternAgreement {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn evaluate(&self, snapshot: &IndicatorSnapshot, config: &StrategyConfig) -> ConditionSignal {
        let th = &config.thresholds;
        let s = snapshot;

        let strengthening = [&s.zscore, &s.vwz, &s.bandwidth, &s.adx]
            .iter()
            .all(|w| w.trend() == Trend::Increasing);
        if !strengthening {
            return ConditionSignal::NONE;
        }

        let sign = self.direction.sign();
        let on_side = s.zscore.last() * sign > 0.0 && s.vwz.last() * sign > 0.0;
        let (ours, theirs) = match self.direction {
            Direction::Long => (&s.plus_di, &s.minus_di),
            Direction::Short => (&s.minus_di, &s.plus_di),
        };
        let diverging = ours.trend() == Trend::Increasing && theirs.trend() == Trend::Decreasing;

        let spiked = s.zscore.max_abs_step() > th.zscore_spike
            || s.vwz.max_abs_step() > th.vwz_spike
            || s.bandwidth.max_step_ratio() > th.bandwidth_spike_ratio;

        ConditionSignal::entry_if(on_side && diverging && !spiked)
    }
}
