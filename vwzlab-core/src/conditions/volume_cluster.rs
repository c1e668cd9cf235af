//! Volume-profile level rule with candle confirmation.

use super::{ConditionSignal, EntryCondition};
use crate::config::StrategyConfig;
use crate::domain::{Bar, Direction};
use crate::patterns::{
    is_bearish_engulfing, is_bearish_shooting_star, is_bullish_engulfing, is_bullish_hammer, is_doji,
};
use crate::profile::VolumeProfile;
use crate::snapshot::IndicatorSnapshot;

/// Trades reactions at volume-profile levels.
///
/// Long: the bar touches support (a lower level, or the POC while closing
/// above it) and prints a hammer or bullish engulfing. Otherwise a touch of
/// resistance (an upper level, or the POC while closing below it) or a
/// bearish pattern asks the long to exit. Short mirrors both rules. A doji
/// bar, or fewer than two bars of history, gives no opinion.
#[derive(Debug, Clone, Copy)]
pub struct VolumeCluster {
    direction: Direction,
}

impl VolumeCluster {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

/// The bar's [low, high] range intersects any level's proximity band.
fn touches_any(bar: &Bar, levels: &[f64], proximity_pct: f64) -> bool {
    levels.iter().any(|&level| {
        let band = level * proximity_pct / 100.0;
        bar.low.max(level - band) <= bar.high.min(level + band)
    })
}

fn near_support(bar: &Bar, profile: &VolumeProfile, proximity_pct: f64) -> bool {
    touches_any(bar, &profile.lower_levels, proximity_pct)
        || (bar.close > profile.poc && touches_any(bar, &[profile.poc], proximity_pct))
}

fn near_resistance(bar: &Bar, profile: &VolumeProfile, proximity_pct: f64) -> bool {
    touches_any(bar, &profile.upper_levels, proximity_pct)
        || (bar.close < profile.poc && touches_any(bar, &[profile.poc], proximity_pct))
}

fn bullish_reversal(prev: &Bar, curr: &Bar) -> bool {
    is_bullish_hammer(curr) || is_bullish_engulfing(prev, curr)
}

fn bearish_reversal(prev: &Bar, curr: &Bar) -> bool {
    is_bearish_shooting_star(curr) || is_bearish_engulfing(prev, curr)
}

impl EntryCondition for VolumeCluster {
    fn name(&self) -> &'static str {
        "volume_cluster"
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn evaluate(&self, snapshot: &IndicatorSnapshot, config: &StrategyConfig) -> ConditionSignal {
        let Some(prev) = snapshot.previous_bar.as_ref() else {
            return ConditionSignal::NONE;
        };
        let curr = &snapshot.bar;
        if is_doji(curr) {
            return ConditionSignal::NONE;
        }

        let profile = &snapshot.profile;
        let prox = config.volume_profile.proximity_pct;
        let (enter, exit) = match self.direction {
            Direction::Long => (
                near_support(curr, profile, prox) && bullish_reversal(prev, curr),
                near_resistance(curr, profile, prox) || bearish_reversal(prev, curr),
            ),
            Direction::Short => (
                near_resistance(curr, profile, prox) && bearish_reversal(prev, curr),
                near_support(curr, profile, prox) || bullish_reversal(prev, curr),
            ),
        };

        if enter {
            ConditionSignal::enter()
        } else if exit {
            ConditionSignal::exit()
        } else {
            ConditionSignal::NONE
        }
    }
}
