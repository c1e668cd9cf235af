//! Entry/exit conditions: named, swappable predicates over a snapshot.
//!
//! A condition belongs to one side of the book and maps an
//! [`IndicatorSnapshot`] plus the strategy configuration to a
//! [`ConditionSignal`]. Both flags false means "no opinion". A force-exit
//! from the condition of side S asks the engine to leave the S position.
//!
//! Conditions never hold mutable state and never read configuration from
//! anywhere but their `config` argument.

pub mod agreement;
pub mod dmi;
pub mod inverse;
pub mod macd;
pub mod regime;
pub mod registry;
pub mod trend;
pub mod volume_cluster;

pub use agreement::PatternAgreement;
pub use dmi::DirectionalCross;
pub use inverse::InverseBandwidth;
pub use macd::MacdZeroCross;
pub use regime::BandwidthRegime;
pub use registry::ConditionRegistry;
pub use trend::TrendContinuation;
pub use volume_cluster::VolumeCluster;

use serde::Serialize;

use crate::config::StrategyConfig;
use crate::domain::Direction;
use crate::snapshot::IndicatorSnapshot;

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConditionError {
    #[error("no {side} entry condition named '{name}'")]
    UnknownCondition { side: Direction, name: String },
}

// ─── Contract ────────────────────────────────────────────────────────

/// Outcome of one condition evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConditionSignal {
    pub enter: bool,
    pub force_exit: bool,
}

impl ConditionSignal {
    pub const NONE: Self = Self {
        enter: false,
        force_exit: false,
    };

    pub fn enter() -> Self {
        Self {
            enter: true,
            force_exit: false,
        }
    }

    pub fn exit() -> Self {
        Self {
            enter: false,
            force_exit: true,
        }
    }

    /// Entry-only signal.
    pub fn entry_if(cond: bool) -> Self {
        Self {
            enter: cond,
            force_exit: false,
        }
    }

    pub fn is_none(&self) -> bool {
        !self.enter && !self.force_exit
    }
}

/// A pure entry/exit rule for one side of the book.
pub trait EntryCondition: Send + Sync {
    /// Registry key (e.g. "macd").
    fn name(&self) -> &'static str;

    /// Side this condition trades.
    fn direction(&self) -> Direction;

    fn evaluate(&self, snapshot: &IndicatorSnapshot, config: &StrategyConfig) -> ConditionSignal;
}

/// Short EMA above (long side) or below (short side) the long EMA.
/// Undefined values never satisfy the relation.
pub(crate) fn ema_aligned(snapshot: &IndicatorSnapshot, direction: Direction) -> bool {
    let (short, long) = (snapshot.ema_short.last(), snapshot.ema_long.last());
    match direction {
        Direction::Long => short > long,
        Direction::Short => short < long,
    }
}

/// +DI above -DI for longs, below for shorts.
pub(crate) fn directional_favors(snapshot: &IndicatorSnapshot, direction: Direction) -> bool {
    let (plus, minus) = (snapshot.plus_di.last(), snapshot.minus_di.last());
    match direction {
        Direction::Long => plus > minus,
        Direction::Short => plus < minus,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{snapshot, w};
    use super::*;

    #[test]
    fn undefined_ema_never_aligns() {
        let mut s = snapshot();
        s.ema_short = w(&[f64::NAN]);
        s.ema_long = w(&[100.0]);
        assert!(!ema_aligned(&s, Direction::Long));
        assert!(!ema_aligned(&s, Direction::Short));
    }

    #[test]
    fn directional_pair_sides() {
        let mut s = snapshot();
        s.plus_di = w(&[30.0]);
        s.minus_di = w(&[10.0]);
        assert!(directional_favors(&s, Direction::Long));
        assert!(!directional_favors(&s, Direction::Short));
    }

    #[test]
    fn signal_constructors() {
        assert!(ConditionSignal::NONE.is_none());
        assert!(ConditionSignal::enter().enter);
        assert!(ConditionSignal::exit().force_exit);
        assert_eq!(ConditionSignal::entry_if(false), ConditionSignal::NONE);
    }
}
