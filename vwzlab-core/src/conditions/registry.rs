//! Named condition lookup, one table per side.
//!
//! Built once at startup; the engine resolves the configured long and short
//! names before the first bar and fails with [`ConditionError`] on a miss.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    BandwidthRegime, ConditionError, DirectionalCross, EntryCondition, InverseBandwidth,
    MacdZeroCross, PatternAgreement, TrendContinuation, VolumeCluster,
};
use crate::domain::Direction;

pub struct ConditionRegistry {
    long: BTreeMap<&'static str, Arc<dyn EntryCondition>>,
    short: BTreeMap<&'static str, Arc<dyn EntryCondition>>,
}

impl ConditionRegistry {
    pub fn empty() -> Self {
        Self {
            long: BTreeMap::new(),
            short: BTreeMap::new(),
        }
    }

    /// Every built-in family, registered for both sides.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for direction in [Direction::Long, Direction::Short] {
            registry.register(Arc::new(TrendContinuation::new(direction)));
            registry.register(Arc::new(MacdZeroCross::new(direction)));
            registry.register(Arc::new(BandwidthRegime::new(direction)));
            registry.register(Arc::new(VolumeCluster::new(direction)));
            registry.register(Arc::new(PatternAgreement::new(direction)));
            registry.register(Arc::new(InverseBandwidth::new(direction)));
            registry.register(Arc::new(DirectionalCross::new(direction)));
        }
        registry
    }

    /// Register under the condition's own name and side, replacing any
    /// previous entry with that key.
    pub fn register(&mut self, condition: Arc<dyn EntryCondition>) {
        let table = match condition.direction() {
            Direction::Long => &mut self.long,
            Direction::Short => &mut self.short,
        };
        table.insert(condition.name(), condition);
    }

    /// Registered names for one side, sorted.
    pub fn names(&self, direction: Direction) -> Vec<&'static str> {
        self.table(direction).keys().copied().collect()
    }

    pub fn resolve(
        &self,
        direction: Direction,
        name: &str,
    ) -> Result<Arc<dyn EntryCondition>, ConditionError> {
        self.table(direction)
            .get(name)
            .cloned()
            .ok_or_else(|| ConditionError::UnknownCondition {
                side: direction,
                name: name.to_string(),
            })
    }

    fn table(&self, direction: Direction) -> &BTreeMap<&'static str, Arc<dyn EntryCondition>> {
        match direction {
            Direction::Long => &self.long,
            Direction::Short => &self.short,
        }
    }
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
