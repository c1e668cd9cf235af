//! VWZLab Core — indicator pipeline, volume profile, candle patterns, entry
//! conditions and the hedge-aware backtest state machine.
//!
//! Data flows one way:
//! - Bars feed the indicator pipeline, precomputed once per run
//! - The snapshot builder assembles the last three values of every series
//!   with the regime, volume profile and recent bars at each index
//! - Named long/short conditions map a snapshot to enter / force-exit flags
//! - The engine replays the bars through Flat / LongOpen / ShortOpen /
//!   BothOpen and emits a trade ledger
//!
//! Each run is a pure function of the bar series and a [`config::StrategyConfig`].
//! No I/O happens in this crate.

pub mod conditions;
pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod patterns;
pub mod profile;
pub mod snapshot;

pub use config::StrategyConfig;
pub use domain::{Bar, Direction, ExitReason, Position, Trade};
pub use engine::{run_backtest, BacktestResult, Backtester, EngineError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a parallel sweep moves across threads
    /// is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        // Pipeline types
        require_send::<indicators::IndicatorSet>();
        require_sync::<indicators::IndicatorSet>();
        require_send::<snapshot::IndicatorSnapshot>();
        require_sync::<snapshot::IndicatorSnapshot>();
        require_send::<profile::VolumeProfile>();
        require_sync::<profile::VolumeProfile>();

        // Conditions
        require_send::<conditions::ConditionRegistry>();
        require_sync::<conditions::ConditionRegistry>();

        // Engine types
        require_send::<config::StrategyConfig>();
        require_sync::<config::StrategyConfig>();
        require_send::<engine::Backtester>();
        require_sync::<engine::Backtester>();
        require_send::<engine::BacktestResult>();
        require_sync::<engine::BacktestResult>();
        require_send::<engine::PositionBook>();
        require_sync::<engine::PositionBook>();
    }

    /// Conditions see a snapshot and the static config, never the book.
    #[test]
    fn entry_condition_has_no_position_parameter() {
        fn _check_trait_object_builds(
            condition: &dyn conditions::EntryCondition,
            snapshot: &snapshot::IndicatorSnapshot,
            config: &config::StrategyConfig,
        ) -> conditions::ConditionSignal {
            condition.evaluate(snapshot, config)
        }
    }
}
