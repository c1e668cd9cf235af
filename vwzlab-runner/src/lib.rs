//! VWZLab Runner — run orchestration around `vwzlab-core`.
//!
//! This crate provides:
//! - TOML/JSON run configs with content-addressed run ids
//! - CSV bar loading and a seeded synthetic bar generator
//! - Trade statistics (win rate, profit factor, drawdown, streaks)
//! - CSV / JSONL / JSON exports
//! - Parallel parameter sweeps

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;
pub mod synthetic;

pub use config::{strategy_run_id, DataConfig, OutputConfig, RunConfig, RunConfigError, RunId};
pub use data_loader::{load_bars_csv, parse_timestamp, read_bars, LoadError, LoadOptions};
pub use export::ExportError;
pub use metrics::TradeStatistics;
pub use runner::{load_bars, run_from_config, run_on_bars, RunError, RunReport};
pub use sweep::{ParamGrid, ParamSweep, SweepResults};
pub use synthetic::{generate_bars, SyntheticSpec};
