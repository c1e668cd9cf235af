//! Deterministic synthetic bars for sweeps, tests and benchmarks.
//!
//! A seeded geometric random walk: the same `SyntheticSpec` always yields the same
//! series.

use chrono::{DateTime, Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use vwzlab_core::Bar;

/// 2024-01-01 00:00:00 UTC.
const DEFAULT_START_EPOCH: i64 = 1_704_067_200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSpec {
    pub seed: u64,
    pub bars: usize,
    pub start_price: f64,
    /// Maximum absolute per-bar return, as a fraction.
    pub volatility: f64,
    /// Small per-bar bias added to every return.
    pub drift: f64,
    pub interval_minutes: i64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            bars: 2_000,
            start_price: 100.0,
            volatility: 0.01,
            drift: 0.0,
            interval_minutes: 1,
        }
    }
}

pub fn generate_bars(spec: &SyntheticSpec) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let start: NaiveDateTime = DateTime::from_timestamp(DEFAULT_START_EPOCH, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default();
    let volatility = spec.volatility.abs().max(f64::EPSILON);

    let mut bars = Vec::with_capacity(spec.bars);
    let mut price = spec.start_price;
    for i in 0..spec.bars {
        let ret: f64 = rng.gen_range(-volatility..volatility) + spec.drift;
        let open = price;
        let close = (price * (1.0 + ret)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..volatility / 2.0));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..volatility / 2.0));
        let volume = rng.gen_range(500.0..5_000.0_f64).round();

        bars.push(Bar {
            timestamp: start + Duration::minutes(spec.interval_minutes * i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }
    bars
}
