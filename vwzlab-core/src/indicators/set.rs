//! Precomputed indicator series for one run.
//!
//! Built once before the replay loop and read-only afterwards; the snapshot
//! builder slices it per index.

use super::adx::{directional_movement, Adx};
use super::bollinger::{bands, bandwidth, normalize_trailing, NormalizedBandwidth};
use super::box_filter::BoxRange;
use super::ema::{ema_of_series, Ema};
use super::macd::{macd, MacdHistogram};
use super::vwz::{adaptive_vwz, AdaptiveVwz, VolumeWeightedZScore};
use super::zscore::ZScore;
use super::{closes, Indicator};
use crate::config::IndicatorConfig;
use crate::domain::Bar;

/// Every series the snapshot builder reads, aligned 1:1 with the bars.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    pub ema_short: Vec<f64>,
    pub ema_long: Vec<f64>,
    pub zscore: Vec<f64>,
    pub vwz: Vec<f64>,
    pub adaptive_vwz: Vec<f64>,
    pub bandwidth: Vec<f64>,
    pub bandwidth_z: Vec<f64>,
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_hist: Vec<f64>,
    pub box_range: Vec<f64>,
}

impl IndicatorSet {
    pub fn compute(bars: &[Bar], config: &IndicatorConfig) -> Self {
        let closes = closes(bars);
        let directional = directional_movement(bars, config.adx_period);
        let bw = bandwidth(&bands(&closes, config.bbw_period, config.bbw_multiplier));
        let m = macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);

        Self {
            ema_short: ema_of_series(&closes, config.ema_short_period),
            ema_long: ema_of_series(&closes, config.ema_long_period),
            zscore: ZScore::new(config.zscore_period).compute(bars),
            vwz: VolumeWeightedZScore::new(config.vwz_period, config.vwz_min_stddev).compute(bars),
            adaptive_vwz: adaptive_vwz(bars, &directional.adx, &config.adaptive_schedule()),
            bandwidth_z: normalize_trailing(&bw, config.bbw_normalize_window),
            bandwidth: bw,
            adx: directional.adx,
            plus_di: directional.plus_di,
            minus_di: directional.minus_di,
            dx: directional.dx,
            macd: m.macd,
            macd_signal: m.signal,
            macd_hist: m.histogram,
            box_range: BoxRange::new(config.box_period).compute(bars),
        }
    }

    pub fn len(&self) -> usize {
        self.ema_short.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_short.is_empty()
    }
}

/// The single-series view of every indicator the engine waits on.
pub fn indicator_suite(config: &IndicatorConfig) -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(Ema::new(config.ema_short_period)),
        Box::new(Ema::new(config.ema_long_period)),
        Box::new(ZScore::new(config.zscore_period)),
        Box::new(VolumeWeightedZScore::new(config.vwz_period, config.vwz_min_stddev)),
        Box::new(AdaptiveVwz::new(
            config.adx_period,
            config.adaptive_min_strength,
            config.adaptive_max_strength,
        )),
        Box::new(Adx::new(config.adx_period)),
        Box::new(NormalizedBandwidth::new(
            config.bbw_period,
            config.bbw_multiplier,
            config.bbw_normalize_window,
        )),
        Box::new(MacdHistogram::new(config.macd_fast, config.macd_slow, config.macd_signal)),
        Box::new(BoxRange::new(config.box_period)),
    ]
}

/// First index at which every indicator, and the regime classifier, can be defined.
pub fn compute_warmup(config: &IndicatorConfig) -> usize {
    let indicators = indicator_suite(config);
    let longest = indicators.iter().map(|ind| ind.lookback()).max().unwrap_or(0);
    let regime = (2 * config.bbw_period).saturating_sub(1);
    longest.max(regime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn default_warmup_is_normalized_bandwidth() {
        // bbw 20 + window 50 - 1 dominates ema 50, macd 33, adx 27
        assert_eq!(compute_warmup(&IndicatorConfig::default()), 69);
    }

    #[test]
    fn every_series_is_aligned() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.1).sin() * 5.0).collect();
        let bars = make_bars(&closes);
        let set = IndicatorSet::compute(&bars, &IndicatorConfig::default());
        for series in [
            &set.ema_short,
            &set.ema_long,
            &set.zscore,
            &set.vwz,
            &set.adaptive_vwz,
            &set.bandwidth,
            &set.bandwidth_z,
            &set.adx,
            &set.plus_di,
            &set.minus_di,
            &set.dx,
            &set.macd,
            &set.macd_signal,
            &set.macd_hist,
            &set.box_range,
        ] {
            assert_eq!(series.len(), bars.len());
        }
        assert!(!set.bandwidth_z[69].is_nan());
        assert!(set.bandwidth_z[68].is_nan());
    }

    #[test]
    fn empty_input_gives_empty_set() {
        let set = IndicatorSet::compute(&[], &IndicatorConfig::default());
        assert!(set.is_empty());
    }
}
