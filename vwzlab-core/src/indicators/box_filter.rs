//! Range/box filter.
//!
//! range[t] = (highest high - lowest low) / lowest low over the trailing
//! `period` bars. A market is "ranging" when that fraction, in percent, is
//! below the configured minimum.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct BoxRange {
    period: usize,
    name: String,
}

impl BoxRange {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("box_range_{period}"),
        }
    }
}

impl Indicator for BoxRange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if self.period == 0 || n < self.period {
            return result;
        }
        for i in self.period - 1..n {
            let window = &bars[i + 1 - self.period..=i];
            let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            if lowest > 0.0 && highest.is_finite() {
                result[i] = (highest - lowest) / lowest;
            }
        }
        result
    }
}

/// True when `range` is defined and below `min_range_pct` percent.
pub fn is_ranging(range: f64, min_range_pct: f64) -> bool {
    range * 100.0 < min_range_pct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlcv_bars, DEFAULT_EPSILON};

    #[test]
    fn range_over_window() {
        let bars = make_ohlcv_bars(&[
            (100.0, 101.0, 99.0, 100.0, 1.0),
            (100.0, 104.0, 100.0, 103.0, 1.0),
            (103.0, 103.5, 98.0, 99.0, 1.0),
        ]);
        let r = BoxRange::new(3).compute(&bars);
        assert!(r[1].is_nan());
        assert_approx(r[2], 6.0 / 98.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ranging_threshold_in_percent() {
        assert!(is_ranging(0.004, 0.5));
        assert!(!is_ranging(0.006, 0.5));
        assert!(!is_ranging(f64::NAN, 0.5));
    }
}
