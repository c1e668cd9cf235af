//! Directional movement family (Wilder).
//!
//! 1. +DM / -DM from consecutive highs and lows
//! 2. Wilder-smooth +DM, -DM and TR over `period`
//! 3. +DI = 100 * sm(+DM) / sm(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! DI and DX are defined from index `period`, ADX from `2 * period - 1`.
//! A zero smoothed range leaves DI undefined.

use super::atr::{true_range, wilder_smooth};
use super::Indicator;
use crate::domain::Bar;

/// All four directional series, aligned with the bars.
#[derive(Debug, Clone, Default)]
pub struct DirectionalSeries {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
}

pub fn directional_movement(bars: &[Bar], period: usize) -> DirectionalSeries {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];
    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up.is_nan() || down.is_nan() {
            continue;
        }
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let smooth_tr = wilder_smooth(&true_range(bars), period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        let tr = smooth_tr[i];
        if tr.is_nan() || tr <= 0.0 || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() {
            continue;
        }
        let p = 100.0 * smooth_plus[i] / tr;
        let m = 100.0 * smooth_minus[i] / tr;
        plus_di[i] = p;
        minus_di[i] = m;
        dx[i] = if p + m == 0.0 {
            0.0
        } else {
            100.0 * (p - m).abs() / (p + m)
        };
    }

    let adx = wilder_smooth(&dx, period);
    DirectionalSeries {
        plus_di,
        minus_di,
        dx,
        adx,
    }
}

/// ADX as a single-series indicator.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        (2 * self.period).saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        directional_movement(bars, self.period).adx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlcv_bars;

    fn trending(n: usize, step: f64) -> Vec<Bar> {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * step;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0, 1000.0)
            })
            .collect();
        make_ohlcv_bars(&data)
    }

    #[test]
    fn series_are_aligned_and_bounded() {
        let bars = trending(40, 1.5);
        let d = directional_movement(&bars, 5);
        for s in [&d.plus_di, &d.minus_di, &d.dx, &d.adx] {
            assert_eq!(s.len(), bars.len());
            assert!(s.iter().filter(|v| !v.is_nan()).all(|&v| (0.0..=100.0).contains(&v)));
        }
    }

    #[test]
    fn warmup_boundaries() {
        let d = directional_movement(&trending(30, 2.0), 5);
        assert!(d.plus_di[4].is_nan());
        assert!(!d.plus_di[5].is_nan());
        assert!(d.adx[8].is_nan());
        assert!(!d.adx[9].is_nan());
        assert_eq!(Adx::new(5).lookback(), 9);
    }

    #[test]
    fn uptrend_favours_plus_di() {
        let d = directional_movement(&trending(30, 5.0), 5);
        let last = 29;
        assert!(d.plus_di[last] > d.minus_di[last]);
        assert!(d.adx[last] > 50.0);
    }

    #[test]
    fn flat_bars_leave_di_undefined() {
        let bars = make_ohlcv_bars(&[(10.0, 10.0, 10.0, 10.0, 1.0); 20]);
        let d = directional_movement(&bars, 4);
        assert!(d.plus_di.iter().all(|v| v.is_nan()));
        assert!(d.adx.iter().all(|v| v.is_nan()));
    }
}
