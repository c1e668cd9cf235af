//! Candle pattern recognizer and three-sample shape analysis.
//!
//! Stateless classifiers on one or two bars, using body = |close - open| and
//! the upper/lower wicks. A doji short-circuits detection for its bar.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Body below this fraction of the range is a doji.
const DOJI_BODY_RATIO: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandlePattern {
    Doji,
    BullishHammer,
    BullishEngulfing,
    BearishShootingStar,
    BearishEngulfing,
}

impl CandlePattern {
    pub fn is_bullish(self) -> bool {
        matches!(self, CandlePattern::BullishHammer | CandlePattern::BullishEngulfing)
    }

    pub fn is_bearish(self) -> bool {
        matches!(
            self,
            CandlePattern::BearishShootingStar | CandlePattern::BearishEngulfing
        )
    }
}

/// Body under 10% of range; a zero-range bar is a doji.
pub fn is_doji(bar: &Bar) -> bool {
    let range = bar.range();
    range == 0.0 || bar.body() < DOJI_BODY_RATIO * range
}

/// Long lower wick, small upper wick. Never true for a zero body.
pub fn is_bullish_hammer(bar: &Bar) -> bool {
    let body = bar.body();
    body > 0.0 && bar.lower_wick() > 2.0 * body && bar.upper_wick() < 0.5 * body
}

/// Long upper wick, small lower wick. Never true for a zero body.
pub fn is_bearish_shooting_star(bar: &Bar) -> bool {
    let body = bar.body();
    body > 0.0 && bar.upper_wick() > 2.0 * body && bar.lower_wick() < 0.5 * body
}

pub fn is_bullish_engulfing(prev: &Bar, curr: &Bar) -> bool {
    prev.is_bearish() && curr.is_bullish() && curr.close > prev.open
}

pub fn is_bearish_engulfing(prev: &Bar, curr: &Bar) -> bool {
    prev.is_bullish() && curr.is_bearish() && curr.close < prev.open
}

/// Classify `curr`, with `prev` enabling the two-bar patterns.
///
/// Precedence: doji, hammer, bullish engulfing, shooting star, bearish engulfing.
pub fn detect(prev: Option<&Bar>, curr: &Bar) -> Option<CandlePattern> {
    if is_doji(curr) {
        return Some(CandlePattern::Doji);
    }
    if is_bullish_hammer(curr) {
        return Some(CandlePattern::BullishHammer);
    }
    if prev.is_some_and(|p| is_bullish_engulfing(p, curr)) {
        return Some(CandlePattern::BullishEngulfing);
    }
    if is_bearish_shooting_star(curr) {
        return Some(CandlePattern::BearishShootingStar);
    }
    if prev.is_some_and(|p| is_bearish_engulfing(p, curr)) {
        return Some(CandlePattern::BearishEngulfing);
    }
    None
}

// ─── Three-sample shape ──────────────────────────────────────────────

/// Shape of three consecutive samples, oldest first.
///
/// Sign-aware: a non-positive series moving further below zero is
/// `Increasing` (the reading is strengthening), one moving back toward zero
/// is `Decreasing`. Mixed signs, flat steps and undefined samples are `Mixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    Mixed,
}

pub fn trend_of(samples: &[f64]) -> Trend {
    let [a, b, c] = match samples {
        [a, b, c] => [*a, *b, *c],
        _ => return Trend::Mixed,
    };
    let rising = a < b && b < c;
    let falling = a > b && b > c;
    if a >= 0.0 && b >= 0.0 && c >= 0.0 {
        if rising {
            return Trend::Increasing;
        }
        if falling {
            return Trend::Decreasing;
        }
    } else if a <= 0.0 && b <= 0.0 && c <= 0.0 {
        if falling {
            return Trend::Increasing;
        }
        if rising {
            return Trend::Decreasing;
        }
    }
    Trend::Mixed
}
