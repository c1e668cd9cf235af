//! Strategy configuration and validation.
//!
//! `StrategyConfig` is passed explicitly into the engine and into every
//! condition call; nothing reads configuration from ambient state. Every
//! section defaults sensibly so a config file only names what it changes.

use serde::{Deserialize, Serialize};

use crate::indicators::{AdaptiveSmoothing, RegimeParams};

// ─── Error type ──────────────────────────────────────────────────────

/// Invalid configuration, reported before any simulation step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a positive period, got {value}")]
    NonPositivePeriod { field: &'static str, value: usize },
    #[error("{field} is invalid: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("{field} is out of range: {reason}")]
    InvalidRange { field: &'static str, reason: String },
}

// ─── Sections ────────────────────────────────────────────────────────

/// Full strategy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub indicators: IndicatorConfig,
    pub entry: EntryConfig,
    pub exit: ExitConfig,
    pub hedge: HedgeConfig,
    pub volume_profile: VolumeProfileConfig,
    pub thresholds: ConditionThresholds,
}

/// Lookback periods and indicator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub zscore_period: usize,
    pub vwz_period: usize,
    /// Weighted stddev floor below which VWZ is undefined.
    pub vwz_min_stddev: f64,
    pub ema_short_period: usize,
    pub ema_long_period: usize,
    pub adx_period: usize,
    /// ADX clamp range of the adaptive VWZ schedule.
    pub adaptive_min_strength: f64,
    pub adaptive_max_strength: f64,
    pub bbw_period: usize,
    pub bbw_multiplier: f64,
    pub bbw_normalize_window: usize,
    /// Minimum |normalised band-width| for a non-neutral regime; 0 disables.
    pub bbw_threshold: f64,
    /// Trailing bars the regime classifier sees at each index.
    pub regime_window: usize,
    pub atr_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub box_period: usize,
    /// Box range below this percentage flags "ranging".
    pub box_min_range_pct: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            zscore_period: 20,
            vwz_period: 20,
            vwz_min_stddev: 0.0,
            ema_short_period: 20,
            ema_long_period: 50,
            adx_period: 14,
            adaptive_min_strength: 20.0,
            adaptive_max_strength: 50.0,
            bbw_period: 20,
            bbw_multiplier: 2.0,
            bbw_normalize_window: 50,
            bbw_threshold: 0.0,
            regime_window: 200,
            atr_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            box_period: 20,
            box_min_range_pct: 0.5,
        }
    }
}

impl IndicatorConfig {
    pub fn regime_params(&self) -> RegimeParams {
        RegimeParams {
            period: self.bbw_period,
            multiplier: self.bbw_multiplier,
            threshold: self.bbw_threshold,
            atr_period: self.atr_period,
        }
    }

    pub fn adaptive_schedule(&self) -> AdaptiveSmoothing {
        AdaptiveSmoothing::for_adx_period(
            self.adx_period,
            self.adaptive_min_strength,
            self.adaptive_max_strength,
        )
    }
}

/// Entry selection and gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    /// Registry key of the long condition.
    pub long_condition: String,
    /// Registry key of the short condition.
    pub short_condition: String,
    /// Entries require ADX strictly above this.
    pub adx_threshold: f64,
    /// Entries require ADX strictly below this, when set.
    pub adx_upper_threshold: Option<f64>,
    /// Veto entries while the box filter flags "ranging".
    pub box_filter: bool,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            long_condition: "default".into(),
            short_condition: "default".into(),
            adx_threshold: 0.0,
            adx_upper_threshold: None,
            box_filter: false,
        }
    }
}

/// What to do with a take-profit or signal exit while the directional pair
/// still favours the open side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldPolicy {
    /// Exit as soon as the exit fires.
    #[default]
    Never,
    /// Defer the exit until +DI/-DI stop favouring the position.
    WhileDirectionalFavors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Target distance as a fraction of entry price; 0 disables.
    pub take_profit_rate: f64,
    /// Stop distance as a fraction of entry price; 0 disables.
    pub stop_loss_rate: f64,
    pub hold_policy: HoldPolicy,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            take_profit_rate: 0.02,
            stop_loss_rate: 0.01,
            hold_policy: HoldPolicy::Never,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgeConfig {
    pub enabled: bool,
    /// Hedge leg size as a multiple of the position it hedges.
    pub size_multiplier: f64,
    /// Legs below this size are closed with their counterpart.
    pub min_position_size: f64,
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            size_multiplier: 2.0,
            min_position_size: 0.1,
        }
    }
}

/// Volume profile parameters. Percentages are of the reference price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeProfileConfig {
    /// Trailing bars in the profile window.
    pub window: usize,
    pub bin_size_pct: f64,
    /// Fraction of window volume covered by the value area.
    pub value_area_pct: f64,
    /// A candle within this distance of a level is touching it.
    pub proximity_pct: f64,
    pub min_level_distance_pct: f64,
}

impl Default for VolumeProfileConfig {
    fn default() -> Self {
        Self {
            window: 240,
            bin_size_pct: 0.05,
            value_area_pct: 0.70,
            proximity_pct: 0.2,
            min_level_distance_pct: 0.5,
        }
    }
}

/// Thresholds read by individual condition families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionThresholds {
    /// Normalised band-width needed by the regime condition.
    pub bandwidth_z_entry: f64,
    /// |Normalised band-width| needed by the inverse condition.
    pub inverse_bandwidth_z: f64,
    /// One-step Z-score move that vetoes a pattern-agreement entry.
    pub zscore_spike: f64,
    /// One-step VWZ move that vetoes a pattern-agreement entry.
    pub vwz_spike: f64,
    /// One-step band-width growth ratio that vetoes a pattern-agreement entry.
    pub bandwidth_spike_ratio: f64,
}

impl Default for ConditionThresholds {
    fn default() -> Self {
        Self {
            bandwidth_z_entry: 1.0,
            inverse_bandwidth_z: 2.5,
            zscore_spike: 1.2,
            vwz_spike: 1.0,
            bandwidth_spike_ratio: 1.5,
        }
    }
}

// ─── Validation ──────────────────────────────────────────────────────

fn period(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositivePeriod { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a finite non-negative number, got {value}"),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a finite positive number, got {value}"),
        });
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

fn out_of_range(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidRange {
        field,
        reason: reason.into(),
    }
}

impl StrategyConfig {
    /// Check every section. Condition names are checked by the registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        period("indicators.zscore_period", ind.zscore_period)?;
        period("indicators.vwz_period", ind.vwz_period)?;
        period("indicators.ema_short_period", ind.ema_short_period)?;
        period("indicators.ema_long_period", ind.ema_long_period)?;
        period("indicators.adx_period", ind.adx_period)?;
        period("indicators.bbw_period", ind.bbw_period)?;
        period("indicators.bbw_normalize_window", ind.bbw_normalize_window)?;
        period("indicators.regime_window", ind.regime_window)?;
        period("indicators.atr_period", ind.atr_period)?;
        period("indicators.macd_fast", ind.macd_fast)?;
        period("indicators.macd_slow", ind.macd_slow)?;
        period("indicators.macd_signal", ind.macd_signal)?;
        period("indicators.box_period", ind.box_period)?;
        period("volume_profile.window", self.volume_profile.window)?;

        if ind.bbw_normalize_window < 2 {
            return Err(invalid("indicators.bbw_normalize_window", "needs at least 2 samples"));
        }
        if ind.macd_fast >= ind.macd_slow {
            return Err(out_of_range("indicators.macd_fast", "must be shorter than macd_slow"));
        }
        if ind.regime_window < 2 * ind.bbw_period {
            return Err(out_of_range(
                "indicators.regime_window",
                format!("must cover at least 2 * bbw_period = {}", 2 * ind.bbw_period),
            ));
        }
        non_negative("indicators.vwz_min_stddev", ind.vwz_min_stddev)?;
        positive("indicators.bbw_multiplier", ind.bbw_multiplier)?;
        non_negative("indicators.bbw_threshold", ind.bbw_threshold)?;
        non_negative("indicators.box_min_range_pct", ind.box_min_range_pct)?;
        non_negative("indicators.adaptive_min_strength", ind.adaptive_min_strength)?;
        positive("indicators.adaptive_max_strength", ind.adaptive_max_strength)?;
        if ind.adaptive_min_strength >= ind.adaptive_max_strength {
            return Err(out_of_range(
                "indicators.adaptive_min_strength",
                "must be below adaptive_max_strength",
            ));
        }

        non_negative("entry.adx_threshold", self.entry.adx_threshold)?;
        if let Some(upper) = self.entry.adx_upper_threshold {
            positive("entry.adx_upper_threshold", upper)?;
            if upper <= self.entry.adx_threshold {
                return Err(out_of_range("entry.adx_upper_threshold", "must exceed adx_threshold"));
            }
        }

        non_negative("exit.take_profit_rate", self.exit.take_profit_rate)?;
        non_negative("exit.stop_loss_rate", self.exit.stop_loss_rate)?;
        if self.exit.stop_loss_rate >= 1.0 {
            return Err(invalid("exit.stop_loss_rate", "must be below 1.0"));
        }

        positive("hedge.size_multiplier", self.hedge.size_multiplier)?;
        non_negative("hedge.min_position_size", self.hedge.min_position_size)?;

        let vp = &self.volume_profile;
        positive("volume_profile.bin_size_pct", vp.bin_size_pct)?;
        positive("volume_profile.value_area_pct", vp.value_area_pct)?;
        if vp.value_area_pct > 1.0 {
            return Err(out_of_range("volume_profile.value_area_pct", "is a fraction in (0, 1]"));
        }
        non_negative("volume_profile.proximity_pct", vp.proximity_pct)?;
        non_negative("volume_profile.min_level_distance_pct", vp.min_level_distance_pct)?;

        let th = &self.thresholds;
        non_negative("thresholds.bandwidth_z_entry", th.bandwidth_z_entry)?;
        non_negative("thresholds.inverse_bandwidth_z", th.inverse_bandwidth_z)?;
        positive("thresholds.zscore_spike", th.zscore_spike)?;
        positive("thresholds.vwz_spike", th.vwz_spike)?;
        positive("thresholds.bandwidth_spike_ratio", th.bandwidth_spike_ratio)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(StrategyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut config = StrategyConfig::default();
        config.indicators.zscore_period = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositivePeriod {
                field: "indicators.zscore_period",
                value: 0
            })
        );
    }

    #[test]
    fn inverted_macd_is_rejected() {
        let mut config = StrategyConfig::default();
        config.indicators.macd_fast = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { field: "indicators.macd_fast", .. })
        ));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut config = StrategyConfig::default();
        config.exit.take_profit_rate = -0.1;
        assert!(config.validate().is_err());
        config.exit.take_profit_rate = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn adx_band_must_be_ordered() {
        let mut config = StrategyConfig::default();
        config.entry.adx_threshold = 25.0;
        config.entry.adx_upper_threshold = Some(20.0);
        assert!(config.validate().is_err());
        config.entry.adx_upper_threshold = Some(45.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: StrategyConfig =
            serde_json::from_str(r#"{"hedge": {"enabled": true}, "exit": {"hold_policy": "while_directional_favors"}}"#)
                .unwrap();
        assert!(config.hedge.enabled);
        assert_eq!(config.hedge.size_multiplier, 2.0);
        assert_eq!(config.exit.hold_policy, HoldPolicy::WhileDirectionalFavors);
        assert_eq!(config.entry.long_condition, "default");
    }
}
