//! Calibration constants and pipeline configuration
//!
//! The weights, band cutoffs and periods below were tuned against real
//! charts. Changing any of them changes what the displayed signal means.

use crate::error::{ChartError, Result};
use serde::{Deserialize, Serialize};

/// Fast EMA period of the golden-cross pair
pub const DEFAULT_FAST_EMA: usize = 50;
/// Slow EMA period of the golden-cross pair
pub const DEFAULT_SLOW_EMA: usize = 135;
/// Smoothing period of the OBV baseline used by the money-flow score
pub const OBV_SMOOTHING_PERIOD: usize = 10;
/// Money Flow Index lookback
pub const MFI_PERIOD: usize = 14;
/// MFI value reported before enough history exists
pub const MFI_NEUTRAL: f64 = 50.0;
/// Weight of the normalized OBV slope in the composite score
pub const OBV_WEIGHT: f64 = 0.6;
/// Weight of the MFI score in the composite score
pub const MFI_WEIGHT: f64 = 0.4;

/// Band cutoffs (inclusive lower bounds)
pub const STRONG_INFLOW_CUTOFF: f64 = 70.0;
pub const ACCUMULATION_CUTOFF: f64 = 55.0;
pub const NEUTRAL_CUTOFF: f64 = 45.0;
pub const DISTRIBUTION_CUTOFF: f64 = 30.0;

/// Trailing window of the volume moving average
pub const VOLUME_MA_PERIOD: usize = 20;

/// Path projector: short and long volatility windows and their blend
pub const SHORT_VOL_WINDOW: usize = 30;
pub const LONG_VOL_WINDOW: usize = 90;
pub const SHORT_VOL_WEIGHT: f64 = 0.7;
pub const LONG_VOL_WEIGHT: f64 = 0.3;
/// Number of synthetic bars appended by the projector
pub const PROJECTION_STEPS: usize = 20;

/// Lower bounds of the four upper money-flow bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandCutoffs {
    pub strong_inflow: f64,
    pub accumulation: f64,
    pub neutral: f64,
    pub distribution: f64,
}

impl Default for BandCutoffs {
    fn default() -> Self {
        Self {
            strong_inflow: STRONG_INFLOW_CUTOFF,
            accumulation: ACCUMULATION_CUTOFF,
            neutral: NEUTRAL_CUTOFF,
            distribution: DISTRIBUTION_CUTOFF,
        }
    }
}

/// Parameters of one indicator pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fast_ema: usize,
    pub slow_ema: usize,
    pub obv_smoothing_period: usize,
    pub mfi_period: usize,
    pub obv_weight: f64,
    pub mfi_weight: f64,
    pub bands: BandCutoffs,
    pub volume_ma_period: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fast_ema: DEFAULT_FAST_EMA,
            slow_ema: DEFAULT_SLOW_EMA,
            obv_smoothing_period: OBV_SMOOTHING_PERIOD,
            mfi_period: MFI_PERIOD,
            obv_weight: OBV_WEIGHT,
            mfi_weight: MFI_WEIGHT,
            bands: BandCutoffs::default(),
            volume_ma_period: VOLUME_MA_PERIOD,
        }
    }
}

impl PipelineConfig {
    /// Override the EMA pair, keeping every other calibration
    pub fn with_emas(mut self, fast: usize, slow: usize) -> Self {
        self.fast_ema = fast;
        self.slow_ema = slow;
        self
    }

    /// Reject configurations the calculators cannot run with
    pub fn validate(&self) -> Result<()> {
        for (name, period) in [
            ("fast_ema", self.fast_ema),
            ("slow_ema", self.slow_ema),
            ("obv_smoothing_period", self.obv_smoothing_period),
            ("mfi_period", self.mfi_period),
            ("volume_ma_period", self.volume_ma_period),
        ] {
            if period == 0 {
                return Err(ChartError::ConfigError(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if self.fast_ema == self.slow_ema {
            return Err(ChartError::ConfigError(format!(
                "fast and slow EMA periods must differ (both {})",
                self.fast_ema
            )));
        }

        let b = &self.bands;
        if !(b.strong_inflow >= b.accumulation
            && b.accumulation >= b.neutral
            && b.neutral >= b.distribution)
        {
            return Err(ChartError::ConfigError(
                "band cutoffs must be non-increasing from strong_inflow to distribution".to_string(),
            ));
        }

        if !self.obv_weight.is_finite() || !self.mfi_weight.is_finite() {
            return Err(ChartError::ConfigError("weights must be finite".to_string()));
        }

        Ok(())
    }

    /// Parse a TOML document; missing keys fall back to the calibrated defaults
    #[cfg(feature = "cli")]
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ChartError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_calibrated_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.fast_ema, 50);
        assert_eq!(config.slow_ema, 135);
        assert_eq!(config.mfi_period, 14);
        assert_eq!(config.obv_smoothing_period, 10);
        assert_eq!(config.obv_weight, 0.6);
        assert_eq!(config.mfi_weight, 0.4);
        assert_eq!(config.bands.strong_inflow, 70.0);
        assert_eq!(config.bands.distribution, 30.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_period() {
        let config = PipelineConfig {
            mfi_period: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ChartError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_bands() {
        let mut config = PipelineConfig::default();
        config.bands.neutral = 80.0;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PipelineConfig::from_toml_str("fast_ema = 20\nslow_ema = 60\n").unwrap();
        assert_eq!(config.fast_ema, 20);
        assert_eq!(config.slow_ema, 60);
        assert_eq!(config.mfi_period, MFI_PERIOD);
        assert_eq!(config.bands, BandCutoffs::default());
    }
}
