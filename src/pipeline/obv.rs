//! On-balance volume and its smoothed baseline

use crate::error::Result;
use crate::pipeline::ema::ExponentialMovingAverage;
use crate::series::Series;
use serde::{Deserialize, Serialize};

/// OBV - On-Balance Volume
#[derive(Debug, Clone, Default)]
pub struct OnBalanceVolume {
    obv: f64,
    prev_close: Option<f64>,
}

impl OnBalanceVolume {
    /// Create new OBV indicator
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with new close price and volume
    pub fn update(&mut self, close: f64, volume: f64) -> f64 {
        match self.prev_close {
            Some(prev) if close > prev => self.obv += volume,
            Some(prev) if close < prev => self.obv -= volume,
            Some(_) => {}
            None => self.obv = volume,
        }

        self.prev_close = Some(close);
        self.obv
    }

    /// Reset OBV
    pub fn reset(&mut self) {
        self.obv = 0.0;
        self.prev_close = None;
    }
}

/// Raw OBV at every position of the series
pub fn obv(series: &Series) -> Vec<f64> {
    let mut acc = OnBalanceVolume::new();
    series.iter().map(|p| acc.update(p.close, p.volume)).collect()
}

/// OBV, its EMA baseline and their difference in one pass
pub fn obv_components(series: &Series, smoothing_period: usize) -> Result<ObvComponents> {
    ObvComponents::compute(series, smoothing_period)
}

/// OBV together with the baseline the money-flow score compares it against.
///
/// Both the displayed OBV column and the composite score read `obv` from this
/// one record, so they can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObvComponents {
    pub obv: Vec<f64>,
    pub ema_obv: Vec<f64>,
    /// Deviation of OBV from its own trend: `obv - ema_obv`
    pub obv_slope: Vec<f64>,
}

impl ObvComponents {
    /// Compute OBV, its EMA over `smoothing_period`, and their difference
    pub fn compute(series: &Series, smoothing_period: usize) -> Result<Self> {
        let obv = obv(series);
        let ema_obv = ExponentialMovingAverage::compute(smoothing_period, &obv)?;
        let obv_slope = obv.iter().zip(&ema_obv).map(|(o, e)| o - e).collect();

        Ok(Self {
            obv,
            ema_obv,
            obv_slope,
        })
    }

    /// Slopes scaled into [-1, 1] by the largest absolute slope.
    ///
    /// An all-zero slope series divides by 1 instead. A NaN slope anywhere
    /// makes the divisor NaN, so every normalized value is NaN.
    pub fn normalized_slope(&self) -> Vec<f64> {
        let max_abs = self.obv_slope.iter().fold(0.0_f64, |acc, s| {
            if acc.is_nan() || s.is_nan() {
                f64::NAN
            } else {
                acc.max(s.abs())
            }
        });
        let divisor = if max_abs == 0.0 { 1.0 } else { max_abs };

        self.obv_slope.iter().map(|s| s / divisor).collect()
    }
}
