//! Composite money-flow score
//!
//! Blends the normalized deviation of OBV from its own EMA with a Money Flow
//! Index into one 0-100 score per bar, then buckets the score into five
//! color bands for the chart:
//!
//! ```text
//! composite = 0.6 * normalized_obv_slope + 0.4 * (mfi - 50) / 50
//! score     = (composite + 1) / 2 * 100
//! ```

use crate::config::{BandCutoffs, PipelineConfig, MFI_NEUTRAL};
use crate::error::{ChartError, Result};
use crate::pipeline::obv::ObvComponents;
use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Money Flow Index (MFI)
///
/// Typical-price money flow is classified against the previous bar and summed
/// over a trailing window. Yields `None` until the window holds `period`
/// classified flows, i.e. from the bar at index `period` onward.
#[derive(Debug, Clone)]
pub struct MoneyFlowIndex {
    period: usize,
    positive_flow: VecDeque<f64>,
    negative_flow: VecDeque<f64>,
    prev_typical_price: Option<f64>,
}

impl MoneyFlowIndex {
    /// Create new MFI with given period (typically 14)
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(ChartError::InvalidParameter(
                "MFI period must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            period,
            positive_flow: VecDeque::with_capacity(period + 1),
            negative_flow: VecDeque::with_capacity(period + 1),
            prev_typical_price: None,
        })
    }

    /// Update with new HLCV values
    pub fn update(&mut self, high: f64, low: f64, close: f64, volume: f64) -> Option<f64> {
        let typical_price = (high + low + close) / 3.0;
        let money_flow = typical_price * volume;

        let prev_tp = self.prev_typical_price.replace(typical_price)?;

        let (positive, negative) = if typical_price > prev_tp {
            (money_flow, 0.0)
        } else if typical_price < prev_tp {
            (0.0, money_flow)
        } else {
            (0.0, 0.0)
        };
        self.positive_flow.push_back(positive);
        self.negative_flow.push_back(negative);

        if self.positive_flow.len() > self.period {
            self.positive_flow.pop_front();
            self.negative_flow.pop_front();
        }

        if self.positive_flow.len() < self.period {
            return None;
        }

        let positive_sum = self.positive_flow.iter().sum::<f64>();
        let negative_sum = self.negative_flow.iter().sum::<f64>();

        let money_ratio = if negative_sum == 0.0 {
            100.0
        } else {
            positive_sum / negative_sum
        };
        Some(100.0 - (100.0 / (1.0 + money_ratio)))
    }

    /// MFI at every position, with the neutral value standing in during warm-up
    pub fn compute(period: usize, series: &Series) -> Result<Vec<f64>> {
        let mut mfi = Self::new(period)?;
        Ok(series
            .iter()
            .map(|p| {
                mfi.update(p.high, p.low, p.close, p.volume)
                    .unwrap_or(MFI_NEUTRAL)
            })
            .collect())
    }
}

/// Discrete money-flow band, evaluated top-down on the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoneyFlowBand {
    StrongInflow,
    Accumulation,
    Neutral,
    Distribution,
    StrongOutflow,
}

impl MoneyFlowBand {
    /// Classify a 0-100 score; each cutoff is an inclusive lower bound
    pub fn classify(score: f64, cutoffs: &BandCutoffs) -> Self {
        if score >= cutoffs.strong_inflow {
            MoneyFlowBand::StrongInflow
        } else if score >= cutoffs.accumulation {
            MoneyFlowBand::Accumulation
        } else if score >= cutoffs.neutral {
            MoneyFlowBand::Neutral
        } else if score >= cutoffs.distribution {
            MoneyFlowBand::Distribution
        } else {
            MoneyFlowBand::StrongOutflow
        }
    }

    /// Chart color of the band
    pub fn hex_color(&self) -> &'static str {
        match self {
            MoneyFlowBand::StrongInflow => "#15803d",
            MoneyFlowBand::Accumulation => "#4ade80",
            MoneyFlowBand::Neutral => "#94a3b8",
            MoneyFlowBand::Distribution => "#f97316",
            MoneyFlowBand::StrongOutflow => "#ef4444",
        }
    }
}

/// Bar tint for the volume histogram, independent of the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeColor {
    Up,
    Down,
    Neutral,
}

impl VolumeColor {
    /// Up if close rose vs. the previous bar, down if it fell, neutral on the
    /// first bar or an unchanged close
    pub fn classify(prev_close: Option<f64>, close: f64) -> Self {
        match prev_close {
            Some(prev) if close > prev => VolumeColor::Up,
            Some(prev) if close < prev => VolumeColor::Down,
            _ => VolumeColor::Neutral,
        }
    }
}

/// Volume color at every position of the series
pub fn volume_colors(series: &Series) -> Vec<VolumeColor> {
    let mut prev_close = None;
    series
        .iter()
        .map(|p| {
            let color = VolumeColor::classify(prev_close, p.close);
            prev_close = Some(p.close);
            color
        })
        .collect()
}

/// Score of one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneyFlowReading {
    pub mfi: f64,
    pub normalized_obv_slope: f64,
    pub score: f64,
    pub band: MoneyFlowBand,
}

/// Combines OBV deviation and MFI into the 0-100 money-flow score
#[derive(Debug, Clone)]
pub struct MoneyFlowScorer {
    mfi_period: usize,
    obv_weight: f64,
    mfi_weight: f64,
    bands: BandCutoffs,
}

impl MoneyFlowScorer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            mfi_period: config.mfi_period,
            obv_weight: config.obv_weight,
            mfi_weight: config.mfi_weight,
            bands: config.bands,
        }
    }

    /// Score every bar, reusing already computed OBV components
    pub fn score(&self, series: &Series, obv: &ObvComponents) -> Result<Vec<MoneyFlowReading>> {
        if obv.obv.len() != series.len() {
            return Err(ChartError::InvalidParameter(format!(
                "OBV components cover {} bars, series has {}",
                obv.obv.len(),
                series.len()
            )));
        }

        let slopes = obv.normalized_slope();
        let mfi = MoneyFlowIndex::compute(self.mfi_period, series)?;

        Ok(slopes
            .into_iter()
            .zip(mfi)
            .map(|(slope, mfi)| {
                let mfi_score = (mfi - MFI_NEUTRAL) / MFI_NEUTRAL;
                let composite = slope * self.obv_weight + mfi_score * self.mfi_weight;
                let score = ((composite + 1.0) / 2.0 * 100.0).clamp(0.0, 100.0);

                MoneyFlowReading {
                    mfi,
                    normalized_obv_slope: slope,
                    score,
                    band: MoneyFlowBand::classify(score, &self.bands),
                }
            })
            .collect())
    }
}

impl Default for MoneyFlowScorer {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}
