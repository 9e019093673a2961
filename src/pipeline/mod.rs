//! Indicator pipeline
//!
//! Every calculator reads the same normalized [`Series`] and returns a new
//! parallel column; nothing is written back into the input. The pipeline
//! gathers those columns into [`IndicatorColumns`] and, for the chart,
//! zips them into one [`IndicatorPoint`] per bar.
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use crossvision::pipeline::IndicatorPipeline;
//! use crossvision::series::Series;
//! use crossvision::types::PricePoint;
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let bars = (0..30)
//!     .map(|i| {
//!         let close = 100.0 + i as f64;
//!         PricePoint::new(start + Duration::days(i), close, close + 1.0, close - 1.0, close, 1_000.0)
//!     })
//!     .collect();
//!
//! let series = Series::normalize(bars).unwrap();
//! let points = IndicatorPipeline::default().run(&series).unwrap();
//! assert_eq!(points.len(), 30);
//! assert!(points[29].ema(50).is_some());
//! ```

pub mod ema;
pub mod money_flow;
pub mod obv;
pub mod volume;
pub mod vwap;

pub use ema::{ema_column, ema_over, ema_series, ExponentialMovingAverage};
pub use money_flow::{
    volume_colors, MoneyFlowBand, MoneyFlowIndex, MoneyFlowReading, MoneyFlowScorer, VolumeColor,
};
pub use obv::{obv, obv_components, ObvComponents, OnBalanceVolume};
pub use volume::{relative_volume, AverageVolume, VolumeFlow, VolumeReading};
pub use vwap::{vwap, Vwap};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::series::Series;
use crate::types::{PriceField, PricePoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A price bar enriched with every derived indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    #[serde(flatten)]
    pub point: PricePoint,
    /// `None` while cumulative volume is zero
    pub vwap: Option<f64>,
    pub obv: f64,
    pub mfi: f64,
    pub money_flow_score: f64,
    pub money_flow_color: MoneyFlowBand,
    pub volume_color: VolumeColor,
    pub volume_ma: f64,
    pub volume_ratio: f64,
    pub volume_flow: VolumeFlow,
    /// EMA columns keyed `ema<period>`
    #[serde(flatten)]
    pub emas: BTreeMap<String, f64>,
}

impl IndicatorPoint {
    /// EMA value for `period`, if that period was computed
    pub fn ema(&self, period: usize) -> Option<f64> {
        self.emas.get(&ema_column(period)).copied()
    }
}

/// Every indicator as a column parallel to the input series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorColumns {
    pub vwap: Vec<Option<f64>>,
    pub obv: ObvComponents,
    pub money_flow: Vec<MoneyFlowReading>,
    pub volume_colors: Vec<VolumeColor>,
    pub volume: Vec<VolumeReading>,
    pub emas: BTreeMap<usize, Vec<f64>>,
}

impl IndicatorColumns {
    /// Zip the columns back onto the bars they were computed from
    pub fn into_points(self, series: &Series) -> Vec<IndicatorPoint> {
        let Self {
            vwap,
            obv,
            money_flow,
            volume_colors,
            volume,
            emas,
        } = self;

        series
            .iter()
            .enumerate()
            .map(|(i, point)| IndicatorPoint {
                point: point.clone(),
                vwap: vwap[i],
                obv: obv.obv[i],
                mfi: money_flow[i].mfi,
                money_flow_score: money_flow[i].score,
                money_flow_color: money_flow[i].band,
                volume_color: volume_colors[i],
                volume_ma: volume[i].volume_ma,
                volume_ratio: volume[i].volume_ratio,
                volume_flow: volume[i].flow,
                emas: emas
                    .iter()
                    .map(|(period, values)| (ema_column(*period), values[i]))
                    .collect(),
            })
            .collect()
    }
}

/// Runs every calculator over a series with one configuration
#[derive(Debug, Clone)]
pub struct IndicatorPipeline {
    config: PipelineConfig,
}

impl IndicatorPipeline {
    /// Create a pipeline, rejecting configurations the calculators cannot run
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compute all indicator columns
    pub fn compute_columns(&self, series: &Series) -> Result<IndicatorColumns> {
        log::debug!(
            "Computing indicators over {} bars ({} synthetic)",
            series.len(),
            series.synthetic_count()
        );

        let obv = obv_components(series, self.config.obv_smoothing_period)?;
        let money_flow = MoneyFlowScorer::new(&self.config).score(series, &obv)?;

        let mut emas = BTreeMap::new();
        for period in [self.config.fast_ema, self.config.slow_ema] {
            emas.insert(period, ema_over(series, period, PriceField::Close)?);
        }

        Ok(IndicatorColumns {
            vwap: vwap(series),
            obv,
            money_flow,
            volume_colors: volume_colors(series),
            volume: relative_volume(series, self.config.volume_ma_period)?,
            emas,
        })
    }

    /// Compute all indicators as one enriched point per bar
    pub fn run(&self, series: &Series) -> Result<Vec<IndicatorPoint>> {
        Ok(self.compute_columns(series)?.into_points(series))
    }
}

impl Default for IndicatorPipeline {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_series(n: usize) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points = (0..n)
            .map(|i| {
                let close = 100.0 + ((i as f64) * 0.7).sin() * 5.0;
                PricePoint::new(
                    start + Duration::days(i as i64),
                    close - 0.5,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1_000.0 + (i % 7) as f64 * 150.0,
                )
            })
            .collect();
        Series::normalize(points).unwrap()
    }

    #[test]
    fn test_run_populates_every_column() {
        let series = sample_series(40);
        let points = IndicatorPipeline::default().run(&series).unwrap();

        assert_eq!(points.len(), 40);
        for (point, bar) in points.iter().zip(series.iter()) {
            assert_eq!(&point.point, bar);
            assert!(point.vwap.is_some());
            assert!(point.ema(50).is_some());
            assert!(point.ema(135).is_some());
            assert!(point.ema(20).is_none());
        }
        assert_eq!(points[0].ema(50), Some(series[0].close));
    }

    #[test]
    fn test_displayed_obv_matches_scorer_obv() {
        let series = sample_series(30);
        let pipeline = IndicatorPipeline::default();
        let columns = pipeline.compute_columns(&series).unwrap();
        let points = columns.clone().into_points(&series);

        let displayed: Vec<f64> = points.iter().map(|p| p.obv).collect();
        assert_eq!(displayed, columns.obv.obv);
        assert_eq!(displayed, obv(&series));
    }

    #[test]
    fn test_custom_ema_pair() {
        let series = sample_series(10);
        let pipeline = IndicatorPipeline::new(PipelineConfig::default().with_emas(5, 12)).unwrap();
        let points = pipeline.run(&series).unwrap();

        assert!(points[9].ema(5).is_some());
        assert!(points[9].ema(12).is_some());
        assert!(points[9].ema(50).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig::default().with_emas(0, 12);
        assert!(IndicatorPipeline::new(config).is_err());
    }

    #[test]
    fn test_serializes_flat_record() {
        let series = sample_series(3);
        let points = IndicatorPipeline::default().run(&series).unwrap();
        let json = serde_json::to_value(&points[0]).unwrap();

        assert!(json.get("close").is_some());
        assert!(json.get("ema50").is_some());
        assert!(json.get("ema135").is_some());
        assert_eq!(json["money_flow_color"], "neutral");
        assert_eq!(json["is_synthetic"], false);
    }
}
