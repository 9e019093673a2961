//! Monte-Carlo path projector
//!
//! Extends a real series with synthetic forward bars drawn from a random walk
//! whose volatility blends short- and long-window realized volatility. The
//! random source is always passed in, so a seeded generator reproduces a
//! path exactly.

use crate::config::{
    LONG_VOL_WEIGHT, LONG_VOL_WINDOW, PROJECTION_STEPS, SHORT_VOL_WEIGHT, SHORT_VOL_WINDOW,
};
use crate::error::{ChartError, Result};
use crate::series::Series;
use crate::types::{Interval, PricePoint};
use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};
use std::f64::consts::PI;

/// Half-width of the synthetic high/low band around the body
const WICK_OFFSET: f64 = 0.005;
/// Synthetic volume is jittered within this fraction of the previous bar
const VOLUME_JITTER: f64 = 0.2;
/// Floor on the per-step price multiplier so prices stay positive
const MIN_STEP_MULTIPLIER: f64 = 0.01;

/// Projector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    pub steps: usize,
    /// Target mean daily return, in percent
    pub drift_percent: f64,
    pub short_window: usize,
    pub long_window: usize,
    pub short_weight: f64,
    pub long_weight: f64,
    /// Bar spacing used when the series is too short to infer one
    pub interval: Interval,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            steps: PROJECTION_STEPS,
            drift_percent: 0.0,
            short_window: SHORT_VOL_WINDOW,
            long_window: LONG_VOL_WINDOW,
            short_weight: SHORT_VOL_WEIGHT,
            long_weight: LONG_VOL_WEIGHT,
            interval: Interval::Daily,
        }
    }
}

impl ProjectionParams {
    pub fn with_drift(mut self, drift_percent: f64) -> Self {
        self.drift_percent = drift_percent;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }
}

/// Draw one standard normal variate with the Box-Muller transform
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - [0, 1) keeps u1 away from zero so ln(u1) is finite
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Sample standard deviation of simple returns over the trailing `window`
/// closes. Fewer than two returns yield zero.
pub fn realized_volatility(closes: &[f64], window: usize) -> f64 {
    let start = closes.len().saturating_sub(window);
    let returns: Vec<f64> = closes[start..]
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }
    Data::new(returns)
        .std_dev()
        .filter(|s| s.is_finite())
        .unwrap_or(0.0)
}

/// Random-walk extension of a price series
#[derive(Debug, Clone)]
pub struct PathProjector {
    params: ProjectionParams,
}

impl PathProjector {
    pub fn new(params: ProjectionParams) -> Result<Self> {
        if params.short_window < 2 || params.long_window < 2 {
            return Err(ChartError::InvalidParameter(
                "Volatility windows must be at least 2 bars".to_string(),
            ));
        }
        if !params.drift_percent.is_finite() {
            return Err(ChartError::InvalidParameter(
                "Drift must be a finite percentage".to_string(),
            ));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &ProjectionParams {
        &self.params
    }

    /// Blend of short- and long-window realized volatility
    pub fn blended_volatility(&self, series: &Series) -> f64 {
        let closes = series.closes();
        let short = realized_volatility(&closes, self.params.short_window);
        let long = realized_volatility(&closes, self.params.long_window);
        self.params.short_weight * short + self.params.long_weight * long
    }

    /// Generate the synthetic bars that would follow `series`
    pub fn project<R: Rng + ?Sized>(&self, series: &Series, rng: &mut R) -> Vec<PricePoint> {
        let volatility = self.blended_volatility(series);
        let mean = self.params.drift_percent / 100.0;
        log::debug!(
            "Projecting {} bars: drift {:.4}, volatility {:.4}",
            self.params.steps,
            mean,
            volatility
        );

        let last = series.last();
        let spacing = bar_spacing(series, self.params.interval);

        let mut prev_close = last.close;
        let mut prev_volume = last.volume;
        let mut timestamp = last.timestamp;

        (0..self.params.steps)
            .map(|_| {
                let step_return = mean + volatility * standard_normal(rng);
                let open = prev_close;
                let close = prev_close * (1.0 + step_return).max(MIN_STEP_MULTIPLIER);
                let volume =
                    prev_volume * rng.gen_range((1.0 - VOLUME_JITTER)..=(1.0 + VOLUME_JITTER));
                timestamp = timestamp + spacing;

                let mut point = PricePoint::new(
                    timestamp,
                    open,
                    open.max(close) * (1.0 + WICK_OFFSET),
                    open.min(close) * (1.0 - WICK_OFFSET),
                    close,
                    volume,
                );
                point.is_synthetic = true;

                prev_close = close;
                prev_volume = volume;
                point
            })
            .collect()
    }

    /// The input series followed by a projected tail
    pub fn extend<R: Rng + ?Sized>(&self, series: &Series, rng: &mut R) -> Series {
        series.extended(self.project(series, rng))
    }
}

impl Default for PathProjector {
    fn default() -> Self {
        Self {
            params: ProjectionParams::default(),
        }
    }
}

/// Spacing of the last two bars, or the interval's nominal spacing when it
/// cannot be inferred
fn bar_spacing(series: &Series, fallback: Interval) -> Duration {
    let n = series.len();
    if n >= 2 {
        let spacing = series[n - 1].timestamp - series[n - 2].timestamp;
        if spacing > Duration::zero() {
            return spacing;
        }
    }
    fallback.bar_spacing()
}
