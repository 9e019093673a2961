//! Relative volume: trailing volume average, volume ratio and flow tier

use crate::error::{ChartError, Result};
use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Trailing average volume over a window, averaging whatever is available
/// until the window fills
#[derive(Debug, Clone)]
pub struct AverageVolume {
    window: usize,
    volumes: VecDeque<f64>,
    seen: usize,
}

impl AverageVolume {
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ChartError::InvalidParameter(
                "Volume window must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            window,
            volumes: VecDeque::with_capacity(window),
            seen: 0,
        })
    }

    /// Add a bar's volume and return the average including it.
    ///
    /// The very first bar has no baseline and reports 0.
    pub fn update(&mut self, volume: f64) -> f64 {
        self.volumes.push_back(volume);
        if self.volumes.len() > self.window {
            self.volumes.pop_front();
        }
        self.seen += 1;

        if self.seen == 1 {
            0.0
        } else {
            self.volumes.iter().sum::<f64>() / self.volumes.len() as f64
        }
    }
}

/// How a bar's volume compares with its trailing average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeFlow {
    /// More than 1.5x the average
    Surge,
    /// More than 1.2x the average
    Active,
    Normal,
    /// Less than half the average
    Dry,
}

impl VolumeFlow {
    pub fn classify(ratio: f64) -> Self {
        if ratio > 1.5 {
            VolumeFlow::Surge
        } else if ratio > 1.2 {
            VolumeFlow::Active
        } else if ratio < 0.5 {
            VolumeFlow::Dry
        } else {
            VolumeFlow::Normal
        }
    }

    pub fn hex_color(&self) -> &'static str {
        match self {
            VolumeFlow::Surge => "#064e3b",
            VolumeFlow::Active => "#059669",
            VolumeFlow::Normal => "#d1d5db",
            VolumeFlow::Dry => "#dc2626",
        }
    }
}

/// Relative-volume reading of one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeReading {
    pub volume_ma: f64,
    pub volume_ratio: f64,
    pub flow: VolumeFlow,
}

/// Relative volume at every position of the series
pub fn relative_volume(series: &Series, window: usize) -> Result<Vec<VolumeReading>> {
    let mut avg = AverageVolume::new(window)?;
    Ok(series
        .iter()
        .map(|p| {
            let volume_ma = avg.update(p.volume);
            let volume_ratio = if volume_ma > 0.0 {
                p.volume / volume_ma
            } else {
                1.0
            };
            VolumeReading {
                volume_ma,
                volume_ratio,
                flow: VolumeFlow::classify(volume_ratio),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;
    use approx::assert_relative_eq;
    use chrono::{Duration, Utc};

    #[test]
    fn test_average_volume_partial_then_full_window() {
        let mut avg = AverageVolume::new(3).unwrap();
        assert_eq!(avg.update(100.0), 0.0);
        assert_eq!(avg.update(200.0), 150.0);
        assert_eq!(avg.update(300.0), 200.0);
        assert_eq!(avg.update(400.0), 300.0);
    }

    #[test]
    fn test_flow_tiers() {
        assert_eq!(VolumeFlow::classify(2.0), VolumeFlow::Surge);
        assert_eq!(VolumeFlow::classify(1.5), VolumeFlow::Active);
        assert_eq!(VolumeFlow::classify(1.2), VolumeFlow::Normal);
        assert_eq!(VolumeFlow::classify(0.49), VolumeFlow::Dry);
    }

    #[test]
    fn test_relative_volume_series() {
        let start = Utc::now();
        let series = Series::normalize(
            [100.0, 100.0, 400.0]
                .iter()
                .enumerate()
                .map(|(i, &v)| PricePoint::new(start + Duration::days(i as i64), 1.0, 1.0, 1.0, 1.0, v))
                .collect(),
        )
        .unwrap();

        let readings = relative_volume(&series, 20).unwrap();
        assert_eq!(readings[0].volume_ratio, 1.0);
        assert_eq!(readings[0].flow, VolumeFlow::Normal);
        assert_eq!(readings[1].volume_ratio, 1.0);
        assert_relative_eq!(readings[2].volume_ma, 200.0);
        assert_eq!(readings[2].flow, VolumeFlow::Surge);
    }
}
