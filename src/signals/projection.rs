//! Death cross in a projected continuation of a series
//!
//! The series is extended with synthetic bars from the path projector, the
//! whole extended series is run through the indicator pipeline, and the first
//! death cross landing on a synthetic bar is reported. Crosses inside the
//! real history are ignored.

use crate::error::Result;
use crate::pipeline::IndicatorPipeline;
use crate::series::Series;
use crate::signals::cross::CrossScanner;
use crate::simulation::PathProjector;
use crate::types::Timestamp;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Outcome of searching a projected tail for a death cross
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathCrossProjection {
    pub found: bool,
    /// Index in the extended series
    pub cross_index: Option<usize>,
    pub cross_date: Option<Timestamp>,
    /// 1 when the cross fires on the first projected bar
    pub bars_ahead: Option<usize>,
    pub projected_close: Option<f64>,
    pub projected_bars: usize,
}

impl DeathCrossProjection {
    fn not_found(projected_bars: usize) -> Self {
        Self {
            found: false,
            cross_index: None,
            cross_date: None,
            bars_ahead: None,
            projected_close: None,
            projected_bars,
        }
    }
}

/// Project `series` forward and look for the fast EMA falling below the slow
/// one inside the projection.
///
/// The pipeline must compute the scanner's EMA pair, otherwise the scan
/// fails with `MissingIndicator`.
pub fn projected_death_cross<R: Rng + ?Sized>(
    series: &Series,
    pipeline: &IndicatorPipeline,
    scanner: &CrossScanner,
    projector: &PathProjector,
    rng: &mut R,
) -> Result<DeathCrossProjection> {
    let real_len = series.len();
    let extended = projector.extend(series, rng);
    let projected_bars = extended.len() - real_len;

    let points = pipeline.run(&extended)?;
    let Some(index) = scanner.first_death_cross_from(&points, real_len)? else {
        log::debug!("No death cross in {} projected bars", projected_bars);
        return Ok(DeathCrossProjection::not_found(projected_bars));
    };

    let bar = &points[index].point;
    log::info!(
        "Projected death cross {} bars ahead at {:.2}",
        index + 1 - real_len,
        bar.close
    );
    Ok(DeathCrossProjection {
        found: true,
        cross_index: Some(index),
        cross_date: Some(bar.timestamp),
        bars_ahead: Some(index + 1 - real_len),
        projected_close: Some(bar.close),
        projected_bars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::simulation::ProjectionParams;
    use crate::types::PricePoint;
    use chrono::{Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn series_from(closes: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Series::normalize(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| {
                    PricePoint::new(start + Duration::days(i as i64), c, c, c, c, 1_000.0)
                })
                .collect(),
        )
        .unwrap()
    }

    fn setup(drift: f64) -> (IndicatorPipeline, CrossScanner, PathProjector) {
        (
            IndicatorPipeline::new(PipelineConfig::default().with_emas(5, 12)).unwrap(),
            CrossScanner::new(5, 12).unwrap(),
            PathProjector::new(ProjectionParams::default().with_drift(drift)).unwrap(),
        )
    }

    #[test]
    fn test_falling_projection_crosses_on_first_bar() {
        // Flat history has zero volatility, so the tail follows the drift exactly
        let series = series_from(&[100.0; 40]);
        let (pipeline, scanner, projector) = setup(-5.0);
        let result = projected_death_cross(
            &series,
            &pipeline,
            &scanner,
            &projector,
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap();

        assert!(result.found);
        assert_eq!(result.cross_index, Some(40));
        assert_eq!(result.bars_ahead, Some(1));
        assert_eq!(result.projected_bars, 20);
        assert!((result.projected_close.unwrap() - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_historical_cross_is_ignored() {
        // Falls then recovers: a death cross inside the real bars only
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        closes.extend((0..30).map(|i| 81.0 + 2.0 * i as f64));
        let series = series_from(&closes);
        let (pipeline, scanner, projector) = setup(5.0);

        let points = pipeline.run(&series).unwrap();
        assert!(scanner.latest_death_cross(&points).unwrap().is_some());

        let result = projected_death_cross(
            &series,
            &pipeline,
            &scanner,
            &projector,
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap();
        assert!(!result.found);
        assert_eq!(result.bars_ahead, None);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.2).sin() * 6.0).collect();
        let series = series_from(&closes);
        let (pipeline, scanner, projector) = setup(-0.5);

        let a = projected_death_cross(&series, &pipeline, &scanner, &projector, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let b = projected_death_cross(&series, &pipeline, &scanner, &projector, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(a, b);
        if let Some(i) = a.cross_index {
            assert!(i >= series.len());
        }
    }
}
