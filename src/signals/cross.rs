//! Golden-cross scanner and "what-if" entry simulation
//!
//! Finds the most recent bar where the fast EMA crosses above the slow EMA,
//! then evaluates two entry rules from that point and reports what holding
//! from each entry until the latest bar would have returned:
//!
//! - Scenario 1 (price confirmation): the first bar at or after the cross
//!   whose open and close are both above both EMAs.
//! - Scenario 2 (EMA/VWAP confirmation): the most recent bar after the cross
//!   where the slow EMA crosses above VWAP.
//!
//! Absence of a cross or of an entry is an ordinary outcome reported with
//! `found: false`, never an error.

use crate::config::{DEFAULT_FAST_EMA, DEFAULT_SLOW_EMA};
use crate::error::{ChartError, Result};
use crate::pipeline::{ema_column, IndicatorPoint};
use crate::types::{Interval, Timestamp};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Positions found by one scan of an enriched series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossEvent {
    /// Bar where the fast EMA first closed above the slow EMA
    pub cross_index: usize,
    pub scenario1_index: Option<usize>,
    pub scenario2_index: Option<usize>,
}

/// Outcome of entering at one rule's trigger and holding to the latest bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub found: bool,
    pub entry_index: Option<usize>,
    pub entry_date: Option<Timestamp>,
    pub entry_price: f64,
    pub latest_price: f64,
    pub profit_percent: f64,
    /// Whole calendar days between entry and latest bar, rounded up
    pub days_held: i64,
}

impl ScenarioResult {
    pub fn empty() -> Self {
        Self {
            found: false,
            entry_index: None,
            entry_date: None,
            entry_price: 0.0,
            latest_price: 0.0,
            profit_percent: 0.0,
            days_held: 0,
        }
    }

    fn entered(points: &[IndicatorPoint], entry_index: usize) -> Self {
        let entry = &points[entry_index].point;
        let latest = &points[points.len() - 1].point;

        Self {
            found: true,
            entry_index: Some(entry_index),
            entry_date: Some(entry.timestamp),
            entry_price: entry.close,
            latest_price: latest.close,
            profit_percent: (latest.close - entry.close) / entry.close * 100.0,
            days_held: days_between(entry.timestamp, latest.timestamp),
        }
    }
}

/// Full what-if report for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfReport {
    /// False for intervals the scanner does not cover
    pub applicable: bool,
    /// True when a golden cross exists
    pub found: bool,
    pub cross_index: Option<usize>,
    pub cross_date: Option<Timestamp>,
    pub scenario1: ScenarioResult,
    pub scenario2: ScenarioResult,
}

impl WhatIfReport {
    fn empty(applicable: bool) -> Self {
        Self {
            applicable,
            found: false,
            cross_index: None,
            cross_date: None,
            scenario1: ScenarioResult::empty(),
            scenario2: ScenarioResult::empty(),
        }
    }
}

/// Scans an enriched series for golden crosses of one EMA pair
#[derive(Debug, Clone)]
pub struct CrossScanner {
    fast_period: usize,
    slow_period: usize,
}

impl CrossScanner {
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self> {
        if fast_period == 0 || slow_period == 0 || fast_period == slow_period {
            return Err(ChartError::InvalidParameter(format!(
                "EMA pair must be two distinct positive periods, got {} and {}",
                fast_period, slow_period
            )));
        }
        Ok(Self {
            fast_period,
            slow_period,
        })
    }

    fn emas_at(&self, point: &IndicatorPoint) -> Result<(f64, f64)> {
        let fast = point
            .ema(self.fast_period)
            .ok_or_else(|| ChartError::MissingIndicator(ema_column(self.fast_period)))?;
        let slow = point
            .ema(self.slow_period)
            .ok_or_else(|| ChartError::MissingIndicator(ema_column(self.slow_period)))?;
        Ok((fast, slow))
    }

    /// Most recent bar where `crossed(fast, slow, prev_fast, prev_slow)` holds
    fn latest_cross(
        &self,
        points: &[IndicatorPoint],
        crossed: impl Fn(f64, f64, f64, f64) -> bool,
    ) -> Result<Option<usize>> {
        if points.is_empty() {
            return Err(ChartError::EmptySeries);
        }

        for i in (1..points.len()).rev() {
            let (fast, slow) = self.emas_at(&points[i])?;
            let (prev_fast, prev_slow) = self.emas_at(&points[i - 1])?;

            if crossed(fast, slow, prev_fast, prev_slow) {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Index of the most recent golden cross, scanning backward from the end.
    ///
    /// Earlier crosses are never considered once a later one exists.
    pub fn latest_golden_cross(&self, points: &[IndicatorPoint]) -> Result<Option<usize>> {
        self.latest_cross(points, |fast, slow, prev_fast, prev_slow| {
            fast > slow && prev_fast <= prev_slow
        })
    }

    /// Index of the most recent death cross (fast EMA falling below the slow one)
    pub fn latest_death_cross(&self, points: &[IndicatorPoint]) -> Result<Option<usize>> {
        self.latest_cross(points, |fast, slow, prev_fast, prev_slow| {
            fast < slow && prev_fast >= prev_slow
        })
    }

    /// First death cross at or after `start`, scanning forward
    pub fn first_death_cross_from(
        &self,
        points: &[IndicatorPoint],
        start: usize,
    ) -> Result<Option<usize>> {
        if points.is_empty() {
            return Err(ChartError::EmptySeries);
        }

        for i in start.max(1)..points.len() {
            let (fast, slow) = self.emas_at(&points[i])?;
            let (prev_fast, prev_slow) = self.emas_at(&points[i - 1])?;

            if fast < slow && prev_fast >= prev_slow {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// First bar from the cross on whose open and close clear both EMAs
    fn price_confirmation(&self, points: &[IndicatorPoint], cross: usize) -> Result<Option<usize>> {
        for (i, point) in points.iter().enumerate().skip(cross) {
            let (fast, slow) = self.emas_at(point)?;
            let ceiling = fast.max(slow);
            if point.point.open > ceiling && point.point.close > ceiling {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Most recent bar after the cross where the slow EMA crosses above VWAP.
    ///
    /// Bars without a defined VWAP cannot confirm and are skipped.
    fn vwap_confirmation(&self, points: &[IndicatorPoint], cross: usize) -> Result<Option<usize>> {
        for i in ((cross + 1)..points.len()).rev() {
            let (_, slow) = self.emas_at(&points[i])?;
            let (_, prev_slow) = self.emas_at(&points[i - 1])?;

            if let (Some(vwap), Some(prev_vwap)) = (points[i].vwap, points[i - 1].vwap) {
                if slow > vwap && prev_slow <= prev_vwap {
                    return Ok(Some(i));
                }
            }
        }
        Ok(None)
    }

    /// Locate the latest cross and both scenario entries
    pub fn scan(&self, points: &[IndicatorPoint]) -> Result<Option<CrossEvent>> {
        let Some(cross_index) = self.latest_golden_cross(points)? else {
            return Ok(None);
        };

        Ok(Some(CrossEvent {
            cross_index,
            scenario1_index: self.price_confirmation(points, cross_index)?,
            scenario2_index: self.vwap_confirmation(points, cross_index)?,
        }))
    }

    /// Build the what-if report for a series of the given interval.
    ///
    /// Hourly series are not covered and come back with `applicable: false`.
    pub fn what_if(&self, points: &[IndicatorPoint], interval: Interval) -> Result<WhatIfReport> {
        if points.is_empty() {
            return Err(ChartError::EmptySeries);
        }
        if !interval.supports_what_if() {
            log::debug!("What-if scan skipped for {} interval", interval);
            return Ok(WhatIfReport::empty(false));
        }
        if points.len() < 2 {
            return Ok(WhatIfReport::empty(true));
        }

        let Some(event) = self.scan(points)? else {
            log::debug!("No golden cross in {} bars", points.len());
            return Ok(WhatIfReport::empty(true));
        };

        let scenario = |index: Option<usize>| match index {
            Some(i) => ScenarioResult::entered(points, i),
            None => ScenarioResult::empty(),
        };

        let report = WhatIfReport {
            applicable: true,
            found: true,
            cross_index: Some(event.cross_index),
            cross_date: Some(points[event.cross_index].point.timestamp),
            scenario1: scenario(event.scenario1_index),
            scenario2: scenario(event.scenario2_index),
        };

        log::info!(
            "Golden cross at bar {}: scenario1 found={}, scenario2 found={}",
            event.cross_index,
            report.scenario1.found,
            report.scenario2.found
        );
        Ok(report)
    }
}

impl Default for CrossScanner {
    fn default() -> Self {
        Self {
            fast_period: DEFAULT_FAST_EMA,
            slow_period: DEFAULT_SLOW_EMA,
        }
    }
}

/// Calendar days between two instants, rounded up
pub fn days_between(from: Timestamp, to: Timestamp) -> i64 {
    let millis = (to - from).num_milliseconds().abs() as f64;
    (millis / MILLIS_PER_DAY).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{MoneyFlowBand, VolumeColor, VolumeFlow};
    use crate::types::PricePoint;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn point(day: i64, close: f64, fast: f64, slow: f64, vwap: Option<f64>) -> IndicatorPoint {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::days(day);
        let mut emas = BTreeMap::new();
        emas.insert("ema50".to_string(), fast);
        emas.insert("ema135".to_string(), slow);

        IndicatorPoint {
            point: PricePoint::new(ts, close, close, close, close, 1_000.0),
            vwap,
            obv: 0.0,
            mfi: 50.0,
            money_flow_score: 50.0,
            money_flow_color: MoneyFlowBand::Neutral,
            volume_color: VolumeColor::Neutral,
            volume_ma: 0.0,
            volume_ratio: 1.0,
            volume_flow: VolumeFlow::Normal,
            emas,
        }
    }

    #[test]
    fn test_days_between_rounds_up() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(days_between(a, a), 0);
        assert_eq!(days_between(a, a + Duration::hours(25)), 2);
        assert_eq!(days_between(a + Duration::days(3), a), 3);
    }

    #[test]
    fn test_cross_on_last_bar_holds_zero_days() {
        let points = vec![
            point(0, 10.0, 9.0, 10.0, Some(12.0)),
            point(1, 12.0, 11.0, 10.0, Some(12.0)),
        ];
        let report = CrossScanner::default().what_if(&points, Interval::Daily).unwrap();

        assert!(report.found);
        assert_eq!(report.cross_index, Some(1));
        assert!(report.scenario1.found);
        assert_eq!(report.scenario1.days_held, 0);
        assert_eq!(report.scenario1.profit_percent, 0.0);
        assert!(!report.scenario2.found);
    }

    #[test]
    fn test_death_cross_after_golden_cross() {
        let points = vec![
            point(0, 10.0, 9.0, 10.0, None),
            point(1, 10.0, 11.0, 10.0, None),
            point(2, 10.0, 10.5, 10.0, None),
            point(3, 10.0, 9.5, 10.0, None),
            point(4, 10.0, 9.0, 10.0, None),
        ];
        let scanner = CrossScanner::default();
        assert_eq!(scanner.latest_golden_cross(&points).unwrap(), Some(1));
        assert_eq!(scanner.latest_death_cross(&points).unwrap(), Some(3));
        assert_eq!(scanner.first_death_cross_from(&points, 0).unwrap(), Some(3));
        assert_eq!(scanner.first_death_cross_from(&points, 4).unwrap(), None);
    }

    #[test]
    fn test_hourly_not_applicable() {
        let points = vec![point(0, 10.0, 9.0, 10.0, None), point(1, 12.0, 11.0, 10.0, None)];
        let report = CrossScanner::default().what_if(&points, Interval::Hourly).unwrap();
        assert!(!report.applicable);
        assert!(!report.found);
    }

    #[test]
    fn test_missing_ema_column_is_error() {
        let points = vec![point(0, 10.0, 9.0, 10.0, None), point(1, 12.0, 11.0, 10.0, None)];
        let scanner = CrossScanner::new(20, 60).unwrap();
        assert!(matches!(
            scanner.latest_golden_cross(&points),
            Err(ChartError::MissingIndicator(col)) if col == "ema20"
        ));
    }

    #[test]
    fn test_scenario2_skips_undefined_vwap() {
        let points = vec![
            point(0, 10.0, 9.0, 10.0, None),
            point(1, 10.0, 11.0, 10.0, None),
            point(2, 10.0, 11.0, 10.5, None),
            point(3, 10.0, 11.0, 10.5, Some(11.0)),
            point(4, 13.0, 12.0, 11.5, Some(11.2)),
        ];
        let event = CrossScanner::default().scan(&points).unwrap().unwrap();

        assert_eq!(event.cross_index, 1);
        assert_eq!(event.scenario2_index, Some(4));
    }

    #[test]
    fn test_single_bar_not_found_and_empty_is_error() {
        let scanner = CrossScanner::default();
        let one = vec![point(0, 10.0, 9.0, 10.0, None)];
        assert!(!scanner.what_if(&one, Interval::Weekly).unwrap().found);
        assert!(matches!(
            scanner.what_if(&[], Interval::Daily),
            Err(ChartError::EmptySeries)
        ));
        assert!(matches!(
            scanner.what_if(&[], Interval::Hourly),
            Err(ChartError::EmptySeries)
        ));
    }
}
