//! Canonical price series
//!
//! Every calculator in the pipeline reads a [`Series`]: a non-empty sequence
//! of bars in ascending timestamp order, addressed by position. Gaps are not
//! filled and duplicates are not removed; both are the market-data source's
//! responsibility.

use crate::error::{ChartError, Result};
use crate::types::{PricePoint, Timestamp};
use serde::Serialize;
use std::ops::Index;

/// Ordered, non-empty sequence of price bars
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<PricePoint>,
}

impl Series {
    /// Shape raw bars into a series ordered by ascending timestamp.
    ///
    /// The sort is stable, so bars sharing a timestamp keep their input order
    /// and already-sorted input comes back unchanged.
    pub fn normalize(mut points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ChartError::EmptySeries);
        }

        points.sort_by_key(|p| p.timestamp);
        Ok(Self { points })
    }

    /// Append synthetic bars to the tail, returning a new series.
    ///
    /// Bars are re-normalized so the ordering invariant holds even if the
    /// caller hands over out-of-order points.
    pub fn extended(&self, tail: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points = self.points.clone();
        points.extend(tail);
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }

    /// Rebuild every bar with `f`; `f` must leave timestamps unchanged
    pub(crate) fn map_points(&self, f: impl FnMut(&PricePoint) -> PricePoint) -> Self {
        Self {
            points: self.points.iter().map(f).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.volume).collect()
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Number of bars flagged as synthetic
    pub fn synthetic_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_synthetic).count()
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }
}

impl Index<usize> for Series {
    type Output = PricePoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl TryFrom<Vec<PricePoint>> for Series {
    type Error = ChartError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::normalize(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(day: i64, close: f64) -> PricePoint {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day);
        PricePoint::new(ts, close, close + 1.0, close - 1.0, close, 100.0)
    }

    #[test]
    fn test_empty_series_rejected() {
        let err = Series::normalize(Vec::new()).unwrap_err();
        assert!(matches!(err, ChartError::EmptySeries));
    }

    #[test]
    fn test_normalize_sorts_ascending() {
        let series = Series::normalize(vec![bar(2, 3.0), bar(0, 1.0), bar(1, 2.0)]).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first().close, 1.0);
        assert_eq!(series.last().close, 3.0);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = Series::normalize(vec![bar(1, 2.0), bar(0, 1.0)]).unwrap();
        let twice = Series::normalize(once.clone().into_points()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicates_and_values_untouched() {
        let series = Series::normalize(vec![bar(0, 1.0), bar(0, 5.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_extended_leaves_input_untouched() {
        let series = Series::normalize(vec![bar(0, 1.0)]).unwrap();
        let mut tail = bar(1, 2.0);
        tail.is_synthetic = true;
        let extended = series.extended(vec![tail]);

        assert_eq!(series.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_eq!(extended.synthetic_count(), 1);
    }
}
