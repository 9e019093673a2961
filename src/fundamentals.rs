//! Per-bar valuation ratios from a current fundamentals snapshot

use crate::series::Series;
use serde::{Deserialize, Serialize};

/// Best-effort fundamentals for one symbol
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    /// Earnings per share (trailing, falling back to forward)
    pub eps: Option<f64>,
    pub book_value: Option<f64>,
}

impl Fundamentals {
    pub fn new(eps: Option<f64>, book_value: Option<f64>) -> Self {
        Self { eps, book_value }
    }

    /// Price-to-earnings at `close`
    pub fn pe(&self, close: f64) -> Option<f64> {
        ratio(close, self.eps)
    }

    /// Price-to-book at `close`
    pub fn pb(&self, close: f64) -> Option<f64> {
        ratio(close, self.book_value)
    }
}

fn ratio(close: f64, divisor: Option<f64>) -> Option<f64> {
    match divisor {
        Some(d) if d != 0.0 && d.is_finite() && close != 0.0 => Some(close / d),
        _ => None,
    }
}

/// Copy of `series` with `pe` and `pb` set on every bar
pub fn annotate(series: &Series, fundamentals: &Fundamentals) -> Series {
    series.map_points(|p| {
        let mut p = p.clone();
        p.pe = fundamentals.pe(p.close);
        p.pb = fundamentals.pb(p.close);
        p
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;
    use chrono::Utc;

    #[test]
    fn test_ratios() {
        let f = Fundamentals::new(Some(5.0), Some(20.0));
        assert_eq!(f.pe(100.0), Some(20.0));
        assert_eq!(f.pb(100.0), Some(5.0));

        let missing = Fundamentals::new(None, Some(0.0));
        assert_eq!(missing.pe(100.0), None);
        assert_eq!(missing.pb(100.0), None);
    }

    #[test]
    fn test_annotate_leaves_input_untouched() {
        let series =
            Series::normalize(vec![PricePoint::new(Utc::now(), 10.0, 11.0, 9.0, 10.0, 1.0)]).unwrap();
        let annotated = annotate(&series, &Fundamentals::new(Some(2.0), None));

        assert_eq!(annotated[0].pe, Some(5.0));
        assert_eq!(annotated[0].pb, None);
        assert_eq!(series[0].pe, None);
    }
}
