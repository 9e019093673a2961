//! Exponential moving average engine

use crate::error::{ChartError, Result};
use crate::series::Series;
use crate::types::PriceField;

/// Exponential Moving Average (EMA)
///
/// Seeded with the first value and emitted from the very first update, with
/// no warm-up suppression. The cross scanner relies on a value existing at
/// every index.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    period: usize,
    multiplier: f64,
    current_ema: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create new EMA with given period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(ChartError::InvalidParameter(
                "EMA period must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
            current_ema: None,
        })
    }

    /// Update with new value
    pub fn update(&mut self, value: f64) -> f64 {
        let ema = match self.current_ema {
            None => value,
            Some(prev) => (value - prev) * self.multiplier + prev,
        };
        self.current_ema = Some(ema);
        ema
    }

    /// Compute EMA for a slice of values
    pub fn compute(period: usize, values: &[f64]) -> Result<Vec<f64>> {
        let mut ema = Self::new(period)?;
        Ok(values.iter().map(|&v| ema.update(v)).collect())
    }

    /// Get current EMA value
    pub fn current(&self) -> Option<f64> {
        self.current_ema
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Column name under which an EMA of `period` is published, e.g. `ema50`
pub fn ema_column(period: usize) -> String {
    format!("ema{}", period)
}

/// EMA of an arbitrary value column
pub fn ema_series(values: &[f64], period: usize) -> Result<Vec<f64>> {
    ExponentialMovingAverage::compute(period, values)
}

/// EMA of one price field over a whole series
pub fn ema_over(series: &Series, period: usize, field: PriceField) -> Result<Vec<f64>> {
    let values: Vec<f64> = series.iter().map(|p| p.price(field)).collect();
    ExponentialMovingAverage::compute(period, &values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ema() {
        let mut ema = ExponentialMovingAverage::new(3).unwrap();

        let v1 = ema.update(1.0);
        assert_eq!(v1, 1.0);

        let v2 = ema.update(2.0);
        assert_relative_eq!(v2, 1.5); // (2-1)*0.5 + 1

        let v3 = ema.update(3.0);
        assert_relative_eq!(v3, 2.25);
        assert_eq!(ema.current(), Some(v3));
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(matches!(
            ExponentialMovingAverage::new(0),
            Err(ChartError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_constant_input_stays_constant() {
        let values = vec![42.5; 60];
        let result = ema_series(&values, 10).unwrap();
        assert!(result.iter().all(|&v| v == 42.5));
    }

    #[test]
    fn test_ema_column_name() {
        assert_eq!(ema_column(50), "ema50");
        assert_eq!(ema_column(135), "ema135");
    }
}
