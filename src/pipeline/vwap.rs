//! Session-cumulative volume-weighted average price
//!
//! The running sums never reset, so on a multi-day series this is the VWAP
//! of the whole loaded history rather than a per-session VWAP.

use crate::series::Series;

/// Cumulative VWAP accumulator
#[derive(Debug, Clone, Default)]
pub struct Vwap {
    cumulative_pv: f64,
    cumulative_volume: f64,
}

impl Vwap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bar's typical price and volume.
    ///
    /// Returns `None` while cumulative volume is exactly zero: the ratio is
    /// undefined there and no price is substituted.
    pub fn update(&mut self, typical_price: f64, volume: f64) -> Option<f64> {
        self.cumulative_pv += typical_price * volume;
        self.cumulative_volume += volume;
        self.current()
    }

    pub fn current(&self) -> Option<f64> {
        if self.cumulative_volume == 0.0 {
            None
        } else {
            Some(self.cumulative_pv / self.cumulative_volume)
        }
    }
}

/// VWAP at every position of the series
pub fn vwap(series: &Series) -> Vec<Option<f64>> {
    let mut acc = Vwap::new();
    series
        .iter()
        .map(|p| acc.update(p.typical_price(), p.volume))
        .collect()
}
