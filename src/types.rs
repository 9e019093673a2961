//! Core types and constants

use crate::error::{ChartError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Price type (using f64 for precision)
pub type Price = f64;

/// Volume type (integer-valued in practice, carried as a real)
pub type Volume = f64;

/// One OHLCV bar of a price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
    /// True only for bars appended by the path projector
    #[serde(default)]
    pub is_synthetic: bool,
    /// Price-to-earnings at this bar's close, when fundamentals are known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pe: Option<f64>,
    /// Price-to-book at this bar's close, when fundamentals are known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pb: Option<f64>,
}

impl PricePoint {
    /// Create a new real (non-synthetic) bar
    pub fn new(
        timestamp: Timestamp,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Volume,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            is_synthetic: false,
            pe: None,
            pb: None,
        }
    }

    /// Get typical price (HLC/3)
    pub fn typical_price(&self) -> Price {
        (self.high + self.low + self.close) / 3.0
    }

    /// Read one of the price fields
    pub fn price(&self, field: PriceField) -> Price {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::Typical => self.typical_price(),
        }
    }
}

/// Which price of a bar an indicator reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Typical,
}

impl Default for PriceField {
    fn default() -> Self {
        PriceField::Close
    }
}

/// Bar granularity requested from the market-data collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1h")]
    Hourly,
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
}

impl Interval {
    /// Nominal spacing between two consecutive bars
    pub fn bar_spacing(&self) -> Duration {
        match self {
            Interval::Hourly => Duration::hours(1),
            Interval::Daily => Duration::days(1),
            Interval::Weekly => Duration::weeks(1),
        }
    }

    /// How long an enriched response for this interval stays fresh
    pub fn cache_ttl(&self) -> Duration {
        match self {
            Interval::Hourly => Duration::minutes(15),
            Interval::Daily => Duration::hours(1),
            Interval::Weekly => Duration::days(1),
        }
    }

    /// The what-if scanner only runs on daily and weekly bars
    pub fn supports_what_if(&self) -> bool {
        matches!(self, Interval::Daily | Interval::Weekly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hourly => "1h",
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

impl FromStr for Interval {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "1h" | "hourly" | "hour" => Ok(Interval::Hourly),
            "1d" | "daily" | "day" => Ok(Interval::Daily),
            "1wk" | "1w" | "weekly" | "week" => Ok(Interval::Weekly),
            _ => Err(ChartError::InvalidInterval(s.to_string())),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
