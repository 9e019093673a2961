//! # crossvision
//!
//! Indicator pipeline behind a stock charting dashboard.
//!
//! A raw OHLCV series is normalized once and then fed to independent
//! calculators (cumulative VWAP, OBV, the composite money-flow score, an EMA
//! pair and relative volume). The enriched series drives a golden-cross
//! scanner that reports what two entry rules would have returned.
//!
//! ## Example
//!
//! ```rust,no_run
//! use crossvision::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let series = crossvision::data::load_csv(Path::new("AAPL.csv"))?;
//!     let points = IndicatorPipeline::default().run(&series)?;
//!     let report = CrossScanner::default().what_if(&points, Interval::Daily)?;
//!
//!     if report.scenario1.found {
//!         println!("Entry at {:.2}: {:+.2}%", report.scenario1.entry_price, report.scenario1.profit_percent);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod fundamentals;
pub mod pipeline;
pub mod portfolio;
pub mod series;
pub mod signals;
pub mod simulation;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::config::PipelineConfig;
    pub use crate::error::{ChartError, Result};
    pub use crate::pipeline::{IndicatorPipeline, IndicatorPoint, MoneyFlowBand, VolumeColor};
    pub use crate::series::Series;
    pub use crate::signals::{CrossScanner, ScenarioResult, WhatIfReport};
    pub use crate::simulation::{PathProjector, ProjectionParams};
    pub use crate::types::*;
}
