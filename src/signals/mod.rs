//! Trading signals derived from an enriched series

pub mod cross;
pub mod projection;

pub use cross::{days_between, CrossEvent, CrossScanner, ScenarioResult, WhatIfReport};
pub use projection::{projected_death_cross, DeathCrossProjection};
