//! Synthetic "what if the trend continues" price paths

pub mod projector;

pub use projector::{
    realized_volatility, standard_normal, PathProjector, ProjectionParams,
};
