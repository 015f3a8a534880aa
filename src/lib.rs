//! Mainland - classifies country boundary segments as mainland or island/exclave
//!
//! This library loads boundary tables and reference landmass geometry, tests
//! boundary points against the landmass, and exports the mainland subset.

pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod models;
pub mod pip;
pub mod pipeline;

pub use models::{BoundaryPoint, BoundaryRecord, ClassificationResult, Outcome, PointSequence};
pub use pip::{ClassificationEngine, GeometryIndex};
