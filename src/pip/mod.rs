//! Point-in-Polygon (PIP) mainland classification.
//!
//! Builds a reference index from landmass geometry and tests each boundary's
//! points against the geometries its country name resolves to.

mod geometry;
mod index;
mod service;

pub use geometry::{contains, Containment, EdgeInclusive, ReferenceShape};
pub use index::{DuplicatePolicy, GeometryIndex, IndexMode};
pub use service::ClassificationEngine;
