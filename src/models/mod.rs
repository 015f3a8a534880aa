//! Core data models for boundary classification.

pub mod boundary;
pub mod classification;

pub use boundary::{parse_coordinates, BoundaryPoint, BoundaryRecord, PointSequence};
pub use classification::{ClassificationResult, ClassificationSummary, ExportRow, Outcome};
