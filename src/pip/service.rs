//! Boundary classification against the reference index.

use rayon::prelude::*;
use tracing::{debug, warn};

use super::{Containment, EdgeInclusive, GeometryIndex};
use crate::models::{BoundaryRecord, ClassificationResult, Outcome, PointSequence};

/// Classifies boundaries as mainland or not.
///
/// A boundary is mainland when any of its valid points lies in any of the
/// geometries its country name resolves to. Records are independent, so
/// results do not depend on run order or parallelism.
pub struct ClassificationEngine<C = EdgeInclusive> {
    predicate: C,
    parallel: bool,
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new(EdgeInclusive)
    }
}

impl<C: Containment> ClassificationEngine<C> {
    pub fn new(predicate: C) -> Self {
        Self {
            predicate,
            parallel: true,
        }
    }

    /// Classify on the rayon pool (default) or on the calling thread
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Classify every record, preserving input order
    pub fn classify(
        &self,
        records: &[BoundaryRecord],
        index: &GeometryIndex,
    ) -> Vec<ClassificationResult> {
        self.classify_with(records, index, || {})
    }

    /// Like [`classify`](Self::classify), calling `on_record` after each record
    pub fn classify_with<F>(
        &self,
        records: &[BoundaryRecord],
        index: &GeometryIndex,
        on_record: F,
    ) -> Vec<ClassificationResult>
    where
        F: Fn() + Sync,
    {
        let classify = |record: &BoundaryRecord| {
            let result = self.classify_one(record, index);
            on_record();
            result
        };

        if self.parallel {
            records.par_iter().map(classify).collect()
        } else {
            records.iter().map(classify).collect()
        }
    }

    /// Classify a single record
    pub fn classify_one(&self, record: &BoundaryRecord, index: &GeometryIndex) -> ClassificationResult {
        let points = record.points();

        let invalid = points.invalid_count();
        if invalid > 0 {
            warn!(
                "Boundary {} has {} unparseable coordinate pair(s)",
                record.boundary_id, invalid
            );
        }

        let outcome = self.decide(&points, &record.country_name, index);
        debug!(
            "Boundary {} ({}): {:?}",
            record.boundary_id, record.country_name, outcome
        );

        ClassificationResult {
            boundary_id: record.boundary_id.clone(),
            country_name: record.country_name.clone(),
            outcome,
            points,
        }
    }

    fn decide(&self, points: &PointSequence, country_name: &str, index: &GeometryIndex) -> Outcome {
        if points.valid().next().is_none() {
            return Outcome::NoValidPoints;
        }

        let candidates = index.resolve_candidates(country_name);
        if candidates.is_empty() {
            return Outcome::Unresolved;
        }

        let inside = points.valid().any(|point| {
            candidates
                .iter()
                .any(|shape| self.predicate.contains(point, shape))
        });

        if inside {
            Outcome::Mainland
        } else {
            Outcome::NotContained
        }
    }
}
