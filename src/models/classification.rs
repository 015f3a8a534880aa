//! Classification outcomes and their export form.

use serde::{Deserialize, Serialize};

use super::boundary::PointSequence;

/// Why a boundary was or was not classified as mainland
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// At least one point lies inside a candidate geometry
    Mainland,
    /// Candidates existed but no valid point fell inside any of them
    NotContained,
    /// No reference geometry resolved for the country name
    Unresolved,
    /// The boundary has no valid points
    NoValidPoints,
}

impl Outcome {
    pub fn is_mainland(&self) -> bool {
        matches!(self, Outcome::Mainland)
    }
}

/// Per-boundary result of one classification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub boundary_id: String,
    pub country_name: String,
    pub outcome: Outcome,
    pub points: PointSequence,
}

impl ClassificationResult {
    pub fn is_mainland(&self) -> bool {
        self.outcome.is_mainland()
    }
}

/// One line of the export artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub boundary_id: String,
    pub country_name: String,
}

impl From<&ClassificationResult> for ExportRow {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            boundary_id: result.boundary_id.clone(),
            country_name: result.country_name.clone(),
        }
    }
}

/// Counts collected over a run, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub total: usize,
    pub mainland: usize,
    pub not_contained: usize,
    pub unresolved: usize,
    pub no_valid_points: usize,
    /// Coordinate pairs that failed to parse, across all boundaries
    pub invalid_points: usize,
}

impl ClassificationSummary {
    pub fn from_results(results: &[ClassificationResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result);
        }
        summary
    }

    pub fn record(&mut self, result: &ClassificationResult) {
        self.total += 1;
        self.invalid_points += result.points.invalid_count();
        match result.outcome {
            Outcome::Mainland => self.mainland += 1,
            Outcome::NotContained => self.not_contained += 1,
            Outcome::Unresolved => self.unresolved += 1,
            Outcome::NoValidPoints => self.no_valid_points += 1,
        }
    }
}
