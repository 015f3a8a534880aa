//! Error types for loading classification inputs

use thiserror::Error;

/// Failure to load one input as a whole.
///
/// Row- and point-level problems are not errors; they are skipped and counted.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Unsupported document: expected {expected}, found {found}")]
    UnsupportedDocument {
        expected: &'static str,
        found: String,
    },

    #[error("Reference geometry has no usable polygons ({skipped} entries skipped)")]
    EmptyReference { skipped: usize },
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Input phases that load independently before classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Records,
    Reference,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Records => write!(f, "boundary records"),
            Phase::Reference => write!(f, "reference geometry"),
        }
    }
}

/// Why one input phase produced nothing
#[derive(Error, Debug)]
pub enum PhaseFailure {
    #[error("could not load {phase}: {source}")]
    Load {
        phase: Phase,
        #[source]
        source: LoadError,
    },

    #[error("{phase} loader did not complete: {reason}")]
    Aborted { phase: Phase, reason: String },
}

impl PhaseFailure {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseFailure::Load { phase, .. } | PhaseFailure::Aborted { phase, .. } => *phase,
        }
    }
}

/// A run that stopped before classification, carrying every failed phase
#[derive(Debug)]
pub struct PipelineError {
    failures: Vec<PhaseFailure>,
}

impl PipelineError {
    pub fn new(failures: Vec<PhaseFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[PhaseFailure] {
        &self.failures
    }

    /// Failed phases, records first
    pub fn phases(&self) -> Vec<Phase> {
        self.failures.iter().map(PhaseFailure::phase).collect()
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mapping failed: ")?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|failure| failure as &(dyn std::error::Error + 'static))
    }
}
