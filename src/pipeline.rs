//! End-to-end classification run.
//!
//! The two inputs load concurrently; classification starts only once both
//! have loaded. A failure in either phase ends the run before anything is
//! classified or written.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tokio::task::JoinError;
use tracing::info;

use crate::config::{Config, OutputConfig};
use crate::error::{self, Phase, PhaseFailure, PipelineError};
use crate::export::{aggregate, write_drawables_geojson, write_export_csv, Aggregate};
use crate::loader::{load_records, load_reference, RecordLoad};
use crate::models::{ClassificationResult, ClassificationSummary};
use crate::pip::{ClassificationEngine, EdgeInclusive, GeometryIndex};

/// Both inputs, ready for classification
pub struct Inputs {
    pub records: RecordLoad,
    pub index: GeometryIndex,
}

/// Everything a completed run produced
#[derive(Debug)]
pub struct RunReport {
    pub results: Vec<ClassificationResult>,
    pub summary: ClassificationSummary,
    pub skipped_rows: usize,
    pub aggregate: Aggregate,
    /// False when there was nothing to export
    pub exported: bool,
}

/// Load the boundary table and the reference index concurrently.
///
/// When both phases fail, both failures are carried in the returned
/// [`PipelineError`].
pub async fn load_inputs(config: &Config) -> Result<Inputs> {
    let delimiter = config.delimiter_byte()?;
    let records_path = config.input.records.clone();
    let geometry_path = config.input.geometry.clone();
    let name_property = config.input.name_property.clone();
    let mode = config.input.mode;
    let duplicates = config.classification.duplicate_names;

    let records_task =
        tokio::task::spawn_blocking(move || load_records(&records_path, delimiter));
    let reference_task = tokio::task::spawn_blocking(move || {
        load_reference(&geometry_path, &name_property)
            .and_then(|document| GeometryIndex::build(document, mode, duplicates))
    });

    let (records, index) = tokio::join!(records_task, reference_task);
    let records = settle(Phase::Records, records);
    let index = settle(Phase::Reference, index);

    match (records, index) {
        (Ok(records), Ok(index)) => Ok(Inputs { records, index }),
        (records, index) => {
            let failures = [records.err(), index.err()].into_iter().flatten().collect();
            Err(PipelineError::new(failures).into())
        }
    }
}

fn settle<T>(
    phase: Phase,
    joined: std::result::Result<error::Result<T>, JoinError>,
) -> std::result::Result<T, PhaseFailure> {
    match joined {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(PhaseFailure::Load { phase, source }),
        Err(e) => Err(PhaseFailure::Aborted {
            phase,
            reason: e.to_string(),
        }),
    }
}

/// Classify all loaded records and summarize the outcome
pub fn classify_inputs<F>(
    inputs: &Inputs,
    config: &Config,
    on_record: F,
) -> (Vec<ClassificationResult>, ClassificationSummary)
where
    F: Fn() + Sync,
{
    let engine = ClassificationEngine::new(EdgeInclusive).parallel(config.classification.parallel);
    let results = engine.classify_with(&inputs.records.records, &inputs.index, on_record);
    let summary = ClassificationSummary::from_results(&results);

    info!(
        "Classified {} boundaries: {} mainland, {} not contained, {} unresolved, {} without valid points ({} invalid coordinate pairs)",
        summary.total,
        summary.mainland,
        summary.not_contained,
        summary.unresolved,
        summary.no_valid_points,
        summary.invalid_points
    );

    (results, summary)
}

/// Write the export artifact and, if configured, the drawables.
///
/// An empty aggregate writes nothing and returns `false`.
pub fn write_outputs(aggregate: &Aggregate, output: &OutputConfig) -> Result<bool> {
    if aggregate.is_empty() {
        info!("No mainland boundaries; nothing to export");
        return Ok(false);
    }

    let writer = create_output(&output.export)?;
    write_export_csv(&aggregate.export_rows, writer)
        .with_context(|| format!("Failed to write {}", output.export.display()))?;
    info!(
        "Exported {} mainland boundaries to {}",
        aggregate.len(),
        output.export.display()
    );

    if let Some(path) = &output.drawables {
        let mut writer = create_output(path)?;
        write_drawables_geojson(aggregate, &mut writer)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writer.flush()?;
        info!("Wrote drawables to {}", path.display());
    }

    Ok(true)
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Load, classify, aggregate and export in one call
pub async fn run(config: &Config) -> Result<RunReport> {
    let inputs = load_inputs(config).await?;
    let (results, summary) = classify_inputs(&inputs, config, || {});
    let aggregate = aggregate(&results);
    let exported = write_outputs(&aggregate, &config.output)?;

    Ok(RunReport {
        results,
        summary,
        skipped_rows: inputs.records.skipped_rows,
        aggregate,
        exported,
    })
}
