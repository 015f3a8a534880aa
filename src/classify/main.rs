//! Mainland boundary classifier.
//!
//! Loads a boundary table and reference landmass geometry, classifies each
//! boundary, and writes the mainland subset as CSV (and optionally GeoJSON).

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mainland::config::Config;
use mainland::export::aggregate;
use mainland::pip::{DuplicatePolicy, IndexMode};
use mainland::pipeline::{classify_inputs, load_inputs, write_outputs};

#[derive(Parser, Debug)]
#[command(name = "classify")]
#[command(about = "Classify country boundaries as mainland or island/exclave")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Headerless boundary table (id, country code, country name, coordinates)
    #[arg(short, long)]
    records: Option<PathBuf>,

    /// GeoJSON reference geometry
    #[arg(short, long)]
    geometry: Option<PathBuf>,

    /// How reference geometry is matched to boundaries
    #[arg(long, value_enum)]
    mode: Option<IndexMode>,

    /// Feature property holding the country name
    #[arg(long)]
    name_property: Option<String>,

    /// Field delimiter of the boundary table
    #[arg(long)]
    delimiter: Option<char>,

    /// Handling of features that share a country name
    #[arg(long, value_enum)]
    duplicate_names: Option<DuplicatePolicy>,

    /// Export CSV path
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Also write mainland boundaries as GeoJSON
    #[arg(long)]
    drawables: Option<PathBuf>,

    /// Classify on a single thread
    #[arg(long)]
    sequential: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };

        if let Some(records) = self.records {
            config.input.records = records;
        }
        if let Some(geometry) = self.geometry {
            config.input.geometry = geometry;
        }
        if let Some(mode) = self.mode {
            config.input.mode = mode;
        }
        if let Some(name_property) = self.name_property {
            config.input.name_property = name_property;
        }
        if let Some(delimiter) = self.delimiter {
            config.input.delimiter = delimiter;
        }
        if let Some(duplicates) = self.duplicate_names {
            config.classification.duplicate_names = duplicates;
        }
        if let Some(export) = self.export {
            config.output.export = export;
        }
        if self.drawables.is_some() {
            config.output.drawables = self.drawables;
        }
        if self.sequential {
            config.classification.parallel = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.into_config()?;

    info!("Mainland classifier");
    info!("Records: {}", config.input.records.display());
    info!(
        "Reference: {} ({:?})",
        config.input.geometry.display(),
        config.input.mode
    );

    let inputs = load_inputs(&config).await?;

    let pb = ProgressBar::new(inputs.records.records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let (results, summary) = classify_inputs(&inputs, &config, || pb.inc(1));
    pb.finish_with_message("Classification complete");

    let aggregate = aggregate(&results);
    write_outputs(&aggregate, &config.output)?;

    info!(
        "Done: {} records ({} rows skipped), {} mainland",
        summary.total, inputs.records.skipped_rows, summary.mainland
    );

    Ok(())
}
