//! Input loading for boundary tables and reference geometry.

pub mod geojson;
pub mod records;

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::Result;

pub use geojson::{load_reference, parse_reference, DocumentKind, ReferenceDocument, ReferenceFeature};
pub use records::{load_records, parse_records, RecordLoad};

/// Open an input file, gunzipping it if the name ends in `.gz`
pub fn open_input(path: &Path) -> Result<Box<dyn Read + Send>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read + Send> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}
