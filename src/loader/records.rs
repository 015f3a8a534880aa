//! Boundary table loading.

use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use super::open_input;
use crate::error::Result;
use crate::models::BoundaryRecord;

/// Number of positional fields a row must carry
const FIELD_COUNT: usize = 4;

/// Records parsed from one table, plus how many rows were dropped
#[derive(Debug, Clone, Default)]
pub struct RecordLoad {
    pub records: Vec<BoundaryRecord>,
    pub skipped_rows: usize,
}

/// Load a headerless boundary table from disk (`.gz` is decompressed)
pub fn load_records(path: &Path, delimiter: u8) -> Result<RecordLoad> {
    info!("Loading boundary records from {}", path.display());
    let reader = open_input(path)?;
    let load = parse_records(reader, delimiter)?;
    info!(
        "Loaded {} boundary records ({} rows skipped)",
        load.records.len(),
        load.skipped_rows
    );
    Ok(load)
}

/// Parse rows of `boundaryId, countryCode, countryName, coordinates`.
///
/// Rows with fewer than four fields, or that fail to decode, are skipped.
/// Blank lines are ignored. Only an I/O failure aborts the load.
pub fn parse_records<R: Read>(reader: R, delimiter: u8) -> Result<RecordLoad> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut load = RecordLoad::default();

    for result in csv_reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("Skipping undecodable row: {}", e);
                load.skipped_rows += 1;
                continue;
            }
        };

        if row.iter().all(str::is_empty) {
            continue;
        }

        if row.len() < FIELD_COUNT {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            warn!(
                "Skipping malformed row at line {}: {} of {} fields",
                line,
                row.len(),
                FIELD_COUNT
            );
            load.skipped_rows += 1;
            continue;
        }

        load.records.push(BoundaryRecord::new(&row[0], &row[1], &row[2], &row[3]));
    }

    Ok(load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_positional_rows() {
        let text = "B1,US,France,\"2.3 48.8:2.4 48.8:2.4 48.9:2.3 48.9\"\nB2,NO,Norway,10 60\n";
        let load = parse_records(text.as_bytes(), b',').unwrap();

        assert_eq!(load.skipped_rows, 0);
        assert_eq!(load.records.len(), 2);
        assert_eq!(
            load.records[0],
            BoundaryRecord::new("B1", "US", "France", "2.3 48.8:2.4 48.8:2.4 48.9:2.3 48.9")
        );
        assert_eq!(load.records[1].country_name, "Norway");
        assert_eq!(load.records[1].raw_coordinates, "10 60");
    }

    #[test]
    fn test_short_rows_skipped() {
        let text = "B1,US,France\nB2,NO,Norway,10 60\nB3\n";
        let load = parse_records(text.as_bytes(), b',').unwrap();

        assert_eq!(load.skipped_rows, 2);
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].boundary_id, "B2");
    }

    #[test]
    fn test_blank_lines_ignored() {
        let text = "\nB1,US,France,1 2\n\n   \nB2,NO,Norway,3 4\n";
        let load = parse_records(text.as_bytes(), b',').unwrap();

        assert_eq!(load.skipped_rows, 0);
        assert_eq!(load.records.len(), 2);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let text = "B1,US,France,1 2,extra\n";
        let load = parse_records(text.as_bytes(), b',').unwrap();
        assert_eq!(load.records[0].raw_coordinates, "1 2");
    }

    #[test]
    fn test_custom_delimiter() {
        let text = "B1;FR;France;1 2:3 4\n";
        let load = parse_records(text.as_bytes(), b';').unwrap();
        assert_eq!(load.records[0].raw_coordinates, "1 2:3 4");
    }

    #[test]
    fn test_load_gzipped_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("borders.csv.gz");
        let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"B1,FR,France,1 2\n").unwrap();
        encoder.finish().unwrap();

        let load = load_records(&path, b',').unwrap();
        assert_eq!(load.records.len(), 1);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_records(&dir.path().join("missing.csv"), b',').is_err());
    }
}
