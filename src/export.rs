//! Result aggregation and export artifacts.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use geo::{LineString, Point, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use std::io::Write;

use crate::models::{ClassificationResult, ExportRow, PointSequence};

/// Header of the export artifact, named after [`ExportRow`]'s fields
pub const EXPORT_HEADER: [&str; 2] = ["boundaryId", "countryName"];

/// Mainland boundaries split into export rows and point sequences to draw.
///
/// Both vectors are in input order and `export_rows[i]` describes
/// `drawables[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub export_rows: Vec<ExportRow>,
    pub drawables: Vec<PointSequence>,
}

impl Aggregate {
    pub fn is_empty(&self) -> bool {
        self.export_rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.export_rows.len()
    }
}

/// Keep the mainland results, in order
pub fn aggregate(results: &[ClassificationResult]) -> Aggregate {
    let mut aggregate = Aggregate::default();
    for result in results.iter().filter(|r| r.is_mainland()) {
        aggregate.export_rows.push(ExportRow::from(result));
        aggregate.drawables.push(result.points.clone());
    }
    aggregate
}

/// Write the export artifact: a bare header line, then one row per entry
/// with every field double-quoted
pub fn write_export_csv<W: Write>(rows: &[ExportRow], mut writer: W) -> csv::Result<()> {
    writer.write_all(EXPORT_HEADER.join(",").as_bytes())?;
    writer.write_all(b"\n")?;

    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    for row in rows {
        csv_writer.write_record([row.boundary_id.as_str(), row.country_name.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Mainland boundaries as a GeoJSON FeatureCollection for a map viewer.
///
/// Invalid points are dropped. Three or more points become a closed Polygon,
/// fewer become a LineString or Point.
pub fn drawables_geojson(aggregate: &Aggregate) -> FeatureCollection {
    let features = aggregate
        .export_rows
        .iter()
        .zip(&aggregate.drawables)
        .filter_map(|(row, points)| {
            let mut feature = Feature::from(drawable_geometry(points)?);
            feature.set_property("boundaryId", row.boundary_id.as_str());
            feature.set_property("countryName", row.country_name.as_str());
            Some(feature)
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn write_drawables_geojson<W: Write>(aggregate: &Aggregate, writer: W) -> serde_json::Result<()> {
    serde_json::to_writer(writer, &drawables_geojson(aggregate))
}

fn drawable_geometry(points: &PointSequence) -> Option<Geometry> {
    if let Some(ring) = points.closed_ring() {
        let polygon = Polygon::new(LineString::from(ring), vec![]);
        return Some(Geometry::new(Value::from(&polygon)));
    }

    let coords: Vec<[f64; 2]> = points.valid().map(|p| [p.lon, p.lat]).collect();
    let value = match coords.as_slice() {
        [] => return None,
        [single] => Value::from(&Point::from(*single)),
        _ => Value::from(&LineString::from(coords)),
    };
    Some(Geometry::new(value))
}
