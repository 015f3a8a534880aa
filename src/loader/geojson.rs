//! Reference geometry documents (GeoJSON).
//!
//! Only polygonal geometry is kept. Points, lines and degenerate members are
//! skipped and counted; a document with nothing usable is a load failure.

use geo::{MultiPolygon, Polygon};
use geojson::{Feature, GeoJson, Geometry, Value};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::open_input;
use crate::error::{LoadError, Result};

/// Closed rings need at least this many positions
const MIN_RING_LEN: usize = 4;

/// Top-level shape of a reference document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    GeometryCollection,
    FeatureCollection,
    Feature,
    Geometry,
}

impl DocumentKind {
    /// Whether members of this document can carry a name property
    pub fn has_properties(&self) -> bool {
        matches!(self, DocumentKind::FeatureCollection | DocumentKind::Feature)
    }
}

/// One polygonal member, with its name property if it had one
#[derive(Debug, Clone)]
pub struct ReferenceFeature {
    pub name: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone)]
pub struct ReferenceDocument {
    pub kind: DocumentKind,
    pub features: Vec<ReferenceFeature>,
    /// Members dropped for having no polygonal geometry
    pub skipped: usize,
}

/// Load a reference document from disk (`.gz` is decompressed)
pub fn load_reference(path: &Path, name_property: &str) -> Result<ReferenceDocument> {
    info!("Loading reference geometry from {}", path.display());
    let reader = open_input(path)?;
    let document = parse_reference(reader, name_property)?;
    info!(
        "Loaded {} reference geometries from {:?} ({} skipped)",
        document.features.len(),
        document.kind,
        document.skipped
    );
    Ok(document)
}

/// Parse a GeometryCollection, FeatureCollection, single Feature or bare
/// Polygon/MultiPolygon
pub fn parse_reference<R: Read>(reader: R, name_property: &str) -> Result<ReferenceDocument> {
    let document = GeoJson::from_reader(reader).map_err(geojson::Error::from)?;

    let mut features = Vec::new();
    let mut skipped = 0;
    let mut keep = |feature: Option<ReferenceFeature>| match feature {
        Some(feature) => features.push(feature),
        None => skipped += 1,
    };

    let kind = match document {
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                keep(reference_feature(feature, name_property));
            }
            DocumentKind::FeatureCollection
        }
        GeoJson::Feature(feature) => {
            keep(reference_feature(feature, name_property));
            DocumentKind::Feature
        }
        GeoJson::Geometry(geometry) => match geometry.value {
            Value::GeometryCollection(members) => {
                for member in members {
                    keep(polygonal(member).map(|geometry| ReferenceFeature {
                        name: None,
                        geometry,
                    }));
                }
                DocumentKind::GeometryCollection
            }
            Value::Polygon(_) | Value::MultiPolygon(_) => {
                keep(polygonal(geometry).map(|geometry| ReferenceFeature {
                    name: None,
                    geometry,
                }));
                DocumentKind::Geometry
            }
            other => {
                return Err(LoadError::UnsupportedDocument {
                    expected: "a GeoJSON collection or polygonal geometry",
                    found: other.type_name().to_string(),
                })
            }
        },
    };

    if features.is_empty() {
        return Err(LoadError::EmptyReference { skipped });
    }

    Ok(ReferenceDocument {
        kind,
        features,
        skipped,
    })
}

fn reference_feature(feature: Feature, name_property: &str) -> Option<ReferenceFeature> {
    let name = feature
        .property(name_property)
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let geometry = polygonal(feature.geometry?)?;
    Some(ReferenceFeature { name, geometry })
}

/// Polygonal content of a GeoJSON geometry, via the `geo-types` conversion
pub fn polygonal(geometry: Geometry) -> Option<MultiPolygon<f64>> {
    let geometry = match geo::Geometry::<f64>::try_from(geometry) {
        Ok(geometry) => geometry,
        Err(e) => {
            debug!("Ignoring unconvertible geometry: {}", e);
            return None;
        }
    };

    let mut polygons = Vec::new();
    collect_polygons(geometry, &mut polygons);
    if polygons.is_empty() {
        return None;
    }
    Some(MultiPolygon::new(polygons))
}

fn collect_polygons(geometry: geo::Geometry<f64>, polygons: &mut Vec<Polygon<f64>>) {
    match geometry {
        geo::Geometry::Polygon(polygon) => polygons.extend(non_degenerate(polygon)),
        geo::Geometry::MultiPolygon(multi) => {
            polygons.extend(multi.into_iter().filter_map(non_degenerate))
        }
        geo::Geometry::GeometryCollection(collection) => {
            for member in collection {
                collect_polygons(member, polygons);
            }
        }
        other => debug!("Ignoring non-polygonal geometry {:?}", other),
    }
}

/// Drop degenerate holes; a degenerate outer ring drops the polygon
fn non_degenerate(polygon: Polygon<f64>) -> Option<Polygon<f64>> {
    let (exterior, interiors) = polygon.into_inner();
    if exterior.0.len() < MIN_RING_LEN {
        return None;
    }
    let interiors = interiors
        .into_iter()
        .filter(|ring| ring.0.len() >= MIN_RING_LEN)
        .collect();
    Some(Polygon::new(exterior, interiors))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "[[[0,0],[10,0],[10,10],[0,10],[0,0]]]";

    #[test]
    fn test_geometry_collection() {
        let json = format!(
            r#"{{"type":"GeometryCollection","geometries":[
                {{"type":"Polygon","coordinates":{SQUARE}}},
                {{"type":"MultiPolygon","coordinates":[{SQUARE},{SQUARE}]}},
                {{"type":"Point","coordinates":[1,1]}}
            ]}}"#
        );
        let doc = parse_reference(json.as_bytes(), "NAME_EN").unwrap();

        assert_eq!(doc.kind, DocumentKind::GeometryCollection);
        assert!(!doc.kind.has_properties());
        assert_eq!(doc.features.len(), 2);
        assert_eq!(doc.features[1].geometry.0.len(), 2);
        assert_eq!(doc.skipped, 1);
        assert!(doc.features.iter().all(|f| f.name.is_none()));
    }

    #[test]
    fn test_feature_collection_names() {
        let json = format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature","properties":{{"NAME_EN":"Norway"}},"geometry":{{"type":"Polygon","coordinates":{SQUARE}}}}},
                {{"type":"Feature","properties":{{"NAME_EN":"  "}},"geometry":{{"type":"Polygon","coordinates":{SQUARE}}}}},
                {{"type":"Feature","properties":{{}},"geometry":null}}
            ]}}"#
        );
        let doc = parse_reference(json.as_bytes(), "NAME_EN").unwrap();

        assert_eq!(doc.kind, DocumentKind::FeatureCollection);
        assert!(doc.kind.has_properties());
        assert_eq!(doc.features.len(), 2);
        assert_eq!(doc.features[0].name.as_deref(), Some("Norway"));
        assert_eq!(doc.features[1].name, None);
        assert_eq!(doc.skipped, 1);
    }

    #[test]
    fn test_holes_parsed() {
        let json = r#"{"type":"Polygon","coordinates":[
            [[0,0],[10,0],[10,10],[0,10],[0,0]],
            [[4,4],[6,4],[6,6],[4,6],[4,4]],
            [[1,1],[2,2]]
        ]}"#;
        let doc = parse_reference(json.as_bytes(), "NAME_EN").unwrap();

        assert_eq!(doc.kind, DocumentKind::Geometry);
        assert_eq!(doc.features[0].geometry.0[0].interiors().len(), 1);
    }

    #[test]
    fn test_degenerate_polygon_dropped() {
        let json = r#"{"type":"GeometryCollection","geometries":[
            {"type":"Polygon","coordinates":[[[0,0],[10,10]]]}
        ]}"#;
        let err = parse_reference(json.as_bytes(), "NAME_EN").unwrap_err();
        assert!(matches!(err, LoadError::EmptyReference { skipped: 1 }));
    }

    #[test]
    fn test_bad_coordinates_fail_document() {
        let json = r#"{"type":"GeometryCollection","geometries":[
            {"type":"Polygon","coordinates":[[[0,0],["x",0],[10,10],[0,0]]]}
        ]}"#;
        let err = parse_reference(json.as_bytes(), "NAME_EN").unwrap_err();
        assert!(matches!(err, LoadError::GeoJson(_)));
    }

    #[test]
    fn test_not_json_is_error() {
        let err = parse_reference("not json".as_bytes(), "NAME_EN").unwrap_err();
        assert!(matches!(err, LoadError::GeoJson(_)));
    }

    #[test]
    fn test_unsupported_type() {
        let err = parse_reference(r#"{"type":"Point","coordinates":[0,0]}"#.as_bytes(), "NAME_EN")
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedDocument { .. }));
    }
}
