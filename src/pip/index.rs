//! Reference geometry lookup by country name.

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use serde::Deserialize;
use tracing::{debug, info};

use super::ReferenceShape;
use crate::error::{LoadError, Result};
use crate::loader::ReferenceDocument;

/// How to index a reference document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    /// One geometry per country name, joined on the record's country name
    #[default]
    NameKeyed,
    /// Every geometry is a candidate for every boundary
    Flat,
}

/// What to do when two features share a country name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later feature replaces the earlier one
    #[default]
    LastWriteWins,
    /// Polygons of all same-named features are combined
    Merge,
}

/// Candidate geometries for classification, in either mode
#[derive(Debug, Clone)]
pub enum GeometryIndex {
    Flat(Vec<ReferenceShape>),
    NameKeyed(HashMap<String, ReferenceShape>),
}

impl GeometryIndex {
    /// Build an index from a loaded reference document.
    ///
    /// Name-keyed mode needs named features; a document without any is an
    /// error rather than an index that resolves nothing.
    pub fn build(
        document: ReferenceDocument,
        mode: IndexMode,
        duplicates: DuplicatePolicy,
    ) -> Result<Self> {
        match mode {
            IndexMode::Flat => Ok(Self::flat(document)),
            IndexMode::NameKeyed => Self::name_keyed(document, duplicates),
        }
    }

    /// Every geometry becomes a candidate; names are ignored
    pub fn flat(document: ReferenceDocument) -> Self {
        let shapes: Vec<ReferenceShape> = document
            .features
            .into_iter()
            .map(|f| ReferenceShape::new(f.geometry))
            .collect();
        info!("Flat reference index built with {} geometries", shapes.len());
        Self::Flat(shapes)
    }

    /// Map country name to geometry. Unnamed features are skipped.
    pub fn name_keyed(document: ReferenceDocument, duplicates: DuplicatePolicy) -> Result<Self> {
        if !document.kind.has_properties() {
            return Err(LoadError::UnsupportedDocument {
                expected: "a FeatureCollection for name-keyed mode",
                found: format!("{:?}", document.kind),
            });
        }

        let mut by_name: HashMap<String, ReferenceShape> = HashMap::new();
        let mut unnamed = 0;
        let mut duplicate_names = 0;

        for feature in document.features {
            let Some(name) = feature.name else {
                unnamed += 1;
                continue;
            };
            let shape = ReferenceShape::new(feature.geometry);

            match by_name.entry(name) {
                Entry::Occupied(mut existing) => {
                    duplicate_names += 1;
                    debug!("Duplicate reference name {:?} ({:?})", existing.key(), duplicates);
                    match duplicates {
                        DuplicatePolicy::LastWriteWins => {
                            existing.insert(shape);
                        }
                        DuplicatePolicy::Merge => existing.get_mut().merge(shape),
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(shape);
                }
            }
        }

        info!(
            "Name-keyed reference index built with {} countries ({} unnamed skipped, {} duplicates)",
            by_name.len(),
            unnamed,
            duplicate_names
        );
        if by_name.is_empty() {
            return Err(LoadError::EmptyReference { skipped: unnamed });
        }
        Ok(Self::NameKeyed(by_name))
    }

    /// Geometries a boundary of `country_name` is tested against.
    ///
    /// Name-keyed: at most one. Flat: all of them, regardless of name.
    pub fn resolve_candidates(&self, country_name: &str) -> &[ReferenceShape] {
        match self {
            GeometryIndex::Flat(shapes) => shapes,
            GeometryIndex::NameKeyed(by_name) => by_name
                .get(country_name)
                .map(std::slice::from_ref)
                .unwrap_or(&[]),
        }
    }

    pub fn mode(&self) -> IndexMode {
        match self {
            GeometryIndex::Flat(_) => IndexMode::Flat,
            GeometryIndex::NameKeyed(_) => IndexMode::NameKeyed,
        }
    }

    /// Number of indexed geometries
    pub fn len(&self) -> usize {
        match self {
            GeometryIndex::Flat(shapes) => shapes.len(),
            GeometryIndex::NameKeyed(by_name) => by_name.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{DocumentKind, ReferenceFeature};
    use crate::models::BoundaryPoint;
    use crate::pip::contains;
    use geo::{polygon, MultiPolygon};

    fn feature(name: Option<&str>, x0: f64, y0: f64) -> ReferenceFeature {
        let poly = polygon![
            (x: x0, y: y0),
            (x: x0 + 1.0, y: y0),
            (x: x0 + 1.0, y: y0 + 1.0),
            (x: x0, y: y0 + 1.0),
        ];
        ReferenceFeature {
            name: name.map(str::to_string),
            geometry: MultiPolygon::new(vec![poly]),
        }
    }

    fn document(features: Vec<ReferenceFeature>) -> ReferenceDocument {
        ReferenceDocument {
            kind: DocumentKind::FeatureCollection,
            features,
            skipped: 0,
        }
    }

    #[test]
    fn test_name_keyed_lookup() {
        let doc = document(vec![feature(Some("France"), 0.0, 0.0), feature(None, 5.0, 5.0)]);
        let index = GeometryIndex::build(doc, IndexMode::NameKeyed, DuplicatePolicy::LastWriteWins).unwrap();

        assert_eq!(index.mode(), IndexMode::NameKeyed);
        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve_candidates("France").len(), 1);
        assert!(index.resolve_candidates("Atlantis").is_empty());
        assert!(index.resolve_candidates("france").is_empty());
    }

    #[test]
    fn test_duplicate_last_write_wins() {
        let doc = document(vec![
            feature(Some("Norway"), 0.0, 0.0),
            feature(Some("Norway"), 10.0, 10.0),
        ]);
        let index = GeometryIndex::build(doc, IndexMode::NameKeyed, DuplicatePolicy::LastWriteWins).unwrap();
        let candidates = index.resolve_candidates("Norway");

        assert_eq!(candidates.len(), 1);
        assert!(contains(&BoundaryPoint::new(10.5, 10.5), &candidates[0]));
        assert!(!contains(&BoundaryPoint::new(0.5, 0.5), &candidates[0]));
    }

    #[test]
    fn test_duplicate_merge() {
        let doc = document(vec![
            feature(Some("Norway"), 0.0, 0.0),
            feature(Some("Norway"), 10.0, 10.0),
        ]);
        let index = GeometryIndex::build(doc, IndexMode::NameKeyed, DuplicatePolicy::Merge).unwrap();
        let candidates = index.resolve_candidates("Norway");

        assert_eq!(candidates.len(), 1);
        assert!(contains(&BoundaryPoint::new(10.5, 10.5), &candidates[0]));
        assert!(contains(&BoundaryPoint::new(0.5, 0.5), &candidates[0]));
    }

    #[test]
    fn test_flat_ignores_names() {
        let doc = document(vec![feature(Some("France"), 0.0, 0.0), feature(None, 5.0, 5.0)]);
        let index = GeometryIndex::build(doc, IndexMode::Flat, DuplicatePolicy::LastWriteWins).unwrap();

        assert_eq!(index.mode(), IndexMode::Flat);
        assert_eq!(index.resolve_candidates("Atlantis").len(), 2);
        assert_eq!(index.resolve_candidates("").len(), 2);
    }

    #[test]
    fn test_name_keyed_rejects_unnamed_collection() {
        let doc = ReferenceDocument {
            kind: DocumentKind::GeometryCollection,
            features: vec![feature(None, 0.0, 0.0)],
            skipped: 0,
        };
        let err = GeometryIndex::build(doc, IndexMode::NameKeyed, DuplicatePolicy::LastWriteWins)
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedDocument { .. }));
    }

    #[test]
    fn test_name_keyed_rejects_all_unnamed_features() {
        let doc = document(vec![feature(None, 0.0, 0.0), feature(None, 5.0, 5.0)]);
        let err = GeometryIndex::build(doc, IndexMode::NameKeyed, DuplicatePolicy::Merge)
            .unwrap_err();
        assert!(matches!(err, LoadError::EmptyReference { skipped: 2 }));
    }

    #[test]
    fn test_flat_accepts_unnamed_collection() {
        let doc = ReferenceDocument {
            kind: DocumentKind::GeometryCollection,
            features: vec![feature(None, 0.0, 0.0)],
            skipped: 0,
        };
        let index = GeometryIndex::build(doc, IndexMode::Flat, DuplicatePolicy::LastWriteWins).unwrap();
        assert_eq!(index.resolve_candidates("France").len(), 1);
    }
}
