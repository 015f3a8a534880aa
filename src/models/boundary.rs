//! Boundary records and their coordinate sequences.

use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Separator between "lon lat" pairs in a raw coordinate string
pub const PAIR_DELIMITER: char = ':';

/// Separator between longitude and latitude within a pair
pub const AXIS_DELIMITER: char = ' ';

/// One row of the boundary table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryRecord {
    pub boundary_id: String,
    pub country_code: String,
    pub country_name: String,
    /// `"lon lat:lon lat:..."`
    pub raw_coordinates: String,
}

impl BoundaryRecord {
    pub fn new(
        boundary_id: impl Into<String>,
        country_code: impl Into<String>,
        country_name: impl Into<String>,
        raw_coordinates: impl Into<String>,
    ) -> Self {
        Self {
            boundary_id: boundary_id.into(),
            country_code: country_code.into(),
            country_name: country_name.into(),
            raw_coordinates: raw_coordinates.into(),
        }
    }

    /// Parse the raw coordinate string into points
    pub fn points(&self) -> PointSequence {
        parse_coordinates(&self.raw_coordinates)
    }
}

/// A (latitude, longitude) pair.
///
/// Either coordinate may be NaN when the source token did not parse; such a
/// point is kept in its sequence (order matters for drawing) but never
/// satisfies containment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub lat: f64,
    pub lon: f64,
}

impl BoundaryPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn invalid() -> Self {
        Self {
            lat: f64::NAN,
            lon: f64::NAN,
        }
    }

    /// Both coordinates are finite
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// As a planar point (x = lon, y = lat)
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Ordered points of one boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointSequence(Vec<BoundaryPoint>);

impl PointSequence {
    pub fn new(points: Vec<BoundaryPoint>) -> Self {
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundaryPoint> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BoundaryPoint] {
        &self.0
    }

    pub fn valid(&self) -> impl Iterator<Item = &BoundaryPoint> {
        self.0.iter().filter(|p| p.is_valid())
    }

    pub fn invalid_count(&self) -> usize {
        self.0.iter().filter(|p| !p.is_valid()).count()
    }

    /// Valid points as a closed `[lon, lat]` ring, or `None` if fewer than
    /// three valid points remain
    pub fn closed_ring(&self) -> Option<Vec<[f64; 2]>> {
        let mut ring: Vec<[f64; 2]> = self.valid().map(|p| [p.lon, p.lat]).collect();
        if ring.len() < 3 {
            return None;
        }
        if ring.first() != ring.last() {
            ring.push(ring[0]);
        }
        Some(ring)
    }
}

impl FromIterator<BoundaryPoint> for PointSequence {
    fn from_iter<I: IntoIterator<Item = BoundaryPoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse `"lon1 lat1:lon2 lat2:..."` into (lat, lon) points.
///
/// Empty input gives an empty sequence and empty segments are skipped. A
/// segment that is not exactly two finite numbers becomes an invalid point.
pub fn parse_coordinates(raw: &str) -> PointSequence {
    raw.split(PAIR_DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_pair)
        .collect()
}

fn parse_pair(segment: &str) -> BoundaryPoint {
    let mut tokens = segment.split(AXIS_DELIMITER).filter(|t| !t.is_empty());

    let (lon, lat) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(lon), Some(lat), None) => (parse_axis(lon), parse_axis(lat)),
        _ => return BoundaryPoint::invalid(),
    };

    match (lon, lat) {
        (Some(lon), Some(lat)) => BoundaryPoint::new(lat, lon),
        _ => BoundaryPoint::invalid(),
    }
}

fn parse_axis(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_swaps_to_lat_lon() {
        let points = parse_coordinates("2.3 48.8:2.4 48.9");
        assert_eq!(
            points.as_slice(),
            &[BoundaryPoint::new(48.8, 2.3), BoundaryPoint::new(48.9, 2.4)]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_coordinates("").is_empty());
        assert!(parse_coordinates("   ").is_empty());
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let points = parse_coordinates("1 2::3 4:");
        assert_eq!(points.len(), 2);
        assert_eq!(points.invalid_count(), 0);
    }

    #[test]
    fn test_non_numeric_token_is_invalid() {
        let points = parse_coordinates("abc 48.8");
        assert_eq!(points.len(), 1);
        assert!(!points.as_slice()[0].is_valid());
    }

    #[test]
    fn test_wrong_token_count_is_invalid() {
        let points = parse_coordinates("1:1 2 3:5 6");
        assert_eq!(points.len(), 3);
        assert_eq!(points.invalid_count(), 2);
        assert_eq!(points.as_slice()[2], BoundaryPoint::new(6.0, 5.0));
    }

    #[test]
    fn test_non_finite_token_is_invalid() {
        let points = parse_coordinates("inf 1:NaN 2");
        assert_eq!(points.invalid_count(), 2);
    }

    #[test]
    fn test_closed_ring() {
        let points = parse_coordinates("0 0:1 0:1 1:x 1");
        let ring = points.closed_ring().unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());

        assert!(parse_coordinates("0 0:1 1").closed_ring().is_none());
    }
}
