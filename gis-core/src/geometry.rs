//! WKT geometry extraction for map rendering.
//!
//! Only the two shapes the network stores are understood: station and
//! incident `POINT`s and segment `LINESTRING`s. Hex-encoded EWKB cannot be
//! decoded here and maps to a fixed fallback position instead.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Prefix of little-endian EWKB carrying an SRID (`01 01000020`).
pub const BINARY_GEOMETRY_PREFIX: &str = "0101000020";

/// Substituted for binary geometry: the centre of the national network.
pub const FALLBACK_POSITION: LatLng = LatLng {
    lat: 31.7917,
    lng: -7.0926,
};

/// Map-library coordinate order: latitude first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(LatLng),
    LineString(Vec<LatLng>),
    /// Encoded in a format that cannot be decoded client-side.
    Unsupported,
    Invalid,
}

impl Geometry {
    /// Where a marker for this geometry goes. Binary geometry lands on
    /// [`FALLBACK_POSITION`]; lines and unreadable input have no marker.
    pub fn marker_position(&self) -> Option<LatLng> {
        match self {
            Geometry::Point(at) => Some(*at),
            Geometry::Unsupported => Some(FALLBACK_POSITION),
            Geometry::LineString(_) | Geometry::Invalid => None,
        }
    }

    /// Vertices of a drawable line; fewer than two vertices is not a line.
    pub fn polyline(&self) -> Option<&[LatLng]> {
        match self {
            Geometry::LineString(path) if path.len() >= 2 => Some(path),
            _ => None,
        }
    }
}

fn point_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:SRID=\d+;)?\s*POINT\s*\(([^)]*)\)\s*$").expect("valid regex")
    })
}

fn linestring_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:SRID=\d+;)?\s*LINESTRING\s*\(([^)]*)\)\s*$").expect("valid regex")
    })
}

/// Parses a stored geometry string.
pub fn parse(input: &str) -> Geometry {
    if let Some(caps) = point_pattern().captures(input) {
        return parse_vertex(&caps[1]).map_or(Geometry::Invalid, Geometry::Point);
    }

    if let Some(caps) = linestring_pattern().captures(input) {
        let vertices: Option<Vec<LatLng>> = caps[1].split(',').map(parse_vertex).collect();
        return vertices.map_or(Geometry::Invalid, Geometry::LineString);
    }

    if input.trim_start().starts_with(BINARY_GEOMETRY_PREFIX) {
        tracing::warn!(
            prefix = BINARY_GEOMETRY_PREFIX,
            "binary geometry cannot be decoded client-side, using fallback position"
        );
        return Geometry::Unsupported;
    }

    Geometry::Invalid
}

/// Absent geometry parses the same as unreadable geometry.
pub fn parse_field(field: Option<&str>) -> Geometry {
    field.map_or(Geometry::Invalid, parse)
}

/// `"<lng> <lat>"` → `LatLng`.
fn parse_vertex(raw: &str) -> Option<LatLng> {
    let mut parts = raw.split_whitespace();
    let lng: f64 = parts.next()?.parse().ok()?;
    let lat: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !lng.is_finite() || !lat.is_finite() {
        return None;
    }
    Some(LatLng { lat, lng })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_swaps_axis_order() {
        assert_eq!(
            parse("POINT(-7.62 33.57)"),
            Geometry::Point(LatLng::new(33.57, -7.62))
        );
    }

    #[test]
    fn point_tolerates_spacing_case_and_srid() {
        assert_eq!(
            parse("  SRID=4326;point ( -5.0078   34.0181 ) "),
            Geometry::Point(LatLng::new(34.0181, -5.0078))
        );
    }

    #[test]
    fn linestring_keeps_vertex_order() {
        let parsed = parse("LINESTRING(-7.0 33.5,-6.9 33.6, -6.8 33.7)");
        assert_eq!(
            parsed,
            Geometry::LineString(vec![
                LatLng::new(33.5, -7.0),
                LatLng::new(33.6, -6.9),
                LatLng::new(33.7, -6.8),
            ])
        );
        assert_eq!(parsed.polyline().map(<[LatLng]>::len), Some(3));
        assert_eq!(parsed.marker_position(), None);
    }

    #[test]
    fn single_vertex_line_is_not_drawable() {
        let parsed = parse("LINESTRING(-7.0 33.5)");
        assert!(matches!(parsed, Geometry::LineString(_)));
        assert_eq!(parsed.polyline(), None);
    }

    #[test]
    fn binary_geometry_uses_fallback() {
        let parsed = parse("0101000020E6100000A4703D0AD7A31EC0F6285C8FC2C54040");
        assert_eq!(parsed, Geometry::Unsupported);
        assert_eq!(parsed.marker_position(), Some(FALLBACK_POSITION));
    }

    #[test]
    fn anything_else_is_invalid() {
        for input in [
            "",
            "POLYGON((0 0, 1 1, 1 0, 0 0))",
            "POINT(abc 33.5)",
            "POINT(-7.62)",
            "POINT(-7.62 33.57 12)",
            "LINESTRING(-7.0 33.5, nope)",
            "POINT(NaN 33.5)",
            "hello",
        ] {
            assert_eq!(parse(input), Geometry::Invalid, "input: {input}");
        }
        assert_eq!(parse_field(None), Geometry::Invalid);
    }
}
