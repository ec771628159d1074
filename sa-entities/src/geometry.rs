//! Point, line and polygon features.
//!
//! Geometries are read from WKT or GeoJSON and always written
//! as WKT. Only two-dimensional coordinates are supported.

use serde_json::{json, Value};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    /// The first ring is the exterior, all others are holes
    Polygon(Vec<Vec<Coord>>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryParseError {
    #[error("Unsupported geometry type: {0}")]
    UnsupportedType(String),
    #[error("Invalid coordinate: {0}")]
    Coordinate(String),
    #[error("Unbalanced parentheses")]
    Parentheses,
    #[error("A line needs at least two points")]
    LineTooShort,
    #[error("A polygon ring needs at least four points and must be closed")]
    InvalidRing,
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(String),
}

type Result<T> = std::result::Result<T, GeometryParseError>;

impl Geometry {
    pub const fn is_point(&self) -> bool {
        matches!(self, Self::Point(_))
    }

    pub fn to_wkt(&self) -> String {
        self.to_string()
    }

    pub fn to_geojson(&self) -> Value {
        let coord = |c: &Coord| json!([c.x, c.y]);
        match self {
            Self::Point(c) => json!({"type": "Point", "coordinates": coord(c)}),
            Self::LineString(cs) => json!({
                "type": "LineString",
                "coordinates": cs.iter().map(coord).collect::<Vec<_>>(),
            }),
            Self::Polygon(rings) => json!({
                "type": "Polygon",
                "coordinates": rings
                    .iter()
                    .map(|r| r.iter().map(coord).collect::<Vec<_>>())
                    .collect::<Vec<_>>(),
            }),
        }
    }

    /// Accepts either a WKT string or a GeoJSON geometry object.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => s.parse(),
            Value::Object(_) => Self::from_geojson(value),
            other => Err(GeometryParseError::GeoJson(other.to_string())),
        }
    }

    pub fn from_geojson(value: &Value) -> Result<Self> {
        let invalid = || GeometryParseError::GeoJson(value.to_string());
        let geom_type = value.get("type").and_then(Value::as_str).ok_or_else(invalid)?;
        let coordinates = value.get("coordinates").ok_or_else(invalid)?;
        let geometry = match geom_type {
            "Point" => Self::Point(geojson_coord(coordinates)?),
            "LineString" => Self::LineString(geojson_coords(coordinates)?),
            "Polygon" => Self::Polygon(
                coordinates
                    .as_array()
                    .ok_or_else(invalid)?
                    .iter()
                    .map(geojson_coords)
                    .collect::<Result<_>>()?,
            ),
            other => return Err(GeometryParseError::UnsupportedType(other.to_string())),
        };
        geometry.validate()
    }

    fn validate(self) -> Result<Self> {
        match &self {
            Self::Point(_) => {}
            Self::LineString(cs) => {
                if cs.len() < 2 {
                    return Err(GeometryParseError::LineTooShort);
                }
            }
            Self::Polygon(rings) => {
                if rings.is_empty() {
                    return Err(GeometryParseError::InvalidRing);
                }
                for ring in rings {
                    if ring.len() < 4 || ring.first() != ring.last() {
                        return Err(GeometryParseError::InvalidRing);
                    }
                }
            }
        }
        Ok(self)
    }
}

fn geojson_coord(value: &Value) -> Result<Coord> {
    let invalid = || GeometryParseError::Coordinate(value.to_string());
    let values = value.as_array().ok_or_else(invalid)?;
    match values.as_slice() {
        [x, y, ..] => Ok(Coord {
            x: x.as_f64().ok_or_else(invalid)?,
            y: y.as_f64().ok_or_else(invalid)?,
        }),
        _ => Err(invalid()),
    }
}

fn geojson_coords(value: &Value) -> Result<Vec<Coord>> {
    value
        .as_array()
        .ok_or_else(|| GeometryParseError::Coordinate(value.to_string()))?
        .iter()
        .map(geojson_coord)
        .collect()
}

fn parse_wkt_coord(s: &str) -> Result<Coord> {
    let mut parts = s.split_whitespace();
    let invalid = || GeometryParseError::Coordinate(s.trim().to_string());
    let x = parts.next().ok_or_else(invalid)?;
    let y = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    let number = |s: &str| match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(invalid()),
    };
    Ok(Coord {
        x: number(x)?,
        y: number(y)?,
    })
}

fn parse_wkt_coords(s: &str) -> Result<Vec<Coord>> {
    s.split(',').map(parse_wkt_coord).collect()
}

/// Strips one pair of enclosing parentheses.
fn unwrap_parens(s: &str) -> Result<&str> {
    let s = s.trim();
    s.strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or(GeometryParseError::Parentheses)
}

fn parse_wkt_rings(s: &str) -> Result<Vec<Vec<Coord>>> {
    let mut rings = Vec::new();
    let mut rest = s.trim();
    while !rest.is_empty() {
        let start = rest.find('(').ok_or(GeometryParseError::Parentheses)?;
        let end = rest.find(')').ok_or(GeometryParseError::Parentheses)?;
        if end < start {
            return Err(GeometryParseError::Parentheses);
        }
        rings.push(parse_wkt_coords(&rest[start + 1..end])?);
        rest = rest[end + 1..].trim_start().trim_start_matches(',');
    }
    Ok(rings)
}

impl FromStr for Geometry {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        // EWKT, e.g. "SRID=4326;POINT (1 2)"
        let s = match s.split_once(';') {
            Some((srid, wkt)) if srid.trim().to_ascii_uppercase().starts_with("SRID=") => wkt,
            _ => s,
        };
        let open = s.find('(').ok_or(GeometryParseError::Parentheses)?;
        let (geom_type, body) = s.split_at(open);
        let body = unwrap_parens(body)?;
        let geometry = match geom_type.trim().to_ascii_uppercase().as_str() {
            "POINT" => Self::Point(parse_wkt_coord(body)?),
            "LINESTRING" => Self::LineString(parse_wkt_coords(body)?),
            "POLYGON" => Self::Polygon(parse_wkt_rings(body)?),
            other => return Err(GeometryParseError::UnsupportedType(other.to_string())),
        };
        geometry.validate()
    }
}

struct WktCoords<'a>(&'a [Coord]);

impl fmt::Display for WktCoords<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", c.x, c.y)?;
        }
        Ok(())
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Point(c) => write!(f, "POINT ({} {})", c.x, c.y),
            Self::LineString(cs) => write!(f, "LINESTRING ({})", WktCoords(cs)),
            Self::Polygon(rings) => {
                f.write_str("POLYGON (")?;
                for (i, ring) in rings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({})", WktCoords(ring))?;
                }
                f.write_str(")")
            }
        }
    }
}
