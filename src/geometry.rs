//! Area of interest handling: ring validation and WKT rendering for catalogue queries
use crate::error::{Error, Result};
use geo_types::{Coord, Line, LineString, Polygon};
use serde::Deserialize;

/// A simple polygon in geographic coordinates (EPSG:4326, lon/lat order).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>")]
pub struct AreaOfInterest(Polygon<f64>);

impl AreaOfInterest {
    /// Build an area from a ring of `[lon, lat]` positions. An open ring is closed automatically.
    pub fn from_ring(ring: &[[f64; 2]]) -> Result<Self> {
        if let Some(position) = ring.iter().find(|p| !p[0].is_finite() || !p[1].is_finite()) {
            return Err(Error::Config(format!(
                "Area contains a non-finite coordinate: {position:?}"
            )));
        }

        // Repeated positions add zero-length segments that touch their non-neighbours
        let mut positions: Vec<Coord<f64>> =
            ring.iter().map(|p| Coord { x: p[0], y: p[1] }).collect();
        positions.dedup();
        let polygon = Polygon::new(LineString::new(positions), vec![]);

        // Closed ring of a triangle is the smallest valid area
        if polygon.exterior().0.len() < 4 {
            return Err(Error::Config(format!(
                "Area needs at least three distinct positions, got {}",
                ring.len()
            )));
        }
        if is_self_intersecting(polygon.exterior()) {
            return Err(Error::Config("Area ring intersects itself".to_string()));
        }
        if signed_area(polygon.exterior()) == 0.0 {
            return Err(Error::Config("Area ring encloses no area".to_string()));
        }

        Ok(Self(polygon))
    }

    pub fn polygon(self: &Self) -> &Polygon<f64> {
        &self.0
    }

    /// Well-known-text form, e.g. `POLYGON ((0 0, 1 0, 1 1, 0 0))`.
    pub fn wkt(self: &Self) -> String {
        let positions: Vec<String> = self
            .0
            .exterior()
            .coords()
            .map(|c| format!("{} {}", c.x, c.y))
            .collect();
        format!("POLYGON (({}))", positions.join(", "))
    }
}

impl TryFrom<Vec<[f64; 2]>> for AreaOfInterest {
    type Error = Error;

    fn try_from(ring: Vec<[f64; 2]>) -> Result<Self> {
        Self::from_ring(&ring)
    }
}

fn is_self_intersecting(ring: &LineString<f64>) -> bool {
    let segments: Vec<Line<f64>> = ring.lines().collect();
    let n = segments.len();

    for i in 0..n {
        for j in (i + 1)..n {
            // Neighbouring segments share an endpoint, the first and last one close the ring
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if !adjacent && segments_intersect(&segments[i], &segments[j]) {
                return true;
            }
        }
    }
    false
}

/// Shoelace sum over a closed ring, positive for counter-clockwise rings.
fn signed_area(ring: &LineString<f64>) -> f64 {
    ring.lines()
        .map(|l| l.start.x * l.end.y - l.end.x * l.start.y)
        .sum::<f64>()
        / 2.0
}

fn orientation(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn within_bounds(segment: &Line<f64>, p: Coord<f64>) -> bool {
    p.x >= segment.start.x.min(segment.end.x)
        && p.x <= segment.start.x.max(segment.end.x)
        && p.y >= segment.start.y.min(segment.end.y)
        && p.y <= segment.start.y.max(segment.end.y)
}

fn segments_intersect(p: &Line<f64>, q: &Line<f64>) -> bool {
    let d1 = orientation(q.start, q.end, p.start);
    let d2 = orientation(q.start, q.end, p.end);
    let d3 = orientation(p.start, p.end, q.start);
    let d4 = orientation(p.start, p.end, q.end);

    let straddles = |a: f64, b: f64| (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0);
    if straddles(d1, d2) && straddles(d3, d4) {
        return true;
    }

    (d1 == 0.0 && within_bounds(q, p.start))
        || (d2 == 0.0 && within_bounds(q, p.end))
        || (d3 == 0.0 && within_bounds(p, q.start))
        || (d4 == 0.0 && within_bounds(p, q.end))
}
