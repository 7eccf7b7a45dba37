//! Geodesy utilities: great-circle distance, degree/km conversion and the
//! polygon predicates used by polygonal regions.
//!
//! Polygon containment treats `(lon, lat)` as planar `(x, y)`.  This is a
//! regional-scale approximation: it is geodesically inexact for polygons
//! hundreds of kilometres across, and it does not handle rings that cross the
//! antimeridian or enclose a pole.  Boundary distance uses the same planar
//! edges, measured in km along the great circle to the nearest edge point.

use crate::coords::LatLon;

/// Mean Earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Length of one degree of arc on a great circle, in km.
pub const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Haversine distance in km on a sphere of radius [`EARTH_RADIUS_KM`].
///
/// The result lies in `[0, π·R]`.  Latitudes must be within ±90°; callers are
/// expected to have rejected anything else upstream.
pub fn great_circle_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    debug_assert!(lat1.abs() <= 90.0 && lat2.abs() <= 90.0, "latitude out of range");
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();
    let h = (dphi * 0.5).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda * 0.5).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Great-circle distance between two [`LatLon`] points in km.
pub fn distance_km(a: LatLon, b: LatLon) -> f64 {
    great_circle_distance_km(a.lat, a.lon, b.lat, b.lon)
}

/// Approximate east-west extent in km of `degrees` of longitude at
/// `at_latitude`.  For quick estimates only.
pub fn degrees_to_km(degrees: f64, at_latitude: f64) -> f64 {
    degrees * KM_PER_DEGREE * at_latitude.to_radians().cos()
}

/// Inverse of [`degrees_to_km`].  Grows without bound towards the poles.
pub fn km_to_degrees(km: f64, at_latitude: f64) -> f64 {
    km / (KM_PER_DEGREE * at_latitude.to_radians().cos())
}

/// The vertices of an implicitly closed ring, without a repeated closing
/// vertex if one was supplied.
pub fn open_ring(vertices: &[LatLon]) -> &[LatLon] {
    match vertices {
        [first, .., last] if vertices.len() > 1 && first == last => &vertices[..vertices.len() - 1],
        _ => vertices,
    }
}

/// Even-odd (ray casting) containment test.
///
/// Casts a ray towards increasing longitude and counts edge crossings.
/// Rings with fewer than three vertices contain nothing.
pub fn point_in_polygon(point: LatLon, vertices: &[LatLon]) -> bool {
    let ring = open_ring(vertices);
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let (x, y) = (point.lon, point.lat);
    let mut inside = false;
    for i in 0..n {
        let v0 = ring[i];
        let v1 = ring[(i + 1) % n];

        // Half-open span so a ray through a shared vertex is counted once.
        if (v0.lat > y) == (v1.lat > y) {
            continue;
        }
        let t = (y - v0.lat) / (v1.lat - v0.lat);
        let x_crossing = v0.lon + t * (v1.lon - v0.lon);
        if x_crossing > x {
            inside = !inside;
        }
    }
    inside
}

/// Great-circle distance in km from `point` to the nearest point of the
/// polygon boundary.
///
/// The boundary is made of the same straight `(lon, lat)` segments the
/// containment test uses, so the distance is zero exactly on the edges that
/// separate inside from outside.  The foot of the perpendicular on each
/// segment is found in a local equirectangular frame centred on `point`
/// (longitude scaled by `cos(lat)`), then measured with the haversine.
pub fn distance_to_polygon_boundary_km(point: LatLon, vertices: &[LatLon]) -> f64 {
    let ring = open_ring(vertices);
    let n = ring.len();
    match n {
        0 => f64::INFINITY,
        1 => distance_km(point, ring[0]),
        _ => (0..n)
            .map(|i| distance_to_segment_km(point, ring[i], ring[(i + 1) % n]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Distance in km from `point` to the planar segment `a`–`b`.
fn distance_to_segment_km(point: LatLon, a: LatLon, b: LatLon) -> f64 {
    let k = point.lat.to_radians().cos();
    let (ax, ay) = ((a.lon - point.lon) * k, a.lat - point.lat);
    let (dx, dy) = ((b.lon - a.lon) * k, b.lat - a.lat);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 { (-(ax * dx + ay * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
    let foot = LatLon::new(a.lat + t * (b.lat - a.lat), a.lon + t * (b.lon - a.lon));
    distance_km(point, foot)
}

/// Planar (shoelace) area of the ring in square degrees, always ≥ 0.
pub fn polygon_area_deg2(vertices: &[LatLon]) -> f64 {
    let ring = open_ring(vertices);
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            a.lon * b.lat - b.lon * a.lat
        })
        .sum();
    (twice * 0.5).abs()
}

/// True if any two non-adjacent edges of the ring properly cross.
///
/// Edges that merely touch at an endpoint, or overlap collinearly, are not
/// reported.
pub fn polygon_self_intersects(vertices: &[LatLon]) -> bool {
    let ring = open_ring(vertices);
    let n = ring.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let (a0, a1) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 2)..n {
            // First and last edges share vertex 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b0, b1) = (ring[j], ring[(j + 1) % n]);
            if segments_cross(a0, a1, b0, b1) {
                return true;
            }
        }
    }
    false
}

fn segments_cross(a0: LatLon, a1: LatLon, b0: LatLon, b1: LatLon) -> bool {
    let d1 = cross_sign(b0, b1, a0);
    let d2 = cross_sign(b0, b1, a1);
    let d3 = cross_sign(a0, a1, b0);
    let d4 = cross_sign(a0, a1, b1);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// `(b - a) × (c - a)` in the `(lon, lat)` plane.
fn cross_sign(a: LatLon, b: LatLon, c: LatLon) -> f64 {
    (b.lon - a.lon) * (c.lat - a.lat) - (b.lat - a.lat) * (c.lon - a.lon)
}
