//! Refinement regions.
//!
//! A region asks for `resolution` km inside its core and ramps linearly
//! outward across a band of `transition_width` km, reaching
//! `resolution + transition_width` at the outer edge.  Beyond the band it has
//! no influence (`+∞`), so the synthesizer's minimum ignores it.

use crate::coords::LatLon;
use crate::error::{Error, Result};
use crate::geodesy::{
    distance_km, distance_to_polygon_boundary_km, open_ring, point_in_polygon,
    polygon_area_deg2, polygon_self_intersects, EARTH_RADIUS_KM, KM_PER_DEGREE,
};
use crate::sphere::{SphericalCap, Vec3};

/// Round-off allowance (km) on the outer edge of a transition band.
const EDGE_TOLERANCE_KM: f64 = 1e-6;

/// Planar area (deg²) below which a polygon is considered degenerate.
const MIN_POLYGON_AREA_DEG2: f64 = 1e-12;

/// Planar spacing (degrees) of the edge points a polygon's cap is built from.
const CAP_SAMPLE_STEP_DEG: f64 = 0.5;

/// A sample location in both representations the regions need.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SamplePoint {
    pub ll: LatLon,
    pub v: Vec3,
}

impl SamplePoint {
    pub fn new(ll: LatLon) -> Self {
        Self { ll, v: Vec3::from_latlon(ll) }
    }
}

/// Linear ramp for a point `d_outside` km beyond a region's core edge.
fn ramp(resolution: f64, transition_width: f64, d_outside: f64) -> f64 {
    if d_outside <= transition_width + EDGE_TOLERANCE_KM {
        resolution + d_outside.clamp(0.0, transition_width)
    } else {
        f64::INFINITY
    }
}

fn validate_common(name: &str, resolution: f64, transition_width: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::config("region name must not be empty"));
    }
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(Error::config(format!(
            "region '{name}': resolution must be > 0 km, got {resolution}"
        )));
    }
    if !transition_width.is_finite() || transition_width < 0.0 {
        return Err(Error::config(format!(
            "region '{name}': transition width must be >= 0 km, got {transition_width}"
        )));
    }
    Ok(())
}

// ── Circle ────────────────────────────────────────────────────────────────────

/// A spherical cap of `radius` km around `center`.
#[derive(Debug, Clone, PartialEq)]
pub struct CircularRegion {
    name: String,
    resolution: f64,
    transition_width: f64,
    center: LatLon,
    radius: f64,
}

impl CircularRegion {
    pub fn new(
        name: impl Into<String>,
        resolution: f64,
        transition_width: f64,
        center: LatLon,
        radius: f64,
    ) -> Result<Self> {
        let name = name.into();
        validate_common(&name, resolution, transition_width)?;
        if !center.is_valid() {
            return Err(Error::config(format!(
                "region '{name}': center ({}, {}) out of range",
                center.lat, center.lon
            )));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::config(format!(
                "region '{name}': radius must be > 0 km, got {radius}"
            )));
        }
        Ok(Self { name, resolution, transition_width, center, radius })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn transition_width(&self) -> f64 {
        self.transition_width
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    /// Radius of the core zone in km.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn contains(&self, p: LatLon) -> bool {
        distance_km(p, self.center) <= self.radius
    }

    /// Distance in km from `p` to the circle's edge, from either side.
    pub fn distance_to_boundary_km(&self, p: LatLon) -> f64 {
        (distance_km(p, self.center) - self.radius).abs()
    }

    /// Latitude band outside which this region is `+∞`.
    pub(crate) fn latitude_reach(&self) -> (f64, f64) {
        let reach_deg = (self.radius + self.transition_width + EDGE_TOLERANCE_KM) / KM_PER_DEGREE;
        (self.center.lat - reach_deg, self.center.lat + reach_deg)
    }

    pub fn local_resolution(&self, p: LatLon) -> f64 {
        let d = distance_km(p, self.center);
        if d <= self.radius {
            self.resolution
        } else {
            ramp(self.resolution, self.transition_width, d - self.radius)
        }
    }
}

// ── Polygon ───────────────────────────────────────────────────────────────────

/// A simple polygon of `(lat, lon)` vertices, implicitly closed.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRegion {
    name: String,
    resolution: f64,
    transition_width: f64,
    vertices: Vec<LatLon>,
    /// Planar `(min_lat, min_lon, max_lat, max_lon)` of the vertices.
    bounds: (f64, f64, f64, f64),
    /// Cap holding every boundary point, used to skip far-away samples.
    cap: SphericalCap,
}

impl PolygonRegion {
    /// Build a polygon region.
    ///
    /// A repeated closing vertex and consecutive duplicates are dropped.
    /// Fewer than three distinct vertices or a self-intersecting ring is a
    /// [`Error::Geometry`]; a ring with zero enclosed area is an
    /// [`Error::Configuration`].
    pub fn new(
        name: impl Into<String>,
        resolution: f64,
        transition_width: f64,
        vertices: Vec<LatLon>,
    ) -> Result<Self> {
        let name = name.into();
        validate_common(&name, resolution, transition_width)?;

        for v in &vertices {
            if !v.is_valid() {
                return Err(Error::config(format!(
                    "region '{name}': vertex ({}, {}) out of range",
                    v.lat, v.lon
                )));
            }
        }

        let mut vertices = vertices;
        vertices.dedup();
        let n = open_ring(&vertices).len();
        vertices.truncate(n);

        if vertices.len() < 3 {
            return Err(Error::geometry(format!(
                "region '{name}': polygon needs at least 3 distinct vertices, got {}",
                vertices.len()
            )));
        }
        if polygon_self_intersects(&vertices) {
            return Err(Error::geometry(format!(
                "region '{name}': polygon boundary intersects itself"
            )));
        }
        if polygon_area_deg2(&vertices) < MIN_POLYGON_AREA_DEG2 {
            return Err(Error::config(format!(
                "region '{name}': polygon encloses zero area"
            )));
        }

        let bounds = vertices.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(a, b, c, d), v| (a.min(v.lat), b.min(v.lon), c.max(v.lat), d.max(v.lon)),
        );
        // Samples along each edge are at most one step apart, so every
        // boundary point lies within one step of the sampled cap.
        let cap = SphericalCap::bounding(&edge_samples(&vertices))
            .padded(CAP_SAMPLE_STEP_DEG.to_radians());

        Ok(Self { name, resolution, transition_width, vertices, bounds, cap })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn transition_width(&self) -> f64 {
        self.transition_width
    }

    /// The ring as stored, without a closing duplicate.
    pub fn vertices(&self) -> &[LatLon] {
        &self.vertices
    }

    pub fn contains(&self, p: LatLon) -> bool {
        let (min_lat, min_lon, max_lat, max_lon) = self.bounds;
        (min_lat..=max_lat).contains(&p.lat)
            && (min_lon..=max_lon).contains(&p.lon)
            && point_in_polygon(p, &self.vertices)
    }

    /// Great-circle distance in km from `p` to the nearest edge.
    pub fn distance_to_boundary_km(&self, p: LatLon) -> f64 {
        distance_to_polygon_boundary_km(p, &self.vertices)
    }

    pub fn local_resolution(&self, p: LatLon) -> f64 {
        self.resolution_at(&SamplePoint::new(p))
    }

    /// Latitude band outside which this region is `+∞`: the vertex bounds
    /// (containment) joined with the cap plus the transition band.
    pub(crate) fn latitude_reach(&self) -> (f64, f64) {
        if !self.cap.is_convex() {
            return (-90.0, 90.0);
        }
        let center_lat = self.cap.center.to_latlon().lat;
        let reach_deg = self.cap.radius.to_degrees()
            + (self.transition_width + EDGE_TOLERANCE_KM) / KM_PER_DEGREE;
        let (min_lat, _, max_lat, _) = self.bounds;
        (min_lat.min(center_lat - reach_deg), max_lat.max(center_lat + reach_deg))
    }

    fn resolution_at(&self, p: &SamplePoint) -> f64 {
        if self.contains(p.ll) {
            return self.resolution;
        }
        if self.cap.is_convex() {
            let margin = (self.transition_width + EDGE_TOLERANCE_KM) / EARTH_RADIUS_KM;
            if !self.cap.within(p.v, margin) {
                return f64::INFINITY;
            }
        }
        let d = distance_to_polygon_boundary_km(p.ll, &self.vertices);
        ramp(self.resolution, self.transition_width, d)
    }
}

/// Points along the planar edges of a ring, no more than
/// [`CAP_SAMPLE_STEP_DEG`] apart.
fn edge_samples(ring: &[LatLon]) -> Vec<Vec3> {
    let n = ring.len();
    let mut out = Vec::new();
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        let len = (b.lat - a.lat).hypot(b.lon - a.lon);
        let steps = (len / CAP_SAMPLE_STEP_DEG).ceil().max(1.0) as usize;
        for k in 0..steps {
            let t = k as f64 / steps as f64;
            let p = LatLon::new(a.lat + t * (b.lat - a.lat), a.lon + t * (b.lon - a.lon));
            out.push(Vec3::from_latlon(p));
        }
    }
    out
}

// ── Region ────────────────────────────────────────────────────────────────────

/// A named refinement region.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Circle(CircularRegion),
    Polygon(PolygonRegion),
}

impl Region {
    pub fn circle(
        name: impl Into<String>,
        resolution: f64,
        transition_width: f64,
        center: LatLon,
        radius: f64,
    ) -> Result<Self> {
        CircularRegion::new(name, resolution, transition_width, center, radius).map(Region::Circle)
    }

    pub fn polygon(
        name: impl Into<String>,
        resolution: f64,
        transition_width: f64,
        vertices: Vec<LatLon>,
    ) -> Result<Self> {
        PolygonRegion::new(name, resolution, transition_width, vertices).map(Region::Polygon)
    }

    pub fn name(&self) -> &str {
        match self {
            Region::Circle(c) => c.name(),
            Region::Polygon(p) => p.name(),
        }
    }

    pub fn resolution(&self) -> f64 {
        match self {
            Region::Circle(c) => c.resolution(),
            Region::Polygon(p) => p.resolution(),
        }
    }

    pub fn transition_width(&self) -> f64 {
        match self {
            Region::Circle(c) => c.transition_width(),
            Region::Polygon(p) => p.transition_width(),
        }
    }

    /// Resolution reached at the outer edge of the transition band.
    pub fn transition_start(&self) -> f64 {
        self.resolution() + self.transition_width()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Region::Circle(_) => "circle",
            Region::Polygon(_) => "polygon",
        }
    }

    pub fn contains(&self, p: LatLon) -> bool {
        match self {
            Region::Circle(c) => c.contains(p),
            Region::Polygon(poly) => poly.contains(p),
        }
    }

    pub fn distance_to_boundary_km(&self, p: LatLon) -> f64 {
        match self {
            Region::Circle(c) => c.distance_to_boundary_km(p),
            Region::Polygon(poly) => poly.distance_to_boundary_km(p),
        }
    }

    /// This region's requested resolution at `p`, or `+∞` outside its reach.
    pub fn local_resolution(&self, p: LatLon) -> f64 {
        self.resolution_at(&SamplePoint::new(p))
    }

    pub(crate) fn latitude_reach(&self) -> (f64, f64) {
        match self {
            Region::Circle(c) => c.latitude_reach(),
            Region::Polygon(poly) => poly.latitude_reach(),
        }
    }

    pub(crate) fn resolution_at(&self, p: &SamplePoint) -> f64 {
        match self {
            Region::Circle(c) => c.local_resolution(p.ll),
            Region::Polygon(poly) => poly.resolution_at(p),
        }
    }
}
