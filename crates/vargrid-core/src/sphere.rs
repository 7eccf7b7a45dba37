//! Unit-sphere vector math used to cull samples far from a polygon.

use crate::coords::LatLon;

/// A point on the unit sphere in Cartesian coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_latlon(p: LatLon) -> Self {
        let (lat, lon) = p.to_radians();
        Self {
            x: lat.cos() * lon.cos(),
            y: lat.cos() * lon.sin(),
            z: lat.sin(),
        }
    }

    pub fn to_latlon(self) -> LatLon {
        let lat = self.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = self.y.atan2(self.x).to_degrees();
        LatLon::new(lat, lon)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y, z: self.z + other.z }
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Self {
        let len = self.length();
        Self { x: self.x / len, y: self.y / len, z: self.z / len }
    }
}

/// Angle between two unit vectors in radians.
///
/// Uses `atan2(|a×b|, a·b)`, which stays accurate for nearly coincident
/// points where `acos` loses precision.
pub fn angular_distance(a: Vec3, b: Vec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

/// A spherical cap: every point within `radius` radians of `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCap {
    pub center: Vec3,
    pub radius: f64,
}

impl SphericalCap {
    /// Smallest cap centred on the normalized vertex mean that still holds
    /// every vertex.  Not the minimal enclosing cap, but always a bound.
    ///
    /// Returns a whole-sphere cap (radius π) when the mean vanishes.
    pub fn bounding(points: &[Vec3]) -> Self {
        let sum = points
            .iter()
            .fold(Vec3::new(0.0, 0.0, 0.0), |acc, &p| acc.add(p));
        if sum.length() < 1e-12 {
            return Self { center: Vec3::new(0.0, 0.0, 1.0), radius: std::f64::consts::PI };
        }
        let center = sum.normalize();
        let radius = points
            .iter()
            .map(|&p| angular_distance(center, p))
            .fold(0.0, f64::max);
        Self { center, radius }
    }

    /// The same cap grown by `margin` radians.
    pub fn padded(self, margin: f64) -> Self {
        Self { radius: (self.radius + margin).min(std::f64::consts::PI), ..self }
    }

    /// Whether the cap is a geodesically convex region, i.e. any minor arc
    /// between two of its points stays inside it.
    pub fn is_convex(&self) -> bool {
        self.radius < std::f64::consts::FRAC_PI_2
    }

    /// True if `p` lies within `margin` radians of the cap.
    pub fn within(&self, p: Vec3, margin: f64) -> bool {
        angular_distance(self.center, p) <= self.radius + margin
    }
}
