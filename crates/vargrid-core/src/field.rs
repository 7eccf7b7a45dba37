//! The sampled resolution field and its read-only accessors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::LatLon;
use crate::error::{Error, Result};

/// A sampled sizing field: target resolution (km) on a lat × lon grid.
///
/// Values are row-major with one row per latitude sample, so the value at
/// `(lat[row], lon[col])` lives at `row * width + col`.  Both axes are
/// strictly increasing.  The grid is produced once by the synthesizer and is
/// read-only afterwards; summary statistics are recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldGrid")]
pub struct FieldGrid {
    lat: Vec<f64>,
    lon: Vec<f64>,
    /// Row-major resolution values in km.
    data: Vec<f64>,
}

/// Serialized form, checked before it becomes a [`FieldGrid`].
#[derive(Deserialize)]
struct RawFieldGrid {
    lat: Vec<f64>,
    lon: Vec<f64>,
    data: Vec<f64>,
}

impl TryFrom<RawFieldGrid> for FieldGrid {
    type Error = Error;

    fn try_from(raw: RawFieldGrid) -> Result<Self> {
        FieldGrid::new(raw.lat, raw.lon, raw.data)
    }
}

/// Non-empty, finite, within `[-bound, bound]` and strictly increasing.
pub(crate) fn check_axis(label: &str, axis: &[f64], bound: f64) -> Result<()> {
    if axis.is_empty() {
        return Err(Error::config(format!("{label} axis is empty")));
    }
    if let Some(v) = axis.iter().find(|v| !v.is_finite() || v.abs() > bound) {
        return Err(Error::config(format!("{label} sample {v} outside [-{bound}, {bound}]")));
    }
    if axis.windows(2).any(|w| w[1] <= w[0]) {
        return Err(Error::config(format!("{label} samples must be strictly increasing")));
    }
    Ok(())
}

impl FieldGrid {
    /// Build a grid from axes and row-major values, checking the shape, the
    /// axes and that every value is a finite positive resolution.
    pub fn new(lat: Vec<f64>, lon: Vec<f64>, data: Vec<f64>) -> Result<Self> {
        check_axis("latitude", &lat, 90.0)?;
        check_axis("longitude", &lon, 180.0)?;
        if data.len() != lat.len() * lon.len() {
            return Err(Error::config(format!(
                "{} values for a {} × {} grid",
                data.len(),
                lat.len(),
                lon.len()
            )));
        }
        if let Some(v) = data.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(Error::config(format!("resolution value {v} is not a positive number")));
        }
        Ok(Self { lat, lon, data })
    }

    /// Assemble a grid from axes and row-major values.
    ///
    /// Only the synthesizer builds grids, and it guarantees
    /// `data.len() == lat.len() * lon.len()`.
    pub(crate) fn from_parts(lat: Vec<f64>, lon: Vec<f64>, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), lat.len() * lon.len());
        Self { lat, lon, data }
    }

    /// Latitude samples in degrees, south to north.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Longitude samples in degrees, west to east.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Row-major resolution values in km.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Number of longitude samples.
    pub fn width(&self) -> usize {
        self.lon.len()
    }

    /// Number of latitude samples.
    pub fn height(&self) -> usize {
        self.lat.len()
    }

    pub fn point_count(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width() + col]
    }

    pub fn min_resolution(&self) -> f64 {
        self.data.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    pub fn max_resolution(&self) -> f64 {
        self.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Sample the field at `p` using bilinear interpolation.
    /// Returns None if `p` is outside the sampled extent.
    pub fn sample(&self, p: LatLon) -> Option<f64> {
        let (r0, r1, ty) = bracket(&self.lat, p.lat)?;
        let (c0, c1, tx) = bracket(&self.lon, p.lon)?;

        let v00 = self.get(r0, c0);
        let v01 = self.get(r0, c1);
        let v10 = self.get(r1, c0);
        let v11 = self.get(r1, c1);

        let v = v00 * (1.0 - tx) * (1.0 - ty)
            + v01 * tx * (1.0 - ty)
            + v10 * (1.0 - tx) * ty
            + v11 * tx * ty;
        Some(v)
    }

    /// Human-readable multi-line summary.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

/// Locate `x` on a strictly increasing axis: the two neighbouring indices and
/// the fractional position between them.
fn bracket(axis: &[f64], x: f64) -> Option<(usize, usize, f64)> {
    let (&first, &last) = (axis.first()?, axis.last()?);
    if !(first..=last).contains(&x) {
        return None;
    }
    if axis.len() == 1 {
        return Some((0, 0, 0.0));
    }
    // First index whose sample exceeds x, kept inside [1, len-1].
    let hi = axis.partition_point(|&a| a <= x).clamp(1, axis.len() - 1);
    let lo = hi - 1;
    let t = (x - axis[lo]) / (axis[hi] - axis[lo]);
    Some((lo, hi, t.clamp(0.0, 1.0)))
}

impl fmt::Display for FieldGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = |axis: &[f64]| match (axis.first(), axis.last()) {
            (Some(a), Some(b)) => format!("[{a:.3}, {b:.3}]"),
            _ => "[]".to_string(),
        };
        writeln!(f, "Sizing field")?;
        writeln!(f, "  latitude samples:  {} {}", self.height(), span(&self.lat))?;
        writeln!(f, "  longitude samples: {} {}", self.width(), span(&self.lon))?;
        writeln!(f, "  points:            {}", self.point_count())?;
        writeln!(f, "  min resolution:    {:.3} km", self.min_resolution())?;
        write!(f, "  max resolution:    {:.3} km", self.max_resolution())
    }
}
