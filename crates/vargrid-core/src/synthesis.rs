//! Resolution field synthesis.
//!
//! Every sample starts at the background resolution and takes the minimum of
//! every region's local resolution.  The minimum is commutative, so the field
//! does not depend on region order, and the finest request always wins where
//! regions or their transition bands overlap.
//!
//! Samples are independent of one another.  With the `threading` feature the
//! rows are filled in parallel with rayon; the result is identical either way.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{check_background, check_grid_density, Configuration};
use crate::coords::LatLon;
use crate::error::{Error, Result};
use crate::field::{check_axis, FieldGrid};
use crate::icosahedral::icosahedral_resolution;
use crate::region::{Region, SamplePoint};

/// Upper bound on `lat × lon` samples in one grid.
pub const MAX_SAMPLE_POINTS: usize = 1 << 31;

/// Slack when deciding whether the last axis sample lands on the bound.
const AXIS_SNAP: f64 = 1e-9;

// ── Sample axes ───────────────────────────────────────────────────────────────

fn axis_len(min: f64, max: f64, step: f64) -> f64 {
    ((max - min) / step + AXIS_SNAP).floor() + 1.0
}

fn build_axis(min: f64, max: f64, step: f64) -> Vec<f64> {
    let n = axis_len(min, max, step) as usize;
    (0..n)
        .map(|i| {
            let v = min + i as f64 * step;
            if (max - v).abs() <= AXIS_SNAP * step.max(1.0) { max } else { v.min(max) }
        })
        .collect()
}

/// Latitude and longitude samples every `grid_density` degrees, covering
/// `[-90, 90] × [-180, 180]` from the south-west corner.
pub fn sample_axes(grid_density: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    check_grid_density(grid_density)?;
    let n_lat = axis_len(-90.0, 90.0, grid_density);
    let n_lon = axis_len(-180.0, 180.0, grid_density);
    if n_lat < 2.0 || n_lon < 2.0 {
        return Err(Error::config(format!(
            "grid density {grid_density} leaves fewer than two samples along an axis"
        )));
    }
    if n_lat * n_lon > MAX_SAMPLE_POINTS as f64 {
        return Err(Error::config(format!(
            "grid density {grid_density} needs {:.0} samples, more than {MAX_SAMPLE_POINTS}",
            n_lat * n_lon
        )));
    }
    Ok((build_axis(-90.0, 90.0, grid_density), build_axis(-180.0, 180.0, grid_density)))
}

// ── Validation ────────────────────────────────────────────────────────────────

fn check_regions(background_resolution: f64, regions: &[Region]) -> Result<()> {
    check_background(background_resolution)?;
    let mut seen = HashSet::new();
    for r in regions {
        if !seen.insert(r.name()) {
            return Err(Error::config(format!("duplicate region name '{}'", r.name())));
        }
        if r.resolution() >= background_resolution {
            warn!(
                region = r.name(),
                resolution = r.resolution(),
                background = background_resolution,
                "region is not finer than the background and has no effect"
            );
        }
    }
    Ok(())
}

// ── Evaluation ────────────────────────────────────────────────────────────────

/// Minimum of the background and every region at one point.
fn combine(background_resolution: f64, regions: &[&Region], p: &SamplePoint) -> f64 {
    regions
        .iter()
        .map(|r| r.resolution_at(p))
        .fold(background_resolution, f64::min)
}

fn fill_row(row: &mut [f64], lat: f64, lon: &[f64], background_resolution: f64, regions: &[Region]) {
    // Regions that cannot reach this latitude contribute +∞ everywhere on it.
    let active: Vec<&Region> = regions
        .iter()
        .filter(|r| {
            let (lo, hi) = r.latitude_reach();
            (lo..=hi).contains(&lat)
        })
        .collect();

    if active.is_empty() {
        row.fill(background_resolution);
        return;
    }
    for (cell, &x) in row.iter_mut().zip(lon) {
        let p = SamplePoint::new(LatLon::new(lat, x));
        *cell = combine(background_resolution, &active, &p);
    }
}

fn fill(background_resolution: f64, regions: &[Region], lat: &[f64], lon: &[f64]) -> Vec<f64> {
    let width = lon.len();
    let mut data = vec![background_resolution; lat.len() * width];

    #[cfg(feature = "threading")]
    {
        use rayon::prelude::*;
        data.par_chunks_mut(width)
            .zip(lat.par_iter())
            .for_each(|(row, &y)| fill_row(row, y, lon, background_resolution, regions));
    }
    #[cfg(not(feature = "threading"))]
    {
        data.chunks_mut(width)
            .zip(lat.iter())
            .for_each(|(row, &y)| fill_row(row, y, lon, background_resolution, regions));
    }

    data
}

fn run(
    background_resolution: f64,
    regions: &[Region],
    lat: &[f64],
    lon: &[f64],
) -> Result<FieldGrid> {
    check_regions(background_resolution, regions)?;
    check_axis("latitude", lat, 90.0)?;
    check_axis("longitude", lon, 180.0)?;
    if lat.len().saturating_mul(lon.len()) > MAX_SAMPLE_POINTS {
        return Err(Error::config(format!(
            "{} × {} samples exceed the limit of {MAX_SAMPLE_POINTS}",
            lat.len(),
            lon.len()
        )));
    }

    info!(
        rows = lat.len(),
        cols = lon.len(),
        regions = regions.len(),
        background = background_resolution,
        "synthesizing resolution field"
    );
    for r in regions {
        debug!(
            region = r.name(),
            kind = r.kind(),
            resolution = r.resolution(),
            transition_width = r.transition_width(),
            "region"
        );
    }

    let t = Instant::now();
    let data = fill(background_resolution, regions, lat, lon);
    let field = FieldGrid::from_parts(lat.to_vec(), lon.to_vec(), data);

    info!(
        points = field.point_count(),
        min_km = field.min_resolution(),
        max_km = field.max_resolution(),
        elapsed_ms = t.elapsed().as_millis() as u64,
        "resolution field complete"
    );
    Ok(field)
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Synthesize the field over explicit axes.
///
/// Fails before computing anything if the background or a region resolution
/// is not positive, two regions share a name, or an axis is empty,
/// out of range or not strictly increasing.
pub fn synthesize(
    background_resolution: f64,
    regions: &[Region],
    lat_samples: &[f64],
    lon_samples: &[f64],
) -> Result<FieldGrid> {
    run(background_resolution, regions, lat_samples, lon_samples)
}

/// Synthesize the field a configuration describes.
pub fn synthesize_config(config: &Configuration) -> Result<FieldGrid> {
    FieldSynthesizer::from_config(config)?.synthesize_with_density(config.grid_density)
}

/// A field with the same resolution everywhere.
pub fn uniform_field(resolution: f64, grid_density: f64) -> Result<FieldGrid> {
    FieldSynthesizer::new(resolution, Vec::new())?.synthesize_with_density(grid_density)
}

/// A uniform field at the resolution of an icosahedral subdivision level.
pub fn icosahedral_field(level: u32, grid_density: f64) -> Result<FieldGrid> {
    uniform_field(icosahedral_resolution(level)?, grid_density)
}

/// A validated background resolution and region set, ready to be sampled on
/// any grid.
#[derive(Debug, Clone)]
pub struct FieldSynthesizer {
    background_resolution: f64,
    regions: Vec<Region>,
}

impl FieldSynthesizer {
    pub fn new(background_resolution: f64, regions: Vec<Region>) -> Result<Self> {
        check_regions(background_resolution, &regions)?;
        Ok(Self { background_resolution, regions })
    }

    pub fn from_config(config: &Configuration) -> Result<Self> {
        Self::new(config.background_resolution, config.regions()?)
    }

    pub fn background_resolution(&self) -> f64 {
        self.background_resolution
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Resolution at a single point.
    pub fn resolution_at(&self, p: LatLon) -> f64 {
        let all: Vec<&Region> = self.regions.iter().collect();
        combine(self.background_resolution, &all, &SamplePoint::new(p))
    }

    pub fn synthesize(&self, lat_samples: &[f64], lon_samples: &[f64]) -> Result<FieldGrid> {
        run(self.background_resolution, &self.regions, lat_samples, lon_samples)
    }

    pub fn synthesize_with_density(&self, grid_density: f64) -> Result<FieldGrid> {
        let (lat, lon) = sample_axes(grid_density)?;
        self.synthesize(&lat, &lon)
    }
}
