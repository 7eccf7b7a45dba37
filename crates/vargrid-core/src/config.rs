//! Input configuration: background resolution, sampling density and region
//! descriptors, as read from a JSON document.
//!
//! ```json
//! {
//!   "name": "goias",
//!   "background_resolution": 30.0,
//!   "grid_density": 0.5,
//!   "regions": [
//!     { "name": "Goiania_Metro", "type": "circle", "center": [-16.68, -49.25],
//!       "radius": 50.0, "resolution": 1.0, "transition_start": 3.0 },
//!     { "name": "Buffer", "type": "polygon",
//!       "polygon": [[-10, -54], [-10, -45], [-20, -45], [-20, -54]],
//!       "resolution": 5.0, "transition_width": 25.0 }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coords::LatLon;
use crate::error::{Error, Result};
use crate::region::Region;

/// Sample spacing in degrees when a configuration does not give one.
pub const DEFAULT_GRID_DENSITY: f64 = 0.1;

fn default_grid_density() -> f64 {
    DEFAULT_GRID_DENSITY
}

/// A complete field configuration.  Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Resolution in km wherever no region refines it.
    pub background_resolution: f64,
    /// Sample spacing in degrees; smaller is finer.
    #[serde(default = "default_grid_density")]
    pub grid_density: f64,
    #[serde(default)]
    pub regions: Vec<RegionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// How far a region's transition band reaches.
///
/// Either the band width in km, or the resolution reached at its outer edge
/// (`transition_start`); the width is then `transition_start - resolution`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransitionSpec {
    pub transition_width: Option<f64>,
    pub transition_start: Option<f64>,
}

impl TransitionSpec {
    pub fn new(transition_width: Option<f64>, transition_start: Option<f64>) -> Self {
        Self { transition_width, transition_start }
    }

    /// Resolve to a band width in km.
    pub fn width(&self, name: &str, resolution: f64) -> Result<f64> {
        let from_start = self.transition_start.map(|start| start - resolution);
        match (self.transition_width, from_start) {
            (Some(w), Some(s)) if (w - s).abs() > 1e-9 * w.abs().max(1.0) => Err(Error::config(
                format!("region '{name}': transition_width {w} disagrees with transition_start (implies {s})"),
            )),
            (Some(w), _) => Ok(w),
            (None, Some(s)) if s < 0.0 => Err(Error::config(format!(
                "region '{name}': transition_start must not be finer than resolution {resolution}"
            ))),
            (None, Some(s)) => Ok(s),
            (None, None) => Err(Error::config(format!(
                "region '{name}': one of transition_width or transition_start is required"
            ))),
        }
    }
}

/// One region descriptor, tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionSpec {
    Circle {
        name: String,
        resolution: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transition_width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transition_start: Option<f64>,
        /// `[lat, lon]` in degrees.
        center: [f64; 2],
        /// Core radius in km.
        radius: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Polygon {
        name: String,
        resolution: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transition_width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transition_start: Option<f64>,
        /// `[lat, lon]` vertices in degrees.
        #[serde(alias = "vertices")]
        polygon: Vec<[f64; 2]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl RegionSpec {
    pub fn name(&self) -> &str {
        match self {
            RegionSpec::Circle { name, .. } | RegionSpec::Polygon { name, .. } => name,
        }
    }

    /// Build and validate the region this descriptor names.
    pub fn build(&self) -> Result<Region> {
        match self {
            RegionSpec::Circle {
                name,
                resolution,
                transition_width,
                transition_start,
                center,
                radius,
                ..
            } => {
                let width = TransitionSpec::new(*transition_width, *transition_start)
                    .width(name, *resolution)?;
                Region::circle(name.clone(), *resolution, width, LatLon::new(center[0], center[1]), *radius)
            }
            RegionSpec::Polygon {
                name,
                resolution,
                transition_width,
                transition_start,
                polygon,
                ..
            } => {
                let width = TransitionSpec::new(*transition_width, *transition_start)
                    .width(name, *resolution)?;
                let vertices = polygon.iter().map(|v| LatLon::new(v[0], v[1])).collect();
                Region::polygon(name.clone(), *resolution, width, vertices)
            }
        }
    }
}

impl Configuration {
    /// A configuration with no regions.
    pub fn uniform(background_resolution: f64, grid_density: f64) -> Self {
        Self {
            name: None,
            description: None,
            background_resolution,
            grid_density,
            regions: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate everything and build the regions, in declaration order.
    pub fn regions(&self) -> Result<Vec<Region>> {
        check_background(self.background_resolution)?;
        check_grid_density(self.grid_density)?;
        let mut seen = HashSet::new();
        for spec in &self.regions {
            if !seen.insert(spec.name()) {
                return Err(Error::config(format!("duplicate region name '{}'", spec.name())));
            }
        }
        self.regions.iter().map(RegionSpec::build).collect()
    }

    pub fn validate(&self) -> Result<()> {
        self.regions().map(|_| ())
    }
}

pub(crate) fn check_background(background_resolution: f64) -> Result<()> {
    if background_resolution.is_finite() && background_resolution > 0.0 {
        Ok(())
    } else {
        Err(Error::config(format!(
            "background resolution must be > 0 km, got {background_resolution}"
        )))
    }
}

pub(crate) fn check_grid_density(grid_density: f64) -> Result<()> {
    if grid_density.is_finite() && grid_density > 0.0 {
        Ok(())
    } else {
        Err(Error::config(format!("grid density must be > 0, got {grid_density}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOIAS: &str = r#"{
        "description": "Multi-resolution nested grid",
        "author": "someone",
        "background_resolution": 30.0,
        "grid_density": 0.5,
        "regions": [
            {
                "name": "Regional_Buffer",
                "type": "polygon",
                "polygon": [[-10.0, -54.0], [-10.0, -45.0], [-20.0, -45.0], [-20.0, -54.0]],
                "resolution": 5.0,
                "transition_start": 30.0
            },
            {
                "name": "Goiania_Metro",
                "type": "circle",
                "center": [-16.68, -49.25],
                "radius": 50.0,
                "resolution": 1.0,
                "transition_width": 2.0,
                "description": "metro area"
            }
        ],
        "notes": ["coarse density for quick runs"]
    }"#;

    #[test]
    fn parses_and_builds_regions() {
        let cfg = Configuration::from_json_str(GOIAS).unwrap();
        assert_eq!(cfg.background_resolution, 30.0);
        assert_eq!(cfg.grid_density, 0.5);
        assert_eq!(cfg.notes.len(), 1);

        let regions = cfg.regions().unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].kind(), "polygon");
        assert_eq!(regions[0].transition_width(), 25.0);
        assert_eq!(regions[1].name(), "Goiania_Metro");
        assert_eq!(regions[1].transition_start(), 3.0);
    }

    #[test]
    fn grid_density_defaults() {
        let cfg = Configuration::from_json_str(r#"{"background_resolution": 60}"#).unwrap();
        assert_eq!(cfg.grid_density, DEFAULT_GRID_DENSITY);
        assert!(cfg.regions().unwrap().is_empty());
    }

    #[test]
    fn vertices_alias_is_accepted() {
        let json = r#"{"type": "polygon", "name": "p", "resolution": 3,
                       "transition_width": 0,
                       "vertices": [[0, 0], [0, 1], [1, 1]]}"#;
        let spec: RegionSpec = serde_json::from_str(json).unwrap();
        assert!(spec.build().is_ok());
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut cfg = Configuration::from_json_str(GOIAS).unwrap();
        let dup = cfg.regions[1].clone();
        cfg.regions.push(dup);
        let err = cfg.regions().unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("duplicate")), "{err}");
    }

    #[test]
    fn transition_rules() {
        let t = TransitionSpec::new;
        assert_eq!(t(Some(4.0), None).width("r", 1.0).unwrap(), 4.0);
        assert_eq!(t(None, Some(5.0)).width("r", 1.0).unwrap(), 4.0);
        assert_eq!(t(Some(4.0), Some(5.0)).width("r", 1.0).unwrap(), 4.0);
        assert!(t(Some(3.0), Some(5.0)).width("r", 1.0).is_err());
        assert!(t(None, Some(0.5)).width("r", 1.0).is_err());
        assert!(t(None, None).width("r", 1.0).is_err());
    }

    #[test]
    fn bad_scalars_rejected() {
        let mut cfg = Configuration::uniform(0.0, 0.1);
        assert!(matches!(cfg.validate(), Err(Error::Configuration(_))));
        cfg.background_resolution = 30.0;
        cfg.grid_density = -1.0;
        assert!(matches!(cfg.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn unknown_region_type_is_a_json_error() {
        let json = r#"{"background_resolution": 30, "regions": [{"type": "hexagon", "name": "h"}]}"#;
        assert!(matches!(Configuration::from_json_str(json), Err(Error::Json(_))));
    }

    #[test]
    fn serialises_back_to_equivalent_json() {
        let cfg = Configuration::from_json_str(GOIAS).unwrap();
        let text = serde_json::to_string(&cfg).unwrap();
        assert_eq!(Configuration::from_json_str(&text).unwrap(), cfg);
    }
}
