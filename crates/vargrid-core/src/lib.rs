//! Variable-resolution sizing fields for global meshes.
//!
//! A field assigns a target cell size in km to every point of a regular
//! lat/lon grid: a coarse background, refined inside circular and polygonal
//! regions, with a linear ramp across each region's transition band.

pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod field;
pub mod geodesy;
pub mod icosahedral;
pub mod region;
pub mod sphere;
pub mod synthesis;

pub use config::{Configuration, RegionSpec, TransitionSpec, DEFAULT_GRID_DENSITY};
pub use coords::LatLon;
pub use error::{Error, Result};
pub use export::{save_json, save_sizing_function, write_json, write_sizing_function};
pub use field::FieldGrid;
pub use geodesy::{distance_to_polygon_boundary_km, great_circle_distance_km, point_in_polygon};
pub use icosahedral::{icosahedral_cell_count, icosahedral_resolution, level_for_resolution};
pub use region::{CircularRegion, PolygonRegion, Region};
pub use synthesis::{
    icosahedral_field, sample_axes, synthesize, synthesize_config, uniform_field, FieldSynthesizer,
};
