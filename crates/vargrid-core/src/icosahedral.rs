//! Icosahedral subdivision level ↔ approximate uniform resolution.
//!
//! Each subdivision level halves the cell spacing: level 4 ≈ 120 km down to
//! level 8 ≈ 7.5 km.

use crate::error::{Error, Result};

/// Lowest supported subdivision level.
pub const MIN_LEVEL: u32 = 4;
/// Highest supported subdivision level.
pub const MAX_LEVEL: u32 = 8;

/// Resolution in km of a hypothetical level 0 grid.
const LEVEL0_RESOLUTION_KM: f64 = 1920.0;

/// Relative slack when matching a resolution to a level.
const LEVEL_MATCH_TOLERANCE: f64 = 1e-9;

fn check_level(level: u32) -> Result<()> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(Error::UnsupportedLevel(format!(
            "level {level} outside supported range {MIN_LEVEL}..={MAX_LEVEL}"
        )))
    }
}

/// Approximate cell spacing in km for a subdivision level.
pub fn icosahedral_resolution(level: u32) -> Result<f64> {
    check_level(level)?;
    Ok(LEVEL0_RESOLUTION_KM / f64::from(1u32 << level))
}

/// Smallest supported level whose resolution does not exceed `resolution_km`.
///
/// Fails with [`Error::UnsupportedLevel`] when that level would be coarser
/// than [`MIN_LEVEL`] or when even [`MAX_LEVEL`] is too coarse.
pub fn level_for_resolution(resolution_km: f64) -> Result<u32> {
    if !resolution_km.is_finite() || resolution_km <= 0.0 {
        return Err(Error::config(format!(
            "resolution must be > 0 km, got {resolution_km}"
        )));
    }
    // resolution(level) <= km  ⇔  level >= log2(LEVEL0 / km)
    let exact = (LEVEL0_RESOLUTION_KM / resolution_km).log2();
    let level = (exact - LEVEL_MATCH_TOLERANCE).ceil();
    if level < f64::from(MIN_LEVEL) || level > f64::from(MAX_LEVEL) {
        return Err(Error::UnsupportedLevel(format!(
            "{resolution_km} km needs level {level}, outside supported range {MIN_LEVEL}..={MAX_LEVEL}"
        )));
    }
    Ok(level as u32)
}

/// Number of cells on the subdivided icosahedron (`10·4^(level+1) + 2`).
pub fn icosahedral_cell_count(level: u32) -> Result<u64> {
    check_level(level)?;
    Ok(10 * 4u64.pow(level + 1) + 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_resolutions() {
        let expected = [(4, 120.0), (5, 60.0), (6, 30.0), (7, 15.0), (8, 7.5)];
        for (level, km) in expected {
            assert_eq!(icosahedral_resolution(level).unwrap(), km, "level {level}");
        }
    }

    #[test]
    fn resolution_decreases_with_level() {
        let res: Vec<f64> = (MIN_LEVEL..=MAX_LEVEL)
            .map(|l| icosahedral_resolution(l).unwrap())
            .collect();
        assert!(res.windows(2).all(|w| w[1] < w[0]), "{res:?}");
    }

    #[test]
    fn round_trip_every_supported_level() {
        for level in MIN_LEVEL..=MAX_LEVEL {
            let km = icosahedral_resolution(level).unwrap();
            assert_eq!(level_for_resolution(km).unwrap(), level);
        }
    }

    #[test]
    fn picks_smallest_level_not_exceeding_request() {
        assert_eq!(level_for_resolution(100.0).unwrap(), 5);
        assert_eq!(level_for_resolution(119.0).unwrap(), 5);
        assert_eq!(level_for_resolution(130.0).unwrap(), 4);
        assert_eq!(level_for_resolution(10.0).unwrap(), 8);
    }

    #[test]
    fn out_of_range_levels_fail() {
        for level in [0, 3, 9, 12] {
            assert!(matches!(icosahedral_resolution(level), Err(Error::UnsupportedLevel(_))));
            assert!(matches!(icosahedral_cell_count(level), Err(Error::UnsupportedLevel(_))));
        }
        // Finer than level 8 or coarse enough to need level 3.
        assert!(matches!(level_for_resolution(5.0), Err(Error::UnsupportedLevel(_))));
        assert!(matches!(level_for_resolution(240.0), Err(Error::UnsupportedLevel(_))));
        assert!(matches!(level_for_resolution(0.0), Err(Error::Configuration(_))));
    }

    #[test]
    fn cell_counts() {
        assert_eq!(icosahedral_cell_count(4).unwrap(), 10_242);
        assert_eq!(icosahedral_cell_count(6).unwrap(), 163_842);
        assert_eq!(icosahedral_cell_count(8).unwrap(), 2_621_442);
    }
}
