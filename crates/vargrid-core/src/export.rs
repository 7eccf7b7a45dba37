//! Sizing-field export.
//!
//! Two record formats:
//!
//! * a JIGSAW `ELLIPSOID-GRID` text file (the `hfun` input of the external
//!   mesh generator): longitude and latitude axes in radians followed by one
//!   value per line, column-major so the value for `(lat[row], lon[col])` is
//!   record `col * nlat + row`;
//! * a JSON serialisation of [`FieldGrid`].
//!
//! Both write through a buffered writer that is flushed before returning.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::field::FieldGrid;
use crate::geodesy::EARTH_RADIUS_KM;

/// Write `field` as a JIGSAW ellipsoid-grid sizing function.
pub fn write_sizing_function<W: Write>(field: &FieldGrid, writer: W) -> Result<()> {
    let mut w = BufWriter::new(writer);
    let (nlat, nlon) = (field.height(), field.width());

    writeln!(w, "# sizing function: {nlat} x {nlon} lat/lon samples, values in km")?;
    writeln!(w, "MSHID=3;ELLIPSOID-GRID")?;
    writeln!(w, "MDIM=2")?;
    writeln!(w, "RADII={r:.6};{r:.6};{r:.6}", r = EARTH_RADIUS_KM)?;

    writeln!(w, "COORD=1;{nlon}")?;
    for lon in field.lon() {
        writeln!(w, "{:.16e}", lon.to_radians())?;
    }
    writeln!(w, "COORD=2;{nlat}")?;
    for lat in field.lat() {
        writeln!(w, "{:.16e}", lat.to_radians())?;
    }

    writeln!(w, "VALUE={};1", nlat * nlon)?;
    for col in 0..nlon {
        for row in 0..nlat {
            writeln!(w, "{:.16e}", field.get(row, col))?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Write the sizing function to `path`, creating or truncating it.
pub fn save_sizing_function(field: &FieldGrid, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_sizing_function(field, File::create(path)?)?;
    info!(path = %path.display(), points = field.point_count(), "sizing function written");
    Ok(())
}

/// Write `field` as pretty-printed JSON.
pub fn write_json<W: Write>(field: &FieldGrid, writer: W) -> Result<()> {
    let mut w = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut w, field)?;
    w.flush()?;
    Ok(())
}

pub fn save_json(field: &FieldGrid, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_json(field, File::create(path)?)?;
    info!(path = %path.display(), points = field.point_count(), "field json written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> FieldGrid {
        FieldGrid::from_parts(
            vec![-90.0, 0.0, 90.0],
            vec![-180.0, 180.0],
            vec![
                1.0, 2.0, //
                3.0, 4.0, //
                5.0, 6.0,
            ],
        )
    }

    fn render(field: &FieldGrid) -> String {
        let mut buf = Vec::new();
        write_sizing_function(field, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn jigsaw_header_and_sections() {
        let text = render(&grid());
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with('#'));
        assert_eq!(lines[1], "MSHID=3;ELLIPSOID-GRID");
        assert_eq!(lines[2], "MDIM=2");
        assert!(lines[3].starts_with("RADII=6371.000000;"));
        assert_eq!(lines[4], "COORD=1;2");
        assert_eq!(lines[7], "COORD=2;3");
        assert_eq!(lines[11], "VALUE=6;1");
        assert_eq!(lines.len(), 18);
    }

    #[test]
    fn jigsaw_axes_in_radians_and_values_column_major() {
        let text = render(&grid());
        let parse = |s: &str| s.parse::<f64>().unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!((parse(lines[5]) + std::f64::consts::PI).abs() < 1e-15);
        assert!((parse(lines[10]) - std::f64::consts::FRAC_PI_2).abs() < 1e-15);

        let values: Vec<f64> = lines[12..].iter().map(|s| parse(s)).collect();
        assert_eq!(values, vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn json_preserves_the_grid() {
        let g = grid();
        let mut buf = Vec::new();
        write_json(&g, &mut buf).unwrap();
        let back: FieldGrid = serde_json::from_slice(&buf).unwrap();
        assert_eq!(back, g);
    }
}
