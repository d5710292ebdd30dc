//! Plain-text polygon files.
//!
//! One vertex per line as two whitespace-separated numbers. A `#` starts a
//! comment that runs to the end of the line; blank lines are ignored.
//!
//! ```text
//! # unit square
//! 0 0
//! 1 0
//! 1 1
//! 0 1
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::polygon::Polygon;

/// Load and validate a polygon.
///
/// # Errors
///
/// - [`MeshError::Io`] if the file cannot be read
/// - [`MeshError::LoadError`] with the offending line number for malformed lines
/// - any error from [`Polygon::validate`]
pub fn load_polygon<P: AsRef<Path>>(path: P) -> Result<Polygon> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let points = parse(&text).map_err(|(line, message)| MeshError::LoadError {
        path: path.to_path_buf(),
        message: format!("line {}: {}", line, message),
    })?;
    Polygon::new(points)
}

/// Parse polygon text, reporting failures as `(line number, message)`.
fn parse(text: &str) -> std::result::Result<Vec<Point2<f64>>, (usize, String)> {
    let mut points = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err((i + 1, format!("expected 2 coordinates, found {}", fields.len())));
        }
        let mut coords = [0.0; 2];
        for (c, field) in coords.iter_mut().zip(&fields) {
            *c = field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| (i + 1, format!("invalid coordinate '{}'", field)))?;
        }
        points.push(Point2::new(coords[0], coords[1]));
    }
    Ok(points)
}

/// Save a polygon in the same format.
pub fn save_polygon<P: AsRef<Path>>(polygon: &Polygon, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| super::save_error(path, e))?;
    let mut writer = BufWriter::new(file);
    write_polygon(polygon, &mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| super::save_error(path, e))
}

fn write_polygon<W: Write>(polygon: &Polygon, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "# {} vertices", polygon.len())?;
    for p in polygon.points() {
        writeln!(writer, "{} {}", p.x, p.y)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_comments() {
        let text = "# square\n0 0\n\n1 0   # corner\n  1 1\n0 1\n";
        let points = parse(text).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[2], Point2::new(1.0, 1.0));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("0 0\n1\n").unwrap_err().0, 2);
        assert_eq!(parse("0 0\n1 0\nx 1\n").unwrap_err().0, 3);
        assert_eq!(parse("0 0 0\n").unwrap_err().0, 1);
        assert_eq!(parse("inf 0\n").unwrap_err().0, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.xy");
        let polygon = Polygon::letter_a();
        save_polygon(&polygon, &path).unwrap();
        assert_eq!(load_polygon(&path).unwrap(), polygon);
    }

    #[test]
    fn test_load_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xy");
        std::fs::write(&path, "0 0\n1 0\n1 one\n").unwrap();
        match load_polygon(&path) {
            Err(MeshError::LoadError { path: p, message }) => {
                assert_eq!(p, path);
                assert!(message.starts_with("line 3"));
            }
            other => panic!("expected a load error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cw.xy");
        std::fs::write(&path, "0 0\n0 1\n1 1\n1 0\n").unwrap();
        assert!(matches!(load_polygon(&path), Err(MeshError::NotCounterClockwise)));

        assert!(matches!(
            load_polygon(dir.path().join("missing.xy")),
            Err(MeshError::Io(_))
        ));
    }
}
