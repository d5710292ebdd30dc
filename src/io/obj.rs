//! Wavefront OBJ format support.
//!
//! Nodes are written as `v x y 0` and faces as 1-based `f a b c` triples in
//! counter-clockwise order. Loading accepts the same subset: `v` lines (the
//! `z` coordinate is ignored) and triangular `f` lines, optionally with
//! `/`-separated texture and normal indices.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::geometry::Kernel;
use crate::mesh::{build_from_triangles, Mesh};

/// Load a triangle mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use tessera::io::obj;
///
/// let mesh = obj::load("mesh.obj").unwrap();
/// println!("{} faces", mesh.num_faces());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let load_error = |line: usize, message: String| MeshError::LoadError {
        path: path.to_path_buf(),
        message: format!("line {}: {}", line, message),
    };

    let mut points = Vec::new();
    let mut triangles = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let number = i + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords: Vec<f64> = tokens
                    .take(2)
                    .map(|t| t.parse::<f64>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| load_error(number, e.to_string()))?;
                if coords.len() != 2 {
                    return Err(load_error(number, "vertex needs x and y".to_string()));
                }
                points.push(Point2::new(coords[0], coords[1]));
            }
            Some("f") => {
                let indices: Vec<usize> = tokens
                    .map(|t| parse_index(t, points.len()))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|message| load_error(number, message))?;
                if indices.len() != 3 {
                    return Err(load_error(
                        number,
                        format!("expected a triangle, found {} vertices", indices.len()),
                    ));
                }
                triangles.push([indices[0], indices[1], indices[2]]);
            }
            _ => {}
        }
    }

    if triangles.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "OBJ file contains no faces".to_string(),
        });
    }

    build_from_triangles(&points, &triangles)
}

/// Parse a 1-based (or negative, relative) OBJ vertex reference.
fn parse_index(token: &str, count: usize) -> std::result::Result<usize, String> {
    let head = token.split('/').next().unwrap_or(token);
    let index: i64 = head
        .parse()
        .map_err(|_| format!("invalid vertex reference '{}'", token))?;
    let resolved = if index < 0 {
        count as i64 + index
    } else {
        index - 1
    };
    if resolved < 0 || resolved >= count as i64 {
        return Err(format!("vertex reference {} out of range", index));
    }
    Ok(resolved as usize)
}

/// Save a mesh as OBJ.
///
/// # Example
///
/// ```no_run
/// use tessera::algo::triangulate;
/// use tessera::io::obj;
/// use tessera::polygon::Polygon;
///
/// let mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
/// obj::save(&mesh, "square.obj").unwrap();
/// ```
pub fn save<K: Kernel, P: AsRef<Path>>(mesh: &Mesh<K>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| super::save_error(path, e))?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| super::save_error(path, e))
}

/// Write a mesh as OBJ to any writer.
pub fn write<K: Kernel, W: Write>(mesh: &Mesh<K>, writer: &mut W) -> std::io::Result<()> {
    let (points, triangles) = mesh.to_face_vertex();

    writeln!(writer, "# tessera {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(writer, "# {} nodes, {} faces", points.len(), triangles.len())?;
    for p in &points {
        writeln!(writer, "v {} {} 0", p.x, p.y)?;
    }
    for [a, b, c] in &triangles {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::triangulate;
    use crate::polygon::Polygon;
    use approx::assert_relative_eq;

    #[test]
    fn test_write_format() {
        let mesh = triangulate(&Polygon::rectangle(2.0, 1.0)).unwrap();
        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 2);
        assert!(text.contains("v 2 1 0\n"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.obj");
        let mesh = triangulate(&Polygon::letter_a()).unwrap();
        save(&mesh, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.num_nodes(), mesh.num_nodes());
        assert_eq!(loaded.num_faces(), mesh.num_faces());
        assert!(loaded.is_valid());
        assert_relative_eq!(loaded.total_area(), mesh.total_area(), epsilon = 1e-12);
    }

    #[test]
    fn test_load_slashes_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "# a triangle").unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 0 1 0").unwrap();
        writeln!(file, "vn 0 0 1").unwrap();
        writeln!(file, "f 1//1 2//1 -1//1").unwrap();
        drop(file);

        let mesh = load(&path).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        assert_relative_eq!(mesh.total_area(), 0.5);
    }

    #[test]
    fn test_load_errors_report_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 7\n").unwrap();
        match load(&path) {
            Err(MeshError::LoadError { message, .. }) => assert!(message.starts_with("line 4")),
            other => panic!("expected a load error, got {:?}", other.map(|m| m.num_faces())),
        }

        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 4 3\n").unwrap();
        assert!(matches!(load(&path), Err(MeshError::LoadError { .. })));
    }
}
