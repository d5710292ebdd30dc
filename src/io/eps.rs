//! Encapsulated PostScript drawings of meshes.
//!
//! The mesh is scaled uniformly so that its bounding box is 10 cm wide, and
//! every edge is drawn as one line segment inside a 1 mm margin.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{MeshError, Result};
use crate::geometry::Kernel;
use crate::mesh::Mesh;

/// PostScript points per centimetre.
const CM: f64 = 28.346_456_7;
const FIG_SIZE: f64 = 10.0 * CM;
const FIG_MARGIN: f64 = 0.1 * CM;
const LINE_WIDTH: f64 = 0.05 * CM;

/// Save a drawing of the mesh edges.
///
/// # Errors
///
/// [`MeshError::SaveError`] if the mesh has no nodes, has a zero-width
/// bounding box, or the file cannot be written.
pub fn save<K: Kernel, P: AsRef<Path>>(mesh: &Mesh<K>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| super::save_error(path, e))?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer, &path.display().to_string()).map_err(|e| match e {
        MeshError::Io(err) => super::save_error(path, err),
        MeshError::InvalidState(message) => MeshError::SaveError {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })?;
    writer.flush().map_err(|e| super::save_error(path, e))
}

/// Write the drawing to any writer; `title` goes into the header.
pub fn write<K: Kernel, W: Write>(mesh: &Mesh<K>, writer: &mut W, title: &str) -> Result<()> {
    let (min, max) = mesh
        .bounding_box()
        .ok_or_else(|| MeshError::InvalidState("cannot draw an empty mesh".to_string()))?;
    let width = max.x - min.x;
    if !(width > 0.0) {
        return Err(MeshError::InvalidState(
            "cannot draw a mesh of zero width".to_string(),
        ));
    }

    let scale = FIG_SIZE / width;
    let fig_width = FIG_SIZE;
    let fig_height = (max.y - min.y) * scale;
    let full_width = fig_width + 2.0 * FIG_MARGIN;
    let full_height = fig_height + 2.0 * FIG_MARGIN;

    writeln!(writer, "%!PS-Adobe-3.0 EPSF-3.0")?;
    writeln!(
        writer,
        "%%BoundingBox: 0 0 {} {}",
        full_width.ceil() as u64,
        full_height.ceil() as u64
    )?;
    writeln!(
        writer,
        "%%HiResBoundingBox: 0.000000 0.000000 {:.6} {:.6}",
        full_width, full_height
    )?;
    writeln!(writer, "%%Creator: tessera {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(writer, "%%Title: Unstructured mesh {}", title)?;
    writeln!(writer, "%%EndComments")?;
    writeln!(writer, "newpath")?;

    for (p, q) in mesh.edge_segments() {
        writeln!(
            writer,
            "{:.6} {:.6} moveto",
            scale * (p.x - min.x) + FIG_MARGIN,
            scale * (p.y - min.y) + FIG_MARGIN
        )?;
        writeln!(
            writer,
            "{:.6} {:.6} lineto",
            scale * (q.x - min.x) + FIG_MARGIN,
            scale * (q.y - min.y) + FIG_MARGIN
        )?;
    }

    writeln!(writer, "{:.6} setlinewidth", LINE_WIDTH)?;
    writeln!(writer, "stroke")?;
    writeln!(writer, "%%EOF")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::triangulate;
    use crate::polygon::Polygon;

    fn coordinates(line: &str) -> (f64, f64) {
        let mut parts = line.split_whitespace();
        let x = parts.next().unwrap().parse().unwrap();
        let y = parts.next().unwrap().parse().unwrap();
        (x, y)
    }

    #[test]
    fn test_drawing_layout() {
        let mesh = triangulate(&Polygon::rectangle(2.0, 1.0)).unwrap();
        let mut buffer = Vec::new();
        write(&mesh, &mut buffer, "rectangle").unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
        assert!(text.contains("%%BoundingBox: 0 0 290 148\n"));
        assert!(text.contains("%%Title: Unstructured mesh rectangle\n"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert_eq!(text.matches(" moveto").count(), mesh.num_edges());
        assert_eq!(text.matches(" lineto").count(), mesh.num_edges());

        for line in text.lines().filter(|l| l.ends_with("moveto") || l.ends_with("lineto")) {
            let (x, y) = coordinates(line);
            assert!(x >= FIG_MARGIN - 1e-6 && x <= FIG_SIZE + FIG_MARGIN + 1e-6);
            assert!(y >= FIG_MARGIN - 1e-6 && y <= 0.5 * FIG_SIZE + FIG_MARGIN + 1e-6);
        }
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mesh: Mesh = Mesh::new();
        let result = save(&mesh, dir.path().join("empty.eps"));
        assert!(matches!(result, Err(MeshError::SaveError { .. })));
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.eps");
        let mesh = triangulate(&Polygon::letter_a()).unwrap();
        save(&mesh, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("stroke"));
    }
}
