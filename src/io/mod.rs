//! File I/O for polygons and meshes.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Polygon text | `.xy` | ✓ (polygon) | ✓ (polygon) | One `x y` pair per line |
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | `z` is written as 0 and ignored on load |
//! | Encapsulated PostScript | `.eps` | ✗ | ✓ | Line drawing of the edges |
//!
//! # Usage
//!
//! ```no_run
//! use tessera::algo::triangulate;
//! use tessera::io::{save, xy};
//!
//! let polygon = xy::load_polygon("outline.xy").unwrap();
//! let mesh = triangulate(&polygon).unwrap();
//! save(&mesh, "mesh.eps").unwrap();
//! ```

pub mod eps;
pub mod obj;
pub mod xy;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::geometry::Kernel;
use crate::mesh::Mesh;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Encapsulated PostScript drawing.
    Eps,
    /// Wavefront OBJ format.
    Obj,
    /// Plain-text polygon.
    Xy,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "eps" => Some(Format::Eps),
            "obj" => Some(Format::Obj),
            "xy" => Some(Format::Xy),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn unsupported(path: &Path) -> MeshError {
    MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    }
}

/// Load a mesh from a file with automatic format detection.
///
/// Only OBJ files hold meshes that can be read back.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    match Format::from_path(path) {
        Some(Format::Obj) => obj::load(path),
        _ => Err(unsupported(path)),
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// # Errors
///
/// - [`MeshError::UnsupportedFormat`] for unknown extensions and for `.xy`,
///   which holds polygons only
/// - [`MeshError::SaveError`] if the file cannot be written
pub fn save<K: Kernel, P: AsRef<Path>>(mesh: &Mesh<K>, path: P) -> Result<()> {
    let path = path.as_ref();
    match Format::from_path(path) {
        Some(Format::Eps) => eps::save(mesh, path),
        Some(Format::Obj) => obj::save(mesh, path),
        Some(Format::Xy) | None => Err(unsupported(path)),
    }
}

/// Wrap a write failure for `path`.
pub(crate) fn save_error(path: &Path, err: std::io::Error) -> MeshError {
    MeshError::SaveError {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::triangulate;
    use crate::polygon::Polygon;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/mesh.EPS"), Some(Format::Eps));
        assert_eq!(Format::from_path("mesh.obj"), Some(Format::Obj));
        assert_eq!(Format::from_path("outline.xy"), Some(Format::Xy));
        assert_eq!(Format::from_path("mesh.stl"), None);
        assert_eq!(Format::from_path("mesh"), None);
    }

    #[test]
    fn test_save_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = triangulate(&Polygon::rectangle(2.0, 1.0)).unwrap();

        save(&mesh, dir.path().join("mesh.eps")).unwrap();
        save(&mesh, dir.path().join("mesh.obj")).unwrap();
        assert!(matches!(
            save(&mesh, dir.path().join("mesh.xy")),
            Err(MeshError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            save(&mesh, dir.path().join("mesh.stl")),
            Err(MeshError::UnsupportedFormat { extension }) if extension == "stl"
        ));

        let loaded = load(dir.path().join("mesh.obj")).unwrap();
        assert_eq!(loaded.num_faces(), 2);
    }

    #[test]
    fn test_save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
        let path = dir.path().join("missing").join("mesh.obj");
        assert!(matches!(save(&mesh, &path), Err(MeshError::SaveError { .. })));
    }
}
