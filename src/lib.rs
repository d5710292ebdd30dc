//! # Tessera
//!
//! Quality triangle meshes for planar polygons.
//!
//! Tessera turns a simple polygon into a constrained Delaunay triangulation
//! and refines it with Ruppert's algorithm until every face is small enough
//! and has no angle below a chosen minimum.
//!
//! ## Features
//!
//! - **Half-edge mesh**: O(1) adjacency queries with generational handles
//! - **Robust predicates**: adaptive exact `orient2d` and `incircle`
//! - **Ear-clipping triangulation** of simple polygons
//! - **Constrained Delaunay** maintenance by edge swapping
//! - **Ruppert refinement** with circumcenter or off-center insertion and
//!   concentric-shell boundary splitting
//! - **Post-processing**: degree relaxation and four smoothing schemes
//! - **File formats**: polygon text files in, OBJ and EPS out
//!
//! ## Quick Start
//!
//! ```
//! use tessera::prelude::*;
//!
//! let polygon = Polygon::letter_a();
//! let mut mesh = triangulate(&polygon).unwrap();
//! make_constrained_delaunay(&mut mesh).unwrap();
//!
//! let options = RefineOptions::default()
//!     .with_max_area(0.005)
//!     .with_min_angle_degrees(20.0);
//! let stats = refine(&mut mesh, &options).unwrap();
//!
//! println!("{} Steiner points, {} faces", stats.steiner_points, mesh.num_faces());
//! assert!(mesh.is_valid());
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use tessera::prelude::*;
//!
//! let mesh = triangulate(&Polygon::regular(6, 1.0)).unwrap();
//!
//! for n in mesh.node_ids() {
//!     let degree = mesh.degree(n);
//!     let neighbors: Vec<NodeId> = mesh.neighbors(n).collect();
//!     assert_eq!(neighbors.len(), degree);
//! }
//!
//! for f in mesh.face_ids() {
//!     let [a, b, c] = mesh.face_nodes(f);
//!     println!("face {:?}: {:?} {:?} {:?}, area {}", f, a, b, c, mesh.face_area(f));
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod polygon;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{
        make_constrained_delaunay, refine, relax, smooth, triangulate, InsertionPoint,
        RefineOptions, RelaxOptions, SmoothMethod, SmoothOptions,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::geometry::{FastKernel, Kernel, RobustKernel};
    pub use crate::mesh::{
        build_from_triangles, EdgeId, FaceId, HalfEdgeId, Location, Mesh, NodeId,
    };
    pub use crate::polygon::Polygon;
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_full_pipeline() {
        let polygon = Polygon::letter_a();
        let mut mesh = triangulate(&polygon).unwrap();
        make_constrained_delaunay(&mut mesh).unwrap();

        let refine_options = RefineOptions::default()
            .with_max_area(0.005)
            .with_min_angle_degrees(20.0);
        let stats = refine(&mut mesh, &refine_options).unwrap();
        assert!(stats.steiner_points > 0);

        let boundary_before = mesh.boundary_halfedges().count();
        relax(&mut mesh, &RelaxOptions::default()).unwrap();
        smooth(
            &mut mesh,
            &SmoothOptions::default()
                .with_method(SmoothMethod::Laplacian)
                .with_iterations(2)
                .with_target_area(0.005),
        )
        .unwrap();

        assert!(mesh.is_valid());
        assert_eq!(mesh.euler_characteristic(), 1);
        assert_eq!(mesh.boundary_halfedges().count(), boundary_before);
        assert_relative_eq!(mesh.total_area(), polygon.signed_area(), epsilon = 1e-9);
    }
}
