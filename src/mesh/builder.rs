//! Mesh construction from face-vertex lists.
//!
//! File readers and tests describe meshes as a point list plus index
//! triples. [`build_from_triangles`] turns such a description into a
//! [`Mesh`] through the regular topology operators, so the result obeys the
//! same invariants as a mesh built incrementally.

use std::collections::HashMap;

use nalgebra::Point2;

use super::halfedge::Mesh;
use super::keys::{HalfEdgeId, NodeId};
use crate::error::{MeshError, Result};
use crate::geometry::Kernel;

/// Build a mesh from points and counter-clockwise triangles.
///
/// # Arguments
/// * `points` - Node positions
/// * `triangles` - Faces as `[a, b, c]` indices into `points`, counter-clockwise
///
/// # Example
/// ```
/// use tessera::mesh::{build_from_triangles, Mesh};
/// use nalgebra::Point2;
///
/// let points = vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(0.0, 1.0),
/// ];
/// let mesh: Mesh = build_from_triangles(&points, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_nodes(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<K: Kernel>(
    points: &[Point2<f64>],
    triangles: &[[usize; 3]],
) -> Result<Mesh<K>> {
    for (fi, tri) in triangles.iter().enumerate() {
        if tri.iter().any(|&i| i >= points.len()) {
            return Err(MeshError::invalid_param(
                "triangles",
                fi,
                "references a point that does not exist",
            ));
        }
        if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
            return Err(MeshError::invalid_param(
                "triangles",
                fi,
                "repeats a point",
            ));
        }
    }

    let mut mesh: Mesh<K> = Mesh::with_capacity(points.len());
    let nodes: Vec<NodeId> = points.iter().map(|&p| mesh.add_node(p)).collect();

    for (fi, tri) in triangles.iter().enumerate() {
        let [a, b, c] = tri.map(|i| points[i]);
        if mesh.kernel().orient2d(&a, &b, &c) <= 0.0 {
            return Err(MeshError::invalid_param(
                "triangles",
                fi,
                "is not counter-clockwise",
            ));
        }
    }

    // Directed half-edges by index pair, so each edge is created once.
    let mut halfedges: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();

    for tri in triangles {
        let mut sides = [None; 3];
        for k in 0..3 {
            let (i, j) = (tri[k], tri[(k + 1) % 3]);
            let he = match halfedges.get(&(i, j)) {
                Some(&he) => he,
                None => {
                    let e = mesh.add_edge(nodes[i], nodes[j])?;
                    let [h0, h1] = mesh.edge_halfedges(e);
                    halfedges.insert((i, j), h0);
                    halfedges.insert((j, i), h1);
                    h0
                }
            };
            sides[k] = Some(he);
        }
        if let [Some(he1), Some(he2), Some(he3)] = sides {
            mesh.add_face(he1, he2, he3)?;
        }
    }

    Ok(mesh)
}
