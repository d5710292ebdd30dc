//! Local edge and face criteria evaluated with the mesh's kernel.
//!
//! For an interior edge with side 0 running `n1 -> n3`, the quadrilateral
//! around it is labelled counter-clockwise as `n1, n2, n3, n4`, where `n2`
//! is the apex of the face on side 1 and `n4` the apex of the face on side 0.

use nalgebra::Point2;

use super::halfedge::Mesh;
use super::keys::{EdgeId, FaceId, HalfEdgeId, NodeId};
use crate::geometry::{self, Kernel};

impl<K: Kernel> Mesh<K> {
    /// The quadrilateral `n1, n2, n3, n4` around an interior edge.
    ///
    /// Returns `None` for a boundary edge.
    pub fn edge_quad(&self, e: EdgeId) -> Option<[NodeId; 4]> {
        if self.is_boundary_edge(e) {
            return None;
        }
        let [h0, h1] = self.edge_halfedges(e);
        Some([
            self.origin(h0),
            self.origin(self.prev(h1)),
            self.origin(h1),
            self.origin(self.prev(h0)),
        ])
    }

    fn quad_points(&self, e: EdgeId) -> Option<[Point2<f64>; 4]> {
        self.edge_quad(e).map(|quad| quad.map(|n| self.position(n)))
    }

    /// Whether an edge satisfies the (constrained) Delaunay condition.
    ///
    /// Boundary edges are constraints and always qualify. An interior edge
    /// qualifies unless the apex on one side lies strictly inside the
    /// circumcircle of the face on the other side.
    pub fn edge_is_delaunay(&self, e: EdgeId) -> bool {
        match self.quad_points(e) {
            None => true,
            Some([p1, p2, p3, p4]) => self.kernel.in_circle(&p1, &p2, &p3, &p4) <= 0.0,
        }
    }

    /// Whether an edge can be swapped without inverting a face.
    ///
    /// Boundary edges cannot be swapped. An interior edge can if the
    /// quadrilateral around it is strictly convex, i.e. both triangles on the
    /// other diagonal are positively oriented.
    pub fn edge_is_swappable(&self, e: EdgeId) -> bool {
        match self.quad_points(e) {
            None => false,
            Some([p1, p2, p3, p4]) => {
                self.kernel.orient2d(&p2, &p3, &p4) > 0.0 && self.kernel.orient2d(&p4, &p1, &p2) > 0.0
            }
        }
    }

    /// Whether `p` lies strictly inside the diametral circle of an edge.
    pub fn edge_is_encroached_by(&self, e: EdgeId, p: &Point2<f64>) -> bool {
        let [a, b] = self.edge_nodes(e);
        geometry::is_encroached(&self.position(a), &self.position(b), p)
    }

    /// Whether the apex of the face beside `he` encroaches upon its edge.
    ///
    /// Returns `false` if `he` has no face.
    pub fn halfedge_is_encroached(&self, he: HalfEdgeId) -> bool {
        if self.is_boundary_halfedge(he) {
            return false;
        }
        let apex = self.position(self.origin(self.prev(he)));
        self.edge_is_encroached_by(he.edge(), &apex)
    }

    /// Whether a face sits in a sharp boundary corner that interior
    /// refinement cannot improve.
    ///
    /// That is the case when two of its edges lie on the boundary and the
    /// angle between them is below `min_angle` (radians).
    pub fn is_restricted(&self, f: FaceId, min_angle: f64) -> bool {
        let halfedges: Vec<HalfEdgeId> = self.face_halfedges(f).collect();
        let angles = self.face_angles(f);

        // Angle i sits at the origin of half-edge i, between half-edge i and
        // the one before it.
        (0..3).any(|i| {
            let here = halfedges[i];
            let before = halfedges[(i + 2) % 3];
            self.is_boundary_edge(here.edge())
                && self.is_boundary_edge(before.edge())
                && angles[i] < min_angle
        })
    }
}
