//! Point location by walking across faces.

use log::warn;
use nalgebra::Point2;

use super::halfedge::Mesh;
use super::keys::{FaceId, HalfEdgeId, NodeId};
use crate::error::{MeshError, Result};
use crate::geometry::Kernel;

/// Where a point lies relative to the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Strictly inside a face.
    InFace(FaceId),
    /// On the interior of an edge; the half-edge's face contains the point.
    OnEdge(HalfEdgeId),
    /// On an existing node.
    OnNode(NodeId),
    /// Outside the mesh, across the given boundary half-edge.
    Outside(HalfEdgeId),
}

impl<K: Kernel> Mesh<K> {
    /// Locate `p` by walking from face `start`.
    ///
    /// At each step the walk keeps going around the current face while `p`
    /// is on the left of (or on) the current half-edge, and crosses into the
    /// neighbouring face otherwise. Crossing a boundary half-edge means `p`
    /// is outside. A walk that takes more than `3F + 3` steps falls back to
    /// testing every face.
    pub fn locate(&self, p: &Point2<f64>, start: FaceId) -> Result<Location> {
        self.require_face(start)?;

        let limit = 3 * self.num_faces() + 3;
        let mut he = self.face_halfedge(start);
        let mut confirmed = 0;

        for _ in 0..limit {
            if self.side_of(he, p) >= 0.0 {
                confirmed += 1;
                if confirmed == 3 {
                    return Ok(self.classify(he, p));
                }
                he = self.next(he);
            } else {
                let across = he.pair();
                if self.is_boundary_halfedge(across) {
                    return Ok(Location::Outside(across));
                }
                // `p` is strictly left of `across`, so that side is settled.
                confirmed = 1;
                he = self.next(across);
            }
        }

        warn!(
            "walk towards ({}, {}) did not terminate after {} steps, scanning all faces",
            p.x, p.y, limit
        );
        self.locate_by_scan(p)
    }

    /// The face containing `p`, walking from `start`.
    ///
    /// Points on an edge or node report one of the faces that contain them.
    /// Returns `None` if `p` is outside the mesh or `start` is stale.
    pub fn locate_point(&self, p: &Point2<f64>, start: FaceId) -> Option<FaceId> {
        match self.locate(p, start).ok()? {
            Location::InFace(f) => Some(f),
            Location::OnEdge(he) => self.face_of(he),
            Location::OnNode(n) => self.node_faces(n).next(),
            Location::Outside(_) => None,
        }
    }

    #[inline]
    fn side_of(&self, he: HalfEdgeId, p: &Point2<f64>) -> f64 {
        let a = self.position(self.origin(he));
        let b = self.position(self.dest(he));
        self.kernel.orient2d(&a, &b, p)
    }

    /// Classify `p` against a face known to contain it (closed).
    fn classify(&self, he: HalfEdgeId, p: &Point2<f64>) -> Location {
        let halfedges = [he, self.next(he), self.prev(he)];
        let on: Vec<HalfEdgeId> = halfedges
            .into_iter()
            .filter(|&h| self.side_of(h, p) == 0.0)
            .collect();

        match on.as_slice() {
            [h] => Location::OnEdge(*h),
            [a, b] => {
                let n = if self.dest(*a) == self.origin(*b) {
                    self.origin(*b)
                } else {
                    self.origin(*a)
                };
                Location::OnNode(n)
            }
            // No zero, or a degenerate face with all three.
            _ => match self.face_of(he) {
                Some(f) => Location::InFace(f),
                None => Location::Outside(he),
            },
        }
    }

    fn locate_by_scan(&self, p: &Point2<f64>) -> Result<Location> {
        for f in self.face_ids() {
            let he = self.face_halfedge(f);
            if self.face_halfedges(f).all(|h| self.side_of(h, p) >= 0.0) {
                return Ok(self.classify(he, p));
            }
        }

        // Report the nearest boundary edge that faces `p`.
        self.boundary_halfedges()
            .filter(|&b| self.side_of(b, p) > 0.0)
            .min_by(|&a, &b| {
                let da = (self.edge_midpoint(a.edge()) - p).norm_squared();
                let db = (self.edge_midpoint(b.edge()) - p).norm_squared();
                da.total_cmp(&db)
            })
            .map(Location::Outside)
            .ok_or_else(|| {
                MeshError::InvalidState(format!("cannot locate ({}, {})", p.x, p.y))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;

    fn create_grid() -> Mesh {
        let mut points = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                points.push(Point2::new(i as f64, j as f64));
            }
        }
        let idx = |i: usize, j: usize| j * 4 + i;
        let mut triangles = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                triangles.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
                triangles.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }
        build_from_triangles(&points, &triangles).unwrap()
    }

    fn faces(mesh: &Mesh) -> Vec<FaceId> {
        mesh.face_ids().collect()
    }

    #[test]
    fn test_locate_in_face_from_every_start() {
        let mesh = create_grid();
        let p = Point2::new(2.7, 1.2);
        for start in faces(&mesh) {
            match mesh.locate(&p, start).unwrap() {
                Location::InFace(f) => {
                    let [a, b, c] = mesh.face_points(f);
                    assert!(mesh.kernel().point_in_triangle(&p, &a, &b, &c));
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_locate_on_edge() {
        let mesh = create_grid();
        let start = faces(&mesh)[0];
        // Diagonal of the cell at (1, 1).
        let p = Point2::new(1.5, 1.5);
        match mesh.locate(&p, start).unwrap() {
            Location::OnEdge(he) => {
                let a = mesh.position(mesh.origin(he));
                let b = mesh.position(mesh.dest(he));
                assert_eq!(mesh.kernel().orient2d(&a, &b, &p), 0.0);
                assert!(mesh.face_of(he).is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_locate_on_node() {
        let mesh = create_grid();
        let start = faces(&mesh)[0];
        let p = Point2::new(2.0, 1.0);
        match mesh.locate(&p, start).unwrap() {
            Location::OnNode(n) => assert_eq!(mesh.position(n), p),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_locate_outside() {
        let mesh = create_grid();
        let start = faces(&mesh)[0];
        let p = Point2::new(1.5, -2.0);
        match mesh.locate(&p, start).unwrap() {
            Location::Outside(he) => assert!(mesh.is_boundary_halfedge(he)),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(mesh.locate_point(&p, start), None);
    }

    #[test]
    fn test_locate_point_returns_containing_face() {
        let mesh = create_grid();
        let start = faces(&mesh)[0];
        let p = Point2::new(0.2, 2.9);
        let f = mesh.locate_point(&p, start).unwrap();
        let [a, b, c] = mesh.face_points(f);
        assert!(mesh.kernel().point_in_closed_triangle(&p, &a, &b, &c));
    }

    #[test]
    fn test_stale_start() {
        let mut mesh = create_grid();
        let start = faces(&mesh)[0];
        mesh.remove_face(start).unwrap();
        let result = mesh.locate(&Point2::new(1.0, 1.0), start);
        assert!(matches!(result, Err(MeshError::StaleHandle { .. })));
    }
}
