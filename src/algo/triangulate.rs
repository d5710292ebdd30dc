//! Polygon triangulation by ear clipping.
//!
//! The polygon's boundary ring is built first, one node per vertex and one
//! edge per side. Ears are then cut off one at a time: each cut adds the
//! diagonal between the ear's neighbours and turns the cut-off triangle into
//! a face. Only the two neighbours change their convex/reflex/ear status, so
//! they are the only vertices classified again.
//!
//! # Complexity
//!
//! O(n²) in the worst case: every ear test scans the current reflex vertices.
//!
//! # Limitations
//!
//! The polygon must be simple. A vertex lying exactly on a non-adjacent side
//! is rejected by validation rather than handled.

use std::collections::BTreeSet;

use log::{debug, trace};

use crate::error::{MeshError, Result};
use crate::geometry::{Kernel, RobustKernel};
use crate::mesh::{HalfEdgeId, Mesh, NodeId};
use crate::polygon::Polygon;

/// Triangulate a simple counter-clockwise polygon with the robust kernel.
///
/// The result has one node per polygon vertex, the polygon's sides as its
/// boundary edges and `n - 2` faces.
///
/// # Errors
///
/// - Any error from [`Polygon::validate`]
/// - [`MeshError::TriangulationFailed`] if no ear can be found before the
///   polygon is consumed
///
/// # Example
///
/// ```
/// use tessera::algo::triangulate;
/// use tessera::polygon::Polygon;
///
/// let mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// ```
pub fn triangulate(polygon: &Polygon) -> Result<Mesh<RobustKernel>> {
    triangulate_with_kernel(polygon)
}

/// Triangulate a polygon into a mesh that uses kernel `K`.
pub fn triangulate_with_kernel<K: Kernel>(polygon: &Polygon) -> Result<Mesh<K>> {
    let mut mesh: Mesh<K> = Mesh::with_capacity(polygon.len());
    polygon.validate_with(mesh.kernel())?;

    let ring = add_ring(&mut mesh, polygon)?;
    let mut clipper = EarClipper::new(&mut mesh);
    clipper.classify(ring);
    clipper.run(polygon.len())?;

    debug!(
        "triangulated polygon with {} vertices into {} faces",
        polygon.len(),
        mesh.num_faces()
    );
    Ok(mesh)
}

/// Add the polygon's boundary ring and return a half-edge of its inner cycle.
fn add_ring<K: Kernel>(mesh: &mut Mesh<K>, polygon: &Polygon) -> Result<HalfEdgeId> {
    let nodes: Vec<NodeId> = polygon.points().iter().map(|&p| mesh.add_node(p)).collect();
    for pair in nodes.windows(2) {
        mesh.add_edge(pair[0], pair[1])?;
    }

    let last = nodes[nodes.len() - 1];
    let closing = mesh.add_edge(last, nodes[0])?;
    Ok(mesh.edge_halfedge(closing))
}

/// Working state of the ear-clipping loop.
///
/// Vertices are named by the inner-ring half-edge that leaves them. Ordered
/// sets keep the clipping order, and thus the output, deterministic.
struct EarClipper<'a, K: Kernel> {
    mesh: &'a mut Mesh<K>,
    reflex: BTreeSet<HalfEdgeId>,
    ears: BTreeSet<HalfEdgeId>,
}

impl<'a, K: Kernel> EarClipper<'a, K> {
    fn new(mesh: &'a mut Mesh<K>) -> Self {
        Self {
            mesh,
            reflex: BTreeSet::new(),
            ears: BTreeSet::new(),
        }
    }

    fn classify(&mut self, start: HalfEdgeId) {
        let mut convex = Vec::new();
        let mut he = start;
        loop {
            if self.is_convex(he) {
                convex.push(he);
            } else {
                self.reflex.insert(he);
            }
            he = self.mesh.next(he);
            if he == start {
                break;
            }
        }

        // Ear tests need the complete reflex set.
        for he in convex {
            if self.is_ear(he) {
                self.ears.insert(he);
            }
        }
    }

    fn run(&mut self, n: usize) -> Result<()> {
        let mut remaining = n;

        while let Some(he2) = self.ears.pop_first() {
            let he1 = self.mesh.prev(he2);
            let he5 = self.mesh.next(he2);

            // The neighbours are reclassified after the cut.
            for he in [he1, he5] {
                self.ears.remove(&he);
                self.reflex.remove(&he);
            }

            if he5 == self.mesh.prev(he1) {
                self.mesh.add_face(he1, he2, he5)?;
                trace!("closed final triangle at {:?}", self.mesh.origin(he2));
                return Ok(());
            }

            let n1 = self.mesh.origin(he1);
            let n3 = self.mesh.origin(he5);
            let diagonal = self.mesh.add_edge(n3, n1)?;
            let he3 = self.mesh.edge_halfedge(diagonal);
            let he4 = he3.pair();
            self.mesh.add_face(he1, he2, he3)?;
            remaining -= 1;
            trace!("clipped ear at {:?}", self.mesh.origin(he2));

            for he in [he4, he5] {
                if !self.is_convex(he) {
                    self.reflex.insert(he);
                } else if self.is_ear(he) {
                    self.ears.insert(he);
                }
            }
        }

        Err(MeshError::TriangulationFailed { remaining })
    }

    /// Whether the ring turns left at the origin of `he`.
    fn is_convex(&self, he: HalfEdgeId) -> bool {
        let mesh = &*self.mesh;
        let a = mesh.position(mesh.origin(mesh.prev(he)));
        let b = mesh.position(mesh.origin(he));
        let c = mesh.position(mesh.dest(he));
        mesh.kernel().orient2d(&a, &b, &c) > 0.0
    }

    /// Whether the convex vertex at the origin of `he` is an ear: no reflex
    /// vertex lies inside or on its triangle.
    fn is_ear(&self, he: HalfEdgeId) -> bool {
        let mesh = &*self.mesh;
        let n1 = mesh.origin(mesh.prev(he));
        let n2 = mesh.origin(he);
        let n3 = mesh.dest(he);
        let [p1, p2, p3] = [n1, n2, n3].map(|n| mesh.position(n));

        self.reflex.iter().all(|&r| {
            let node = mesh.origin(r);
            node == n1
                || node == n3
                || !mesh
                    .kernel()
                    .point_in_closed_triangle(&mesh.position(node), &p1, &p2, &p3)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FastKernel;
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use proptest::prelude::*;

    fn create_l_shape() -> Polygon {
        Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_unit_square() {
        let mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.boundary_halfedges().count(), 4);
        assert!(mesh.is_valid());
        assert_relative_eq!(mesh.total_area(), 1.0);
    }

    #[test]
    fn test_triangle_input() {
        let poly = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ])
        .unwrap();
        let mesh = triangulate(&poly).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_edges(), 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_non_convex() {
        let mesh = triangulate(&create_l_shape()).unwrap();
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.is_valid());
        assert_relative_eq!(mesh.total_area(), 3.0, epsilon = 1e-12);
        for f in mesh.face_ids() {
            assert!(mesh.face_area(f) > 0.0);
        }
    }

    #[test]
    fn test_letter_a() {
        let poly = Polygon::letter_a();
        let mesh = triangulate(&poly).unwrap();
        assert_eq!(mesh.num_faces(), poly.len() - 2);
        assert_eq!(mesh.euler_characteristic(), 1);
        assert!(mesh.is_valid());
        assert_relative_eq!(mesh.total_area(), poly.signed_area(), epsilon = 1e-12);
    }

    #[test]
    fn test_boundary_follows_polygon() {
        let poly = create_l_shape();
        let mesh = triangulate(&poly).unwrap();
        for he in mesh.boundary_halfedges() {
            // The outside cycle runs clockwise, against the polygon order.
            let a = mesh.position(mesh.dest(he));
            let b = mesh.position(mesh.origin(he));
            let i = poly.points().iter().position(|&p| p == a).unwrap();
            assert_eq!(poly.points()[(i + 1) % poly.len()], b);
        }
    }

    #[test]
    fn test_rejects_invalid_polygons() {
        let clockwise = Polygon::rectangle(1.0, 1.0).reversed();
        assert!(matches!(
            triangulate(&clockwise),
            Err(MeshError::NotCounterClockwise)
        ));

        let short = Polygon::from_points_unchecked(vec![Point2::new(0.0, 0.0)]);
        assert!(matches!(
            triangulate(&short),
            Err(MeshError::TooFewVertices { count: 1 })
        ));
    }

    #[test]
    fn test_deterministic() {
        let poly = Polygon::letter_a();
        let (_, a) = triangulate(&poly).unwrap().to_face_vertex();
        let (_, b) = triangulate(&poly).unwrap().to_face_vertex();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fast_kernel() {
        let mesh = triangulate_with_kernel::<FastKernel>(&create_l_shape()).unwrap();
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.is_valid());
    }

    proptest! {
        #[test]
        fn convex_polygons_give_n_minus_2_faces(n in 3usize..48, radius in 0.5f64..50.0) {
            let poly = Polygon::regular(n, radius);
            let mesh = triangulate(&poly).unwrap();
            prop_assert_eq!(mesh.num_faces(), n - 2);
            prop_assert_eq!(mesh.euler_characteristic(), 1);
            prop_assert!(mesh.is_valid());
        }

        #[test]
        fn star_shaped_polygons_triangulate(radii in prop::collection::vec(0.5f64..1.5, 3..40)) {
            let n = radii.len();
            let points = radii
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    let t = std::f64::consts::TAU * i as f64 / n as f64;
                    Point2::new(r * t.cos(), r * t.sin())
                })
                .collect();
            let poly = Polygon::from_points_unchecked(points);
            prop_assume!(poly.validate().is_ok());

            let mesh = triangulate(&poly).unwrap();
            prop_assert_eq!(mesh.num_faces(), n - 2);
            prop_assert!(mesh.is_valid());
            prop_assert!((mesh.total_area() - poly.signed_area()).abs() < 1e-9);
        }
    }
}
