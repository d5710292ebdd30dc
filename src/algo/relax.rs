//! Degree relaxation.
//!
//! Relaxation evens out node degrees without moving any node. Each node has
//! an *ideal degree*: 6 inside the domain, and for boundary nodes a value
//! bucketed from the interior angle at the node. Its *virtual degree* is the
//! actual degree shifted so that the ideal maps to 6:
//!
//! ```text
//! virtual_degree(n) = degree(n) + 6 - ideal_degree(n)
//! ```
//!
//! An interior edge with endpoints `n1`, `n3` and apexes `n2`, `n4` has the
//! relaxation index `vd(n1) + vd(n3) - vd(n2) - vd(n4)`. Swapping the edge
//! moves one unit of degree from the endpoints to the apexes, so edges whose
//! index exceeds a threshold are swapped. The passes use decreasing
//! thresholds, and each one repeats until it performs no more swaps.
//!
//! An optional final phase collapses interior edges between two interior
//! nodes whose degrees sum to 10, merging a pair of degree-5 nodes into a
//! single degree-6 node.

use log::{debug, trace, warn};

use crate::error::{MeshError, Result};
use crate::geometry::Kernel;
use crate::mesh::{EdgeId, Mesh, NodeId};

/// Upper bounds of the boundary angle buckets, in degrees, for ideal
/// degrees 2 to 6. Angles above the last bound map to 7.
const ANGLE_BUCKETS: [f64; 5] = [84.85, 146.97, 207.85, 268.33, 328.63];

/// Options for [`relax`].
#[derive(Debug, Clone)]
pub struct RelaxOptions {
    /// Relaxation index thresholds, one swap pass per entry.
    pub thresholds: Vec<i64>,

    /// Whether to run the edge-collapse phase.
    pub collapse: bool,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            thresholds: vec![4, 3, 2],
            collapse: true,
        }
    }
}

impl RelaxOptions {
    /// Set the swap pass thresholds.
    pub fn with_thresholds(mut self, thresholds: Vec<i64>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Enable or disable the collapse phase.
    pub fn with_collapse(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    /// Check that the options are in range.
    ///
    /// Thresholds below 2 are rejected: a swap turns index `i` into `4 - i`,
    /// so such a pass would swap an edge back and forth forever.
    pub fn validate(&self) -> Result<()> {
        if let Some(&t) = self.thresholds.iter().find(|&&t| t < 2) {
            return Err(MeshError::invalid_param(
                "thresholds",
                t,
                "must be at least 2",
            ));
        }
        Ok(())
    }
}

/// Statistics from a relaxation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaxStats {
    /// Edges swapped.
    pub swaps: usize,
    /// Edges collapsed.
    pub collapses: usize,
}

/// Ideal degree of a node: 6 for interior nodes, 2 to 7 for boundary nodes
/// depending on the interior angle.
pub fn ideal_degree<K: Kernel>(mesh: &Mesh<K>, n: NodeId) -> usize {
    let Some(he2) = mesh
        .outgoing_halfedges(n)
        .find(|&he| mesh.is_boundary_halfedge(he))
    else {
        return 6;
    };
    let he1 = mesh.prev(he2);

    let p1 = mesh.position(mesh.origin(he1));
    let p2 = mesh.position(n);
    let p3 = mesh.position(mesh.dest(he2));
    let v1 = p1 - p2;
    let v2 = p3 - p2;

    let mut angle = (v1.x * v2.y - v2.x * v1.y).atan2(v1.dot(&v2));
    if angle < 0.0 {
        angle += std::f64::consts::TAU;
    }
    let degrees = angle.to_degrees();

    if !(degrees < 360.0) {
        warn!(
            "boundary angle {:.2} deg at node {:?} is out of range",
            degrees, n
        );
        return 7;
    }
    ANGLE_BUCKETS
        .iter()
        .position(|&bound| degrees <= bound)
        .map_or(7, |i| i + 2)
}

/// Degree of a node shifted so that its ideal degree maps to 6.
pub fn virtual_degree<K: Kernel>(mesh: &Mesh<K>, n: NodeId) -> i64 {
    mesh.degree(n) as i64 + 6 - ideal_degree(mesh, n) as i64
}

/// Relaxation index of an interior edge, `None` for boundary edges.
pub fn relaxation_index<K: Kernel>(mesh: &Mesh<K>, e: EdgeId) -> Option<i64> {
    let [n1, n2, n3, n4] = mesh.edge_quad(e)?;
    Some(
        virtual_degree(mesh, n1) + virtual_degree(mesh, n3)
            - virtual_degree(mesh, n2)
            - virtual_degree(mesh, n4),
    )
}

/// Relax a mesh in place.
///
/// # Example
///
/// ```
/// use tessera::algo::{refine, relax, triangulate, RefineOptions, RelaxOptions};
/// use tessera::polygon::Polygon;
///
/// let mut mesh = triangulate(&Polygon::regular(10, 1.0)).unwrap();
/// refine(&mut mesh, &RefineOptions::default().with_max_area(0.02)).unwrap();
/// let stats = relax(&mut mesh, &RelaxOptions::default()).unwrap();
/// assert!(mesh.is_valid());
/// # let _ = stats;
/// ```
pub fn relax<K: Kernel>(mesh: &mut Mesh<K>, options: &RelaxOptions) -> Result<RelaxStats> {
    options.validate()?;
    let mut stats = RelaxStats::default();

    for &threshold in &options.thresholds {
        let swaps = swap_pass(mesh, threshold)?;
        trace!("relaxation threshold {} swapped {} edges", threshold, swaps);
        stats.swaps += swaps;
    }

    if options.collapse {
        stats.collapses = collapse_pass(mesh)?;
    }

    debug!(
        "relaxation swapped {} edges and collapsed {}",
        stats.swaps, stats.collapses
    );
    Ok(stats)
}

/// Swap edges with an index above `threshold` until none is left.
fn swap_pass<K: Kernel>(mesh: &mut Mesh<K>, threshold: i64) -> Result<usize> {
    let mut total = 0;
    loop {
        let mut swapped = 0;
        let edges: Vec<EdgeId> = mesh.edge_ids().collect();
        for e in edges {
            if !mesh.contains_edge(e) {
                continue;
            }
            let above = relaxation_index(mesh, e).is_some_and(|index| index > threshold);
            if above && mesh.edge_is_swappable(e) {
                mesh.swap_edge(e)?;
                swapped += 1;
            }
        }
        total += swapped;
        if swapped == 0 {
            return Ok(total);
        }
    }
}

fn collapsible<K: Kernel>(mesh: &Mesh<K>, e: EdgeId) -> bool {
    if mesh.is_boundary_edge(e) {
        return false;
    }
    let [a, b] = mesh.edge_nodes(e);
    !mesh.is_boundary_node(a)
        && !mesh.is_boundary_node(b)
        && mesh.degree(a) + mesh.degree(b) == 10
}

/// Collapse interior edges whose endpoint degrees sum to 10.
fn collapse_pass<K: Kernel>(mesh: &mut Mesh<K>) -> Result<usize> {
    let mut total = 0;
    loop {
        let mut collapsed = 0;
        let edges: Vec<EdgeId> = mesh.edge_ids().collect();
        for e in edges {
            if !mesh.contains_edge(e) || !collapsible(mesh, e) {
                continue;
            }
            match mesh.collapse_edge(e) {
                Ok(n) => {
                    trace!("collapsed {:?} into {:?}", e, n);
                    collapsed += 1;
                }
                Err(
                    err @ (MeshError::NonManifold { .. }
                    | MeshError::InvertedFace { .. }
                    | MeshError::BoundaryNode { .. }
                    | MeshError::BoundaryEdge { .. }),
                ) => trace!("skipping collapse of {:?}: {}", e, err),
                Err(err) => return Err(err),
            }
        }
        total += collapsed;
        if collapsed == 0 {
            return Ok(total);
        }
    }
}
