//! Constrained Delaunay maintenance by edge swapping.
//!
//! Boundary edges are the constraints: they are never swapped and always
//! count as Delaunay. Every interior edge of a mesh that went through
//! [`make_constrained_delaunay`] satisfies [`Mesh::edge_is_delaunay`].
//!
//! [`recursive_swap_delaunay`] repairs the neighbourhood of a freshly
//! inserted node. Its logged variant records each swap in a [`SwapLog`] so
//! that a speculative insertion can be rolled back exactly.

use std::collections::HashSet;

use log::{debug, trace};

use crate::error::Result;
use crate::geometry::Kernel;
use crate::mesh::{EdgeId, HalfEdgeId, Mesh};

/// Transaction log of edge swaps.
///
/// Records the edge each swap produced. [`SwapLog::undo`] swaps them back
/// in reverse order, which restores the previous connectivity (edge handles
/// are new, the node pairs they connect are the same).
#[derive(Debug, Clone, Default)]
pub struct SwapLog {
    swapped: Vec<EdgeId>,
}

impl SwapLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded swaps.
    pub fn len(&self) -> usize {
        self.swapped.len()
    }

    /// Whether no swap has been recorded.
    pub fn is_empty(&self) -> bool {
        self.swapped.is_empty()
    }

    fn record(&mut self, e: EdgeId) {
        self.swapped.push(e);
    }

    /// Forget the recorded swaps, keeping their effect.
    pub fn commit(&mut self) {
        self.swapped.clear();
    }

    /// Revert the recorded swaps, latest first, and clear the log.
    ///
    /// Returns the edges the reverse swaps produced.
    pub fn undo<K: Kernel>(&mut self, mesh: &mut Mesh<K>) -> Result<Vec<EdgeId>> {
        let mut restored = Vec::with_capacity(self.swapped.len());
        while let Some(e) = self.swapped.pop() {
            restored.push(mesh.swap_edge(e)?);
        }
        Ok(restored)
    }
}

/// Swap interior edges until every one of them is Delaunay.
///
/// Every edge starts out pending. A pending edge that is neither Delaunay
/// nor swappable is dropped; otherwise it is swapped and the four edges of
/// its quadrilateral become pending again. Returns the number of swaps.
///
/// # Example
///
/// ```
/// use tessera::algo::{is_constrained_delaunay, make_constrained_delaunay, triangulate};
/// use tessera::polygon::Polygon;
///
/// let mut mesh = triangulate(&Polygon::regular(12, 1.0)).unwrap();
/// make_constrained_delaunay(&mut mesh).unwrap();
/// assert!(is_constrained_delaunay(&mesh));
/// ```
pub fn make_constrained_delaunay<K: Kernel>(mesh: &mut Mesh<K>) -> Result<usize> {
    let mut work: Vec<EdgeId> = mesh.edge_ids().collect();
    work.reverse();
    let mut pending: HashSet<EdgeId> = work.iter().copied().collect();
    let mut swaps = 0;

    while let Some(e) = work.pop() {
        pending.remove(&e);
        if !mesh.contains_edge(e) || mesh.edge_is_delaunay(e) || !mesh.edge_is_swappable(e) {
            continue;
        }

        let [h0, h1] = mesh.edge_halfedges(e);
        let neighbours = [mesh.next(h0), mesh.prev(h0), mesh.next(h1), mesh.prev(h1)];
        for he in neighbours {
            if pending.insert(he.edge()) {
                work.push(he.edge());
            }
        }

        mesh.swap_edge(e)?;
        swaps += 1;
    }

    debug!("constrained Delaunay pass performed {} swaps", swaps);
    Ok(swaps)
}

/// Repair the Delaunay property outwards from `he`.
///
/// `he` is typically a half-edge opposite a newly inserted node, with the
/// node on its face's side. If its edge is not Delaunay and can be swapped,
/// it is swapped and the two far edges of the quadrilateral are examined in
/// turn. Returns the number of swaps.
pub fn recursive_swap_delaunay<K: Kernel>(mesh: &mut Mesh<K>, he: HalfEdgeId) -> Result<usize> {
    let mut log = SwapLog::new();
    let swaps = recursive_swap_delaunay_logged(mesh, he, &mut log)?;
    log.commit();
    Ok(swaps)
}

/// [`recursive_swap_delaunay`], recording every swap into `log`.
pub fn recursive_swap_delaunay_logged<K: Kernel>(
    mesh: &mut Mesh<K>,
    he: HalfEdgeId,
    log: &mut SwapLog,
) -> Result<usize> {
    let mut stack = vec![he];
    let mut swaps = 0;

    while let Some(he) = stack.pop() {
        let e = he.edge();
        if !mesh.contains_edge(e) || mesh.edge_is_delaunay(e) || !mesh.edge_is_swappable(e) {
            continue;
        }

        let far = he.pair();
        let he1 = mesh.next(far);
        let he2 = mesh.prev(far);

        let swapped = mesh.swap_edge(e)?;
        log.record(swapped);
        swaps += 1;
        trace!("swapped {:?} into {:?}", e, swapped);

        stack.push(he2);
        stack.push(he1);
    }

    Ok(swaps)
}

/// Whether every edge of the mesh satisfies the constrained Delaunay condition.
pub fn is_constrained_delaunay<K: Kernel>(mesh: &Mesh<K>) -> bool {
    mesh.edge_ids().all(|e| mesh.edge_is_delaunay(e))
}
