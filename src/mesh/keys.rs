//! Stable handles for mesh entities.
//!
//! Nodes, edges and faces live in generational arenas ([`slotmap::SlotMap`]).
//! Their handles are arena keys: once an entity is removed its handle is
//! permanently invalid, even if the slot is later reused.
//!
//! Half-edges are not stored separately. Each [`Edge`](super::Edge) owns its
//! two half-edges, and a [`HalfEdgeId`] names one of them by edge and side.
//! The pair of a half-edge is the other side of the same edge, so
//! `he.pair().pair() == he` holds for every handle.

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a mesh node.
    pub struct NodeId;

    /// Handle to an undirected mesh edge.
    pub struct EdgeId;

    /// Handle to a triangular face.
    pub struct FaceId;
}

/// Handle to one direction of an edge.
///
/// Side 0 runs from the edge's first node to its second, side 1 the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdgeId {
    edge: EdgeId,
    side: u8,
}

impl HalfEdgeId {
    /// Create a handle to side `side` (0 or 1) of `edge`.
    #[inline]
    pub(crate) fn new(edge: EdgeId, side: u8) -> Self {
        debug_assert!(side < 2);
        Self { edge, side }
    }

    /// The edge this half-edge belongs to.
    #[inline]
    pub fn edge(self) -> EdgeId {
        self.edge
    }

    /// Which side of the edge this is (0 or 1).
    #[inline]
    pub fn side(self) -> usize {
        self.side as usize
    }

    /// The half-edge running in the opposite direction along the same edge.
    #[inline]
    pub fn pair(self) -> Self {
        Self {
            edge: self.edge,
            side: 1 - self.side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_pair_involution() {
        let mut edges: SlotMap<EdgeId, ()> = SlotMap::with_key();
        let e = edges.insert(());
        let he = HalfEdgeId::new(e, 0);

        assert_eq!(he.pair().side(), 1);
        assert_eq!(he.pair().edge(), e);
        assert_eq!(he.pair().pair(), he);
        assert_ne!(he.pair(), he);
    }

    #[test]
    fn test_removed_handle_stays_invalid() {
        let mut edges: SlotMap<EdgeId, u32> = SlotMap::with_key();
        let e = edges.insert(1);
        edges.remove(e);
        let reused = edges.insert(2);

        assert!(!edges.contains_key(e));
        assert_ne!(e, reused);
    }
}
