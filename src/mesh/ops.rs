//! Topology-editing operators.
//!
//! Every structural change to a [`Mesh`] goes through the operators in this
//! module. Operators that can fail check their preconditions before mutating;
//! [`Mesh::add_face`] additionally journals its link rewrites and rolls them
//! back if the faces around a node cannot be reordered into a manifold fan.
//!
//! Compound operators ([`swap_edge`](Mesh::swap_edge),
//! [`split_edge`](Mesh::split_edge), [`split_face`](Mesh::split_face),
//! [`collapse_edge`](Mesh::collapse_edge)) are expressed through the
//! primitive ones.

use std::collections::HashSet;

use log::trace;
use nalgebra::Point2;

use super::halfedge::{Edge, Face, HalfEdge, Mesh};
use super::keys::{EdgeId, FaceId, HalfEdgeId, NodeId};
use crate::error::{MeshError, Result};
use crate::geometry::{self, Kernel};

/// Saved `next`/`prev` links of a half-edge.
type LinkRecord = (HalfEdgeId, HalfEdgeId, HalfEdgeId);

impl<K: Kernel> Mesh<K> {
    // ==================== Linking helpers ====================

    #[inline]
    fn link(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.halfedge_mut(a).next = b;
        self.halfedge_mut(b).prev = a;
    }

    fn link_journaled(&mut self, a: HalfEdgeId, b: HalfEdgeId, journal: &mut Vec<LinkRecord>) {
        for he in [a, b] {
            let rec = self.halfedge(he);
            journal.push((he, rec.next, rec.prev));
        }
        self.link(a, b);
    }

    fn rollback(&mut self, journal: Vec<LinkRecord>) {
        for (he, next, prev) in journal.into_iter().rev() {
            let rec = self.halfedge_mut(he);
            rec.next = next;
            rec.prev = prev;
        }
    }

    /// Walk the incoming half-edges of a node from `start`, stepping with
    /// `pair(next(he))`, and return the first one without a face.
    ///
    /// The walk stops before reaching `stop`. With `start == stop` it makes
    /// one full turn.
    fn find_free_incoming(&self, start: HalfEdgeId, stop: HalfEdgeId) -> Option<HalfEdgeId> {
        let mut he = start;
        loop {
            if self.is_boundary_halfedge(he) {
                return Some(he);
            }
            he = self.next(he).pair();
            if he == stop {
                return None;
            }
        }
    }

    /// Free incoming slot of a node, `Ok(None)` for an isolated node.
    fn free_slot(&self, n: NodeId) -> Result<Option<HalfEdgeId>> {
        match self.out_halfedge(n) {
            None => Ok(None),
            Some(out) => {
                let start = out.pair();
                self.find_free_incoming(start, start)
                    .map(Some)
                    .ok_or(MeshError::NoFreeSlot { node: n })
            }
        }
    }

    /// Insert `new_out` into the vertex cycle right after the free incoming
    /// half-edge `incoming`.
    fn splice(&mut self, incoming: HalfEdgeId, new_out: HalfEdgeId) {
        let old_out = self.next(incoming);
        self.link(incoming, new_out);
        self.link(new_out.pair(), old_out);
    }

    /// Reorder the vertex cycle so that `next(incoming) == outgoing`.
    ///
    /// The half-edges that currently sit between the two are moved into
    /// another free gap of the same node.
    fn make_adjacent(
        &mut self,
        incoming: HalfEdgeId,
        outgoing: HalfEdgeId,
        journal: &mut Vec<LinkRecord>,
    ) -> Result<()> {
        if self.next(incoming) == outgoing {
            return Ok(());
        }

        let b = self.next(incoming);
        let d = self.prev(outgoing);

        let g = self
            .find_free_incoming(outgoing.pair(), incoming)
            .ok_or_else(|| MeshError::NonManifold {
                details: format!(
                    "no free gap at node {:?} to reorder the fan",
                    self.origin(outgoing)
                ),
            })?;
        let h = self.next(g);

        self.link_journaled(incoming, outgoing, journal);
        self.link_journaled(g, b, journal);
        self.link_journaled(d, h, journal);
        Ok(())
    }

    // ==================== Nodes ====================

    /// Remove a node together with all incident edges and faces.
    pub fn remove_node(&mut self, n: NodeId) -> Result<()> {
        self.require_node(n)?;
        while let Some(out) = self.out_halfedge(n) {
            self.remove_edge(out.edge())?;
        }
        self.nodes.remove(n);
        Ok(())
    }

    // ==================== Edges ====================

    /// Connect two nodes with a new edge.
    ///
    /// The new half-edges are spliced into each endpoint's vertex cycle after
    /// a free (face-less) incoming half-edge.
    ///
    /// # Errors
    ///
    /// - [`MeshError::LoopEdge`] if `n1 == n2`
    /// - [`MeshError::DuplicateEdge`] if the nodes are already connected
    /// - [`MeshError::NoFreeSlot`] if an endpoint is surrounded by faces
    pub fn add_edge(&mut self, n1: NodeId, n2: NodeId) -> Result<EdgeId> {
        self.require_node(n1)?;
        self.require_node(n2)?;
        if n1 == n2 {
            return Err(MeshError::LoopEdge { node: n1 });
        }
        if let Some(he) = self.find_halfedge(n1, n2) {
            return Err(MeshError::DuplicateEdge {
                n1,
                n2,
                edge: he.edge(),
            });
        }

        let in1 = self.free_slot(n1)?;
        let in2 = self.free_slot(n2)?;

        let e = self.edges.insert_with_key(|e| {
            let he0 = HalfEdgeId::new(e, 0);
            let he1 = HalfEdgeId::new(e, 1);
            Edge {
                halfedges: [
                    HalfEdge {
                        origin: n1,
                        next: he1,
                        prev: he1,
                        face: None,
                    },
                    HalfEdge {
                        origin: n2,
                        next: he0,
                        prev: he0,
                        face: None,
                    },
                ],
            }
        });
        let he0 = HalfEdgeId::new(e, 0);
        let he1 = he0.pair();

        match in1 {
            Some(incoming) => self.splice(incoming, he0),
            None => self.node_mut(n1).out = Some(he0),
        }
        match in2 {
            Some(incoming) => self.splice(incoming, he1),
            None => self.node_mut(n2).out = Some(he1),
        }

        Ok(e)
    }

    /// Remove an edge and the faces on either side of it.
    pub fn remove_edge(&mut self, e: EdgeId) -> Result<()> {
        self.require_edge(e)?;
        let [he0, he1] = self.edge_halfedges(e);

        for he in [he0, he1] {
            if let Some(f) = self.face_of(he) {
                self.remove_face(f)?;
            }
        }

        for he in [he0, he1] {
            let n = self.origin(he);
            if self.out_halfedge(n) == Some(he) {
                let candidate = self.next(he.pair());
                self.node_mut(n).out = (candidate != he).then_some(candidate);
            }
        }

        // Unsplice from both vertex cycles.
        let (p0, n0) = (self.prev(he0), self.next(he1));
        let (p1, n1) = (self.prev(he1), self.next(he0));
        self.link(p0, n0);
        self.link(p1, n1);

        self.edges.remove(e);
        Ok(())
    }

    // ==================== Faces ====================

    /// Create a face bounded by three chained boundary half-edges.
    ///
    /// The half-edges must run `he1 -> he2 -> he3 -> he1` and none of them may
    /// already bound a face. The vertex cycles at the three corners are
    /// reordered so that the half-edges form a 3-cycle.
    ///
    /// # Errors
    ///
    /// - [`MeshError::NotFree`] if a half-edge already has a face
    /// - [`MeshError::NotChain`] if consecutive half-edges do not meet
    /// - [`MeshError::NonManifold`] if a corner cannot be reordered; the mesh
    ///   is left unchanged
    pub fn add_face(&mut self, he1: HalfEdgeId, he2: HalfEdgeId, he3: HalfEdgeId) -> Result<FaceId> {
        for he in [he1, he2, he3] {
            if !self.contains_halfedge(he) {
                return Err(MeshError::stale(he));
            }
        }
        for he in [he1, he2, he3] {
            if !self.is_boundary_halfedge(he) {
                return Err(MeshError::NotFree { halfedge: he });
            }
        }
        let corners = [(he1, he2), (he2, he3), (he3, he1)];
        for (a, b) in corners {
            if a.edge() == b.edge() || self.dest(a) != self.origin(b) {
                return Err(MeshError::NotChain {
                    first: a,
                    second: b,
                });
            }
        }

        let mut journal = Vec::new();
        for (a, b) in corners {
            if let Err(err) = self.make_adjacent(a, b, &mut journal) {
                self.rollback(journal);
                return Err(err);
            }
        }

        let f = self.faces.insert(Face { halfedge: he1 });
        for he in [he1, he2, he3] {
            self.halfedge_mut(he).face = Some(f);
        }
        Ok(f)
    }

    /// Remove a face, leaving its half-edges on the boundary.
    pub fn remove_face(&mut self, f: FaceId) -> Result<()> {
        self.require_face(f)?;
        let halfedges: Vec<HalfEdgeId> = self.face_halfedges(f).collect();
        for he in halfedges {
            self.halfedge_mut(he).face = None;
        }
        self.faces.remove(f);
        Ok(())
    }

    // ==================== Compound operators ====================

    /// Replace an interior edge by the other diagonal of its quadrilateral.
    ///
    /// Returns the new edge; its side 0 runs between the two former apexes.
    ///
    /// # Errors
    ///
    /// - [`MeshError::BoundaryEdge`] if either side has no face
    /// - [`MeshError::NotSwappable`] if the quadrilateral is not strictly convex
    pub fn swap_edge(&mut self, e: EdgeId) -> Result<EdgeId> {
        self.require_edge(e)?;
        if self.is_boundary_edge(e) {
            return Err(MeshError::BoundaryEdge { edge: e });
        }
        if !self.edge_is_swappable(e) {
            return Err(MeshError::NotSwappable { edge: e });
        }

        let [h0, h1] = self.edge_halfedges(e);
        let e1 = self.next(h0);
        let e2 = self.prev(h0);
        let e3 = self.next(h1);
        let e4 = self.prev(h1);
        let n1 = self.origin(e2);
        let n2 = self.origin(e4);

        if let Some(existing) = self.find_halfedge(n1, n2) {
            return Err(MeshError::NonManifold {
                details: format!(
                    "diagonal of {:?} already exists as {:?}",
                    e,
                    existing.edge()
                ),
            });
        }

        self.remove_edge(e)?;
        let new_edge = self.add_edge(n1, n2)?;
        let [d0, d1] = self.edge_halfedges(new_edge);
        self.add_face(e2, e3, d1)?;
        self.add_face(e1, d0, e4)?;

        trace!("swapped {:?} into {:?}", e, new_edge);
        Ok(new_edge)
    }

    /// Split an edge at `p`, which should lie on the edge.
    ///
    /// The edge is replaced by two edges meeting at a new node; each side
    /// that had a face is re-triangulated with an extra edge to its apex.
    /// Returns the new node.
    pub fn split_edge(&mut self, e: EdgeId, p: Point2<f64>) -> Result<NodeId> {
        self.require_edge(e)?;
        let [he0, he1] = self.edge_halfedges(e);

        let side0 = self
            .face_of(he0)
            .map(|_| (self.next(he0), self.prev(he0)));
        let side1 = self
            .face_of(he1)
            .map(|_| (self.next(he1), self.prev(he1)));
        let n0 = self.origin(he0);
        let n1 = self.origin(he1);

        self.remove_edge(e)?;

        let n = self.add_node(p);
        // Side 0 of each runs towards the new node.
        let [a0, a1] = {
            let e1 = self.add_edge(n0, n)?;
            self.edge_halfedges(e1)
        };
        let [b0, b1] = {
            let e2 = self.add_edge(n1, n)?;
            self.edge_halfedges(e2)
        };

        if let Some((next0, prev0)) = side0 {
            let apex = self.origin(prev0);
            let [c0, c1] = {
                let e3 = self.add_edge(n, apex)?;
                self.edge_halfedges(e3)
            };
            self.add_face(prev0, a0, c0)?;
            self.add_face(next0, c1, b1)?;
        }

        if let Some((next1, prev1)) = side1 {
            let apex = self.origin(prev1);
            let [c0, c1] = {
                let e4 = self.add_edge(n, apex)?;
                self.edge_halfedges(e4)
            };
            self.add_face(prev1, b0, c0)?;
            self.add_face(next1, c1, a1)?;
        }

        trace!("split {:?} at ({}, {})", e, p.x, p.y);
        Ok(n)
    }

    /// Split a face at an interior point `p` into three faces.
    ///
    /// Returns the new node.
    pub fn split_face(&mut self, f: FaceId, p: Point2<f64>) -> Result<NodeId> {
        self.require_face(f)?;
        let he1 = self.face_halfedge(f);
        let he2 = self.next(he1);
        let he3 = self.next(he2);
        let [v1, v2, v3] = [he1, he2, he3].map(|he| self.origin(he));

        self.remove_face(f)?;
        let n = self.add_node(p);
        // Side 0 of each spoke leaves the new node.
        let [s1_out, s1_in] = {
            let e = self.add_edge(n, v1)?;
            self.edge_halfedges(e)
        };
        let [s2_out, s2_in] = {
            let e = self.add_edge(n, v2)?;
            self.edge_halfedges(e)
        };
        let [s3_out, s3_in] = {
            let e = self.add_edge(n, v3)?;
            self.edge_halfedges(e)
        };

        self.add_face(he1, s2_in, s1_out)?;
        self.add_face(he2, s3_in, s2_out)?;
        self.add_face(he3, s1_in, s3_out)?;

        trace!("split {:?} at ({}, {})", f, p.x, p.y);
        Ok(n)
    }

    /// Merge the endpoints of an interior edge into one node at its midpoint.
    ///
    /// The origin of side 0 is removed and the other endpoint survives; the
    /// two faces beside the edge disappear and the fan around the removed
    /// node is re-attached to the survivor. Returns the surviving node.
    ///
    /// # Errors
    ///
    /// All checks happen before anything is modified:
    ///
    /// - [`MeshError::BoundaryEdge`] if the edge lies on the boundary
    /// - [`MeshError::BoundaryNode`] if either endpoint lies on the boundary
    /// - [`MeshError::NonManifold`] if the endpoints share neighbours other
    ///   than the two apexes
    /// - [`MeshError::InvertedFace`] if moving to the midpoint would fold a face
    pub fn collapse_edge(&mut self, e: EdgeId) -> Result<NodeId> {
        self.require_edge(e)?;
        if self.is_boundary_edge(e) {
            return Err(MeshError::BoundaryEdge { edge: e });
        }
        let [h0, h1] = self.edge_halfedges(e);
        let removed = self.origin(h0);
        let kept = self.origin(h1);
        for n in [removed, kept] {
            if self.is_boundary_node(n) {
                return Err(MeshError::BoundaryNode { node: n });
            }
        }

        let apexes: HashSet<NodeId> = [self.origin(self.prev(h0)), self.origin(self.prev(h1))]
            .into_iter()
            .collect();
        let kept_neighbors = self.neighbor_set(kept);
        let common: HashSet<NodeId> = self
            .neighbors(removed)
            .filter(|n| kept_neighbors.contains(n))
            .collect();
        if common != apexes {
            return Err(MeshError::NonManifold {
                details: format!(
                    "endpoints of {:?} share {} neighbours, collapse would pinch the mesh",
                    e,
                    common.len()
                ),
            });
        }

        let [f0, f1] = [self.face_of(h0), self.face_of(h1)];
        let mid = geometry::midpoint(&self.position(removed), &self.position(kept));
        for n in [removed, kept] {
            for f in self.node_faces(n) {
                if Some(f) == f0 || Some(f) == f1 {
                    continue;
                }
                let [a, b, c] = self
                    .face_nodes(f)
                    .map(|m| if m == removed || m == kept { mid } else { self.position(m) });
                if self.kernel.orient2d(&a, &b, &c) <= 0.0 {
                    return Err(MeshError::InvertedFace { face: f });
                }
            }
        }

        // Outer edges of the fan around `removed`, clockwise, starting next
        // to the face on side 1 and skipping the two faces that vanish.
        let skip = [h0, self.next(h1)];
        let rim: Vec<HalfEdgeId> = self
            .outgoing_halfedges(removed)
            .skip_while(|he| !skip.contains(he))
            .chain(self.outgoing_halfedges(removed).take_while(|he| !skip.contains(he)))
            .filter(|he| !skip.contains(he))
            .map(|he| self.next(he))
            .collect();

        self.remove_node(removed)?;
        self.set_position(kept, mid);

        for o in rim {
            let (wi, wj) = (self.origin(o), self.dest(o));
            let to_wi = match self.find_halfedge(kept, wi) {
                Some(he) => he,
                None => {
                    let e = self.add_edge(kept, wi)?;
                    self.edge_halfedge(e)
                }
            };
            let from_wj = match self.find_halfedge(wj, kept) {
                Some(he) => he,
                None => {
                    let e = self.add_edge(wj, kept)?;
                    self.edge_halfedge(e)
                }
            };
            self.add_face(o, from_wj, to_wi)?;
        }

        trace!("collapsed {:?} into {:?}", e, kept);
        Ok(kept)
    }
}
