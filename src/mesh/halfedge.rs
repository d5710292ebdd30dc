//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list)
//! representation for planar triangle meshes.
//!
//! # Structure
//!
//! - Each edge owns two **half-edges** pointing in opposite directions.
//! - Each half-edge knows its **origin** node, the **next** and **prev**
//!   half-edges of the cycle it currently bounds, and optionally a **face**.
//! - Each node stores one outgoing half-edge, or none if it is isolated.
//! - Each face stores one of its three half-edges. Faces are oriented
//!   counter-clockwise, so a face lies to the left of its half-edges.
//!
//! # Boundary Handling
//!
//! A half-edge without a face lies on the mesh boundary. Boundary half-edges
//! are linked into cycles by `next`/`prev` like face half-edges, so the outer
//! boundary of a meshed polygon can be walked with [`Mesh::next`].
//!
//! # Vertex cycles
//!
//! The outgoing half-edges of a node form a cycle: stepping from `he` to
//! `next(pair(he))` visits them all (clockwise) and returns to the start.

use std::collections::HashSet;

use nalgebra::Point2;
use slotmap::{SecondaryMap, SlotMap};

use super::keys::{EdgeId, FaceId, HalfEdgeId, NodeId};
use crate::error::{MeshError, Result};
use crate::geometry::{self, Kernel, RobustKernel};

/// A node (vertex) of the mesh.
#[derive(Debug, Clone)]
pub struct Node {
    /// The position of this node.
    pub position: Point2<f64>,

    /// One outgoing half-edge, or `None` for an isolated node.
    pub out: Option<HalfEdgeId>,
}

impl Node {
    /// Create an isolated node at the given position.
    pub fn new(position: Point2<f64>) -> Self {
        Self {
            position,
            out: None,
        }
    }
}

/// One direction of an edge.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The node this half-edge starts at.
    pub origin: NodeId,

    /// The next half-edge around the cycle this half-edge bounds.
    pub next: HalfEdgeId,

    /// The previous half-edge around the cycle this half-edge bounds.
    pub prev: HalfEdgeId,

    /// The face on the left, or `None` on the boundary.
    pub face: Option<FaceId>,
}

impl HalfEdge {
    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.face.is_none()
    }
}

/// An undirected edge, owning its two half-edges.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) halfedges: [HalfEdge; 2],
}

impl Edge {
    /// The two endpoints, in the direction of side 0.
    #[inline]
    pub fn nodes(&self) -> [NodeId; 2] {
        [self.halfedges[0].origin, self.halfedges[1].origin]
    }

    /// The half-edge record for one side.
    #[inline]
    pub fn halfedge(&self, side: usize) -> &HalfEdge {
        &self.halfedges[side]
    }
}

/// A triangular face.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,
}

/// A planar triangle mesh with half-edge connectivity.
///
/// The kernel `K` supplies the geometric predicates used by every operator
/// and algorithm that makes a topological decision.
#[derive(Debug, Clone)]
pub struct Mesh<K: Kernel = RobustKernel> {
    /// All live nodes.
    pub(crate) nodes: SlotMap<NodeId, Node>,

    /// All live edges, each with its two half-edges.
    pub(crate) edges: SlotMap<EdgeId, Edge>,

    /// All live faces.
    pub(crate) faces: SlotMap<FaceId, Face>,

    pub(crate) kernel: K,
}

impl<K: Kernel> Default for Mesh<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> Mesh<K> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::with_kernel(K::default())
    }

    /// Create a new empty mesh using the given kernel instance.
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            kernel,
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_nodes: usize) -> Self {
        // Planar triangulation: E <= 3V, F <= 2V.
        Self {
            nodes: SlotMap::with_capacity_and_key(num_nodes),
            edges: SlotMap::with_capacity_and_key(3 * num_nodes),
            faces: SlotMap::with_capacity_and_key(2 * num_nodes),
            kernel: K::default(),
        }
    }

    /// The predicate kernel of this mesh.
    #[inline]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    // ==================== Counts ====================

    /// Get the number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of half-edges (twice the number of edges).
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        2 * self.edges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Check whether the mesh has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ==================== Liveness ====================

    /// Whether `n` refers to a live node.
    #[inline]
    pub fn contains_node(&self, n: NodeId) -> bool {
        self.nodes.contains_key(n)
    }

    /// Whether `e` refers to a live edge.
    #[inline]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains_key(e)
    }

    /// Whether `he` refers to a half-edge of a live edge.
    #[inline]
    pub fn contains_halfedge(&self, he: HalfEdgeId) -> bool {
        self.edges.contains_key(he.edge())
    }

    /// Whether `f` refers to a live face.
    #[inline]
    pub fn contains_face(&self, f: FaceId) -> bool {
        self.faces.contains_key(f)
    }

    pub(crate) fn require_node(&self, n: NodeId) -> Result<()> {
        if self.contains_node(n) {
            Ok(())
        } else {
            Err(MeshError::stale(n))
        }
    }

    pub(crate) fn require_edge(&self, e: EdgeId) -> Result<()> {
        if self.contains_edge(e) {
            Ok(())
        } else {
            Err(MeshError::stale(e))
        }
    }

    pub(crate) fn require_face(&self, f: FaceId) -> Result<()> {
        if self.contains_face(f) {
            Ok(())
        } else {
            Err(MeshError::stale(f))
        }
    }

    // ==================== Accessors ====================
    //
    // Accessors index the arenas directly and panic on a stale handle.
    // Operators check their arguments first and report `StaleHandle`.

    /// Get a node by ID.
    #[inline]
    pub fn node(&self, n: NodeId) -> &Node {
        &self.nodes[n]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, e: EdgeId) -> &Edge {
        &self.edges[e]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f]
    }

    /// Get a half-edge record by ID.
    #[inline]
    pub fn halfedge(&self, he: HalfEdgeId) -> &HalfEdge {
        &self.edges[he.edge()].halfedges[he.side()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, he: HalfEdgeId) -> &mut HalfEdge {
        &mut self.edges[he.edge()].halfedges[he.side()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, n: NodeId) -> &mut Node {
        &mut self.nodes[n]
    }

    /// Get the position of a node.
    #[inline]
    pub fn position(&self, n: NodeId) -> Point2<f64> {
        self.nodes[n].position
    }

    /// Move a node.
    ///
    /// Connectivity is unchanged; the caller is responsible for not folding
    /// any face over.
    #[inline]
    pub fn set_position(&mut self, n: NodeId, p: Point2<f64>) {
        self.nodes[n].position = p;
    }

    // ==================== Topology Queries ====================

    /// Get the pair (opposite) half-edge.
    #[inline]
    pub fn pair(&self, he: HalfEdgeId) -> HalfEdgeId {
        he.pair()
    }

    /// Get the next half-edge around the cycle.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the cycle.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the origin node of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> NodeId {
        self.halfedge(he).origin
    }

    /// Get the destination node of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> NodeId {
        self.origin(he.pair())
    }

    /// Get the face of a half-edge, `None` on the boundary.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> Option<FaceId> {
        self.halfedge(he).face
    }

    /// Get the stored outgoing half-edge of a node.
    #[inline]
    pub fn out_halfedge(&self, n: NodeId) -> Option<HalfEdgeId> {
        self.nodes[n].out
    }

    /// Side 0 half-edge of an edge.
    #[inline]
    pub fn edge_halfedge(&self, e: EdgeId) -> HalfEdgeId {
        HalfEdgeId::new(e, 0)
    }

    /// Both half-edges of an edge.
    #[inline]
    pub fn edge_halfedges(&self, e: EdgeId) -> [HalfEdgeId; 2] {
        [HalfEdgeId::new(e, 0), HalfEdgeId::new(e, 1)]
    }

    /// The endpoints of an edge.
    #[inline]
    pub fn edge_nodes(&self, e: EdgeId) -> [NodeId; 2] {
        self.edges[e].nodes()
    }

    /// The half-edge of `e` that starts at `n`, if `n` is an endpoint.
    pub fn halfedge_with_origin(&self, e: EdgeId, n: NodeId) -> Option<HalfEdgeId> {
        self.edge_halfedges(e)
            .into_iter()
            .find(|&he| self.origin(he) == n)
    }

    /// The half-edge running from `from` to `to`, if the nodes are connected.
    pub fn find_halfedge(&self, from: NodeId, to: NodeId) -> Option<HalfEdgeId> {
        self.outgoing_halfedges(from).find(|&he| self.dest(he) == to)
    }

    /// The face with nodes `a`, `b`, `c` in counter-clockwise order.
    pub fn find_face(&self, a: NodeId, b: NodeId, c: NodeId) -> Option<FaceId> {
        let he = self.find_halfedge(a, b)?;
        let f = self.face_of(he)?;
        (self.origin(self.prev(he)) == c).then_some(f)
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if an edge has a boundary half-edge on either side.
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId) -> bool {
        let edge = &self.edges[e];
        edge.halfedges[0].is_boundary() || edge.halfedges[1].is_boundary()
    }

    /// Check if a node is on the boundary.
    ///
    /// Isolated nodes count as boundary nodes.
    pub fn is_boundary_node(&self, n: NodeId) -> bool {
        if self.nodes[n].out.is_none() {
            return true;
        }
        self.outgoing_halfedges(n)
            .any(|he| self.is_boundary_halfedge(he) || self.is_boundary_halfedge(he.pair()))
    }

    /// Number of edges incident to a node.
    pub fn degree(&self, n: NodeId) -> usize {
        self.outgoing_halfedges(n).count()
    }

    // ==================== Iteration ====================

    /// Iterate over all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    /// Iterate over all nodes with their IDs.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter()
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys()
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.edges
            .keys()
            .flat_map(|e| [HalfEdgeId::new(e, 0), HalfEdgeId::new(e, 1)])
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.keys()
    }

    /// Iterate over the outgoing half-edges of a node.
    pub fn outgoing_halfedges(&self, n: NodeId) -> OutgoingHalfEdges<'_, K> {
        OutgoingHalfEdges::new(self, n)
    }

    /// Iterate over the nodes adjacent to a node.
    pub fn neighbors(&self, n: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing_halfedges(n).map(move |he| self.dest(he))
    }

    /// Iterate over the faces around a node.
    pub fn node_faces(&self, n: NodeId) -> impl Iterator<Item = FaceId> + '_ {
        self.outgoing_halfedges(n)
            .filter_map(move |he| self.face_of(he))
    }

    /// Iterate over the half-edges of a face.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdges<'_, K> {
        FaceHalfEdges::new(self, f)
    }

    /// Iterate over all boundary half-edges.
    pub fn boundary_halfedges(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.halfedge_ids()
            .filter(move |&he| self.is_boundary_halfedge(he))
    }

    /// Any boundary half-edge, or `None` if the mesh has no edges.
    pub fn boundary_halfedge(&self) -> Option<HalfEdgeId> {
        self.boundary_halfedges().next()
    }

    // ==================== Faces ====================

    /// The stored half-edge of a face.
    #[inline]
    pub fn face_halfedge(&self, f: FaceId) -> HalfEdgeId {
        self.faces[f].halfedge
    }

    /// The three nodes of a face, counter-clockwise.
    pub fn face_nodes(&self, f: FaceId) -> [NodeId; 3] {
        let he0 = self.face_halfedge(f);
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    /// The positions of the three nodes of a face.
    pub fn face_points(&self, f: FaceId) -> [Point2<f64>; 3] {
        let [n0, n1, n2] = self.face_nodes(f);
        [self.position(n0), self.position(n1), self.position(n2)]
    }

    /// Area of a face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let [a, b, c] = self.face_points(f);
        geometry::triangle_area(&a, &b, &c)
    }

    /// Interior angles of a face at its three nodes, in radians.
    pub fn face_angles(&self, f: FaceId) -> [f64; 3] {
        let [a, b, c] = self.face_points(f);
        geometry::triangle_angles(&a, &b, &c)
    }

    /// Smallest interior angle of a face, in radians.
    pub fn face_min_angle(&self, f: FaceId) -> f64 {
        let [a, b, c] = self.face_points(f);
        geometry::min_angle(&a, &b, &c)
    }

    /// Circumcenter of a face, `None` if it is degenerate.
    pub fn face_circumcenter(&self, f: FaceId) -> Option<Point2<f64>> {
        let [a, b, c] = self.face_points(f);
        geometry::circumcenter(&a, &b, &c)
    }

    /// The shortest half-edge of a face and its length.
    pub fn face_shortest_edge(&self, f: FaceId) -> (HalfEdgeId, f64) {
        let he0 = self.face_halfedge(f);
        let mut best = (he0, self.halfedge_length(he0));
        for he in self.face_halfedges(f).skip(1) {
            let length = self.halfedge_length(he);
            if length < best.1 {
                best = (he, length);
            }
        }
        best
    }

    // ==================== Geometry ====================

    /// Length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let [a, b] = self.edge_nodes(e);
        geometry::distance(&self.nodes[a].position, &self.nodes[b].position)
    }

    /// Length of the edge a half-edge belongs to.
    #[inline]
    pub fn halfedge_length(&self, he: HalfEdgeId) -> f64 {
        self.edge_length(he.edge())
    }

    /// Midpoint of an edge.
    pub fn edge_midpoint(&self, e: EdgeId) -> Point2<f64> {
        let [a, b] = self.edge_nodes(e);
        geometry::midpoint(&self.nodes[a].position, &self.nodes[b].position)
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        geometry::bounding_box(self.nodes.values().map(|n| &n.position))
    }

    /// Total area of all faces.
    pub fn total_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Smallest interior angle over all faces, in radians.
    ///
    /// Returns `None` for a mesh without faces.
    pub fn smallest_angle(&self) -> Option<f64> {
        self.face_ids()
            .map(|f| self.face_min_angle(f))
            .min_by(f64::total_cmp)
    }

    // ==================== Construction ====================

    /// Add an isolated node and return its ID.
    pub fn add_node(&mut self, position: Point2<f64>) -> NodeId {
        self.nodes.insert(Node::new(position))
    }

    // ==================== Export ====================

    /// Enumerate nodes with sequential indices and faces as index triples.
    pub fn to_face_vertex(&self) -> (Vec<Point2<f64>>, Vec<[usize; 3]>) {
        let mut index: SecondaryMap<NodeId, usize> = SecondaryMap::with_capacity(self.nodes.len());
        let points: Vec<Point2<f64>> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, (n, node))| {
                index.insert(n, i);
                node.position
            })
            .collect();

        let triangles = self
            .face_ids()
            .map(|f| self.face_nodes(f).map(|n| index[n]))
            .collect();

        (points, triangles)
    }

    /// Endpoint coordinates of every edge.
    pub fn edge_segments(&self) -> Vec<(Point2<f64>, Point2<f64>)> {
        self.edges
            .values()
            .map(|edge| {
                let [a, b] = edge.nodes();
                (self.nodes[a].position, self.nodes[b].position)
            })
            .collect()
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        self.check_invariants().is_ok()
    }

    /// Verify the connectivity invariants and report the first violation.
    ///
    /// Checks handle liveness, `next`/`prev` inversion, chaining of `next`
    /// (a half-edge's successor starts where it ends), absence of loop edges,
    /// face 3-cycles, closed vertex cycles that reach every outgoing
    /// half-edge, and the presence of a boundary.
    pub fn check_invariants(&self) -> Result<()> {
        let fail = |msg: String| Err(MeshError::InvalidState(msg));

        let mut outgoing: SecondaryMap<NodeId, usize> = SecondaryMap::new();

        for he in self.halfedge_ids() {
            let rec = self.halfedge(he);
            if !self.contains_node(rec.origin) {
                return fail(format!("{:?} starts at a removed node", he));
            }
            match outgoing.get_mut(rec.origin) {
                Some(count) => *count += 1,
                None => {
                    outgoing.insert(rec.origin, 1);
                }
            }

            if !self.contains_halfedge(rec.next) || !self.contains_halfedge(rec.prev) {
                return fail(format!("{:?} links to a removed half-edge", he));
            }
            if self.prev(rec.next) != he {
                return fail(format!("next({:?}).prev is not the half-edge itself", he));
            }
            if self.next(rec.prev) != he {
                return fail(format!("prev({:?}).next is not the half-edge itself", he));
            }
            if self.origin(rec.next) != self.dest(he) {
                return fail(format!("next({:?}) does not start where it ends", he));
            }
            if rec.origin == self.dest(he) {
                return fail(format!("{:?} is a loop edge", he.edge()));
            }

            if let Some(f) = rec.face {
                if !self.contains_face(f) {
                    return fail(format!("{:?} refers to removed face {:?}", he, f));
                }
                let he1 = rec.next;
                let he2 = self.next(he1);
                if self.next(he2) != he {
                    return fail(format!("face {:?} is not a triangle", f));
                }
                if self.face_of(he1) != Some(f) || self.face_of(he2) != Some(f) {
                    return fail(format!("face {:?} has inconsistent half-edges", f));
                }
            }
        }

        for (f, face) in &self.faces {
            if !self.contains_halfedge(face.halfedge) || self.face_of(face.halfedge) != Some(f) {
                return fail(format!("face {:?} has a dangling half-edge", f));
            }
        }

        for (n, node) in &self.nodes {
            let count = outgoing.get(n).copied().unwrap_or(0);
            match node.out {
                None if count > 0 => {
                    return fail(format!("node {:?} has edges but no outgoing half-edge", n));
                }
                None => {}
                Some(out) => {
                    if !self.contains_halfedge(out) || self.origin(out) != n {
                        return fail(format!("node {:?} has a foreign outgoing half-edge", n));
                    }
                    let mut visited = 1;
                    let mut he = self.next(out.pair());
                    while he != out {
                        visited += 1;
                        if visited > count {
                            return fail(format!("vertex cycle of {:?} does not close", n));
                        }
                        he = self.next(he.pair());
                    }
                    if visited != count {
                        return fail(format!(
                            "vertex cycle of {:?} visits {} of {} half-edges",
                            n, visited, count
                        ));
                    }
                }
            }
        }

        if !self.edges.is_empty() && self.boundary_halfedge().is_none() {
            return fail("mesh has no boundary".to_string());
        }

        Ok(())
    }

    /// Euler characteristic `V - E + F` over interior faces.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_nodes() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    /// Collect the nodes adjacent to `n` into a set.
    pub(crate) fn neighbor_set(&self, n: NodeId) -> HashSet<NodeId> {
        self.neighbors(n).collect()
    }
}

/// Iterator over the outgoing half-edges of a node.
pub struct OutgoingHalfEdges<'a, K: Kernel> {
    mesh: &'a Mesh<K>,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
}

impl<'a, K: Kernel> OutgoingHalfEdges<'a, K> {
    fn new(mesh: &'a Mesh<K>, n: NodeId) -> Self {
        let start = mesh.nodes[n].out;
        Self {
            mesh,
            start,
            current: start,
        }
    }
}

impl<'a, K: Kernel> Iterator for OutgoingHalfEdges<'a, K> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;

        // he leaves v, pair(he) arrives at v, and next(pair(he)) leaves v again.
        let step = self.mesh.next(result.pair());
        self.current = if Some(step) == self.start {
            None
        } else {
            Some(step)
        };

        Some(result)
    }
}

/// Iterator over the three half-edges of a face.
pub struct FaceHalfEdges<'a, K: Kernel> {
    mesh: &'a Mesh<K>,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
}

impl<'a, K: Kernel> FaceHalfEdges<'a, K> {
    fn new(mesh: &'a Mesh<K>, f: FaceId) -> Self {
        let start = mesh.faces[f].halfedge;
        Self {
            mesh,
            start,
            current: Some(start),
        }
    }
}

impl<'a, K: Kernel> Iterator for FaceHalfEdges<'a, K> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        let step = self.mesh.next(result);
        self.current = (step != self.start).then_some(step);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_triangle() -> (Mesh, [NodeId; 3]) {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(Point2::new(0.0, 0.0));
        let b = mesh.add_node(Point2::new(1.0, 0.0));
        let c = mesh.add_node(Point2::new(0.0, 1.0));
        let ab = mesh.add_edge(a, b).unwrap();
        let bc = mesh.add_edge(b, c).unwrap();
        let ca = mesh.add_edge(c, a).unwrap();
        mesh.add_face(
            mesh.halfedge_with_origin(ab, a).unwrap(),
            mesh.halfedge_with_origin(bc, b).unwrap(),
            mesh.halfedge_with_origin(ca, c).unwrap(),
        )
        .unwrap();
        (mesh, [a, b, c])
    }

    #[test]
    fn test_empty_mesh() {
        let mesh: Mesh = Mesh::new();
        assert_eq!(mesh.num_nodes(), 0);
        assert_eq!(mesh.num_edges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_add_node() {
        let mut mesh: Mesh = Mesh::new();
        let n = mesh.add_node(Point2::new(1.0, 2.0));
        assert_eq!(mesh.num_nodes(), 1);
        assert_eq!(mesh.position(n), Point2::new(1.0, 2.0));
        assert!(mesh.out_halfedge(n).is_none());
        assert_eq!(mesh.degree(n), 0);
        assert!(mesh.is_boundary_node(n));
    }

    #[test]
    fn test_triangle_queries() {
        let (mesh, [a, b, c]) = create_triangle();
        assert!(mesh.is_valid());
        assert_eq!(mesh.euler_characteristic(), 1);

        let f = mesh.face_ids().next().unwrap();
        let nodes = mesh.face_nodes(f);
        // Same cyclic order as a, b, c.
        let start = nodes.iter().position(|&n| n == a).unwrap();
        assert_eq!(nodes[(start + 1) % 3], b);
        assert_eq!(nodes[(start + 2) % 3], c);

        assert!((mesh.face_area(f) - 0.5).abs() < 1e-12);
        assert_eq!(mesh.face_halfedges(f).count(), 3);
        assert_eq!(mesh.find_face(a, b, c), Some(f));
        assert_eq!(mesh.find_face(b, c, a), Some(f));
        assert_eq!(mesh.find_face(a, c, b), None);

        for n in [a, b, c] {
            assert_eq!(mesh.degree(n), 2);
            assert!(mesh.is_boundary_node(n));
        }
        assert_eq!(mesh.boundary_halfedges().count(), 3);
    }

    #[test]
    fn test_boundary_cycle_walk() {
        let (mesh, _) = create_triangle();
        let start = mesh.boundary_halfedge().unwrap();
        let mut he = start;
        let mut steps = 0;
        loop {
            assert!(mesh.is_boundary_halfedge(he));
            he = mesh.next(he);
            steps += 1;
            if he == start {
                break;
            }
        }
        assert_eq!(steps, 3);
    }

    #[test]
    fn test_export() {
        let (mesh, _) = create_triangle();
        let (points, triangles) = mesh.to_face_vertex();
        assert_eq!(points.len(), 3);
        assert_eq!(triangles.len(), 1);
        assert!(triangles[0].iter().all(|&i| i < 3));
        assert_eq!(mesh.edge_segments().len(), 3);

        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point2::new(0.0, 0.0));
        assert_eq!(max, Point2::new(1.0, 1.0));
    }

    #[test]
    fn test_shortest_edge_and_angles() {
        let (mesh, _) = create_triangle();
        let f = mesh.face_ids().next().unwrap();
        let (_, length) = mesh.face_shortest_edge(f);
        assert!((length - 1.0).abs() < 1e-12);
        let smallest = mesh.smallest_angle().unwrap();
        assert!((smallest - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }
}
