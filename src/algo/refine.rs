//! Quality refinement with Ruppert's algorithm.
//!
//! Refinement inserts Steiner points until every face is small enough and
//! has no angle below the requested minimum. The loop alternates between
//! two kinds of work:
//!
//! - **Encroached boundary edges.** A boundary edge whose diametral circle
//!   contains a node (or a point about to be inserted) is split, and the
//!   neighbourhood of the new node is made Delaunay again.
//! - **Bad faces.** A face that is too large, or too skinny without sitting
//!   in a sharp input corner, gets a new node at its circumcenter (or
//!   off-center). If that point would encroach a boundary edge, the
//!   insertion is rolled back and the edge is split instead.
//!
//! Large faces are handled before skinny ones; within each class, faces
//! with the shortest edge come first.
//!
//! # Example
//!
//! ```
//! use tessera::algo::{refine, triangulate, RefineOptions};
//! use tessera::polygon::Polygon;
//!
//! let mut mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
//! let options = RefineOptions::default()
//!     .with_max_area(0.01)
//!     .with_min_angle_degrees(25.0);
//! let stats = refine(&mut mesh, &options).unwrap();
//!
//! assert!(stats.steiner_points > 0);
//! assert!(mesh.face_ids().all(|f| mesh.face_area(f) <= 0.01));
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashSet};

use log::{debug, trace, warn};
use nalgebra::Point2;

use super::delaunay::{make_constrained_delaunay, recursive_swap_delaunay, recursive_swap_delaunay_logged, SwapLog};
use super::Progress;
use crate::error::{MeshError, Result};
use crate::geometry::{self, Kernel};
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, Location, Mesh, NodeId};

/// No triangle has all angles above 60 degrees.
const MIN_ANGLE_LIMIT_DEGREES: f64 = 60.0;

/// Where a new node is placed inside a bad face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionPoint {
    /// The circumcenter of the face.
    #[default]
    Circumcenter,
    /// The off-center: on the bisector of the shortest edge, no further
    /// away than needed to reach the target angle, and never beyond the
    /// circumcenter. Produces fewer Steiner points.
    OffCenter,
}

/// Options for [`refine`].
#[derive(Debug, Clone)]
pub struct RefineOptions {
    /// Faces with a larger area are split. Defaults to no limit.
    pub max_area: f64,

    /// Faces with a smaller angle (radians) are split, unless they sit in a
    /// sharp boundary corner. Defaults to 20 degrees.
    ///
    /// Termination is only guaranteed up to about 20.7 degrees; larger
    /// values usually work in practice but may exhaust `max_insertions`.
    pub min_angle: f64,

    /// Where new nodes go inside bad faces.
    pub insertion: InsertionPoint,

    /// Split boundary edges next to a corner at power-of-two distances from
    /// the corner, so that repeated splits near small input angles stop.
    pub concentric_shells: bool,

    /// Upper bound on insertion attempts before giving up.
    pub max_insertions: usize,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            max_area: f64::INFINITY,
            min_angle: 20f64.to_radians(),
            insertion: InsertionPoint::Circumcenter,
            concentric_shells: true,
            max_insertions: 1_000_000,
        }
    }
}

impl RefineOptions {
    /// Set the maximum face area.
    pub fn with_max_area(mut self, max_area: f64) -> Self {
        self.max_area = max_area;
        self
    }

    /// Set the minimum angle in radians.
    pub fn with_min_angle(mut self, min_angle: f64) -> Self {
        self.min_angle = min_angle;
        self
    }

    /// Set the minimum angle in degrees.
    pub fn with_min_angle_degrees(mut self, degrees: f64) -> Self {
        self.min_angle = degrees.to_radians();
        self
    }

    /// Set the insertion point rule.
    pub fn with_insertion(mut self, insertion: InsertionPoint) -> Self {
        self.insertion = insertion;
        self
    }

    /// Enable or disable concentric-shell splitting.
    pub fn with_concentric_shells(mut self, enabled: bool) -> Self {
        self.concentric_shells = enabled;
        self
    }

    /// Set the insertion budget.
    pub fn with_max_insertions(mut self, max_insertions: usize) -> Self {
        self.max_insertions = max_insertions;
        self
    }

    /// Check that the options are in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_area > 0.0) {
            return Err(MeshError::invalid_param(
                "max_area",
                self.max_area,
                "must be positive",
            ));
        }
        // Checked in degrees: 60f64.to_radians() rounds just below pi/3.
        let degrees = self.min_angle.to_degrees();
        if !(degrees > 0.0 && degrees < MIN_ANGLE_LIMIT_DEGREES - 1e-9) {
            return Err(MeshError::invalid_param(
                "min_angle",
                self.min_angle,
                "must lie strictly between 0 and 60 degrees",
            ));
        }
        Ok(())
    }
}

/// Statistics from a refinement run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineStats {
    /// Nodes added to the mesh.
    pub steiner_points: usize,
    /// Nodes added by splitting boundary edges.
    pub boundary_splits: usize,
    /// Nodes added inside faces.
    pub face_splits: usize,
    /// Nodes added on interior edges.
    pub edge_splits: usize,
    /// Insertions rolled back because they encroached a boundary edge.
    pub rejected_insertions: usize,
    /// Bad faces left as they are.
    pub skipped_faces: usize,
}

/// Refine a mesh in place.
///
/// The mesh is first made constrained Delaunay. On success every face that
/// was not skipped (see [`RefineStats::skipped_faces`]) has an area of at
/// most `max_area`, and every such face outside a sharp boundary corner has
/// a minimum angle of at least `min_angle`.
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] for out-of-range options
/// - [`MeshError::ConvergenceFailed`] when `max_insertions` is reached; the
///   mesh is valid but not fully refined
pub fn refine<K: Kernel>(mesh: &mut Mesh<K>, options: &RefineOptions) -> Result<RefineStats> {
    refine_with_progress(mesh, options, &Progress::none())
}

/// [`refine`] with progress reporting.
///
/// Reports the number of Steiner points so far against that number plus
/// the current queue of bad faces.
pub fn refine_with_progress<K: Kernel>(
    mesh: &mut Mesh<K>,
    options: &RefineOptions,
    progress: &Progress,
) -> Result<RefineStats> {
    options.validate()?;
    make_constrained_delaunay(mesh)?;

    let mut refiner = Refiner::new(mesh, options, progress);
    refiner.run()?;
    let stats = refiner.stats;

    debug!(
        "refinement inserted {} Steiner points ({} on the boundary, {} in faces, {} on edges), \
         rejected {} insertions, skipped {} faces",
        stats.steiner_points,
        stats.boundary_splits,
        stats.face_splits,
        stats.edge_splits,
        stats.rejected_insertions,
        stats.skipped_faces
    );
    Ok(stats)
}

/// Why a face needs work. Large faces outrank skinny ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Badness {
    Skinny,
    Large,
}

/// Entry of the bad-face queue.
#[derive(Debug, Clone, Copy)]
struct BadFace {
    badness: Badness,
    shortest_edge: f64,
    face: FaceId,
}

impl PartialEq for BadFace {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BadFace {}

impl PartialOrd for BadFace {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BadFace {
    // Max-heap order: larger badness, then shorter edge, then older handle.
    fn cmp(&self, other: &Self) -> Ordering {
        self.badness
            .cmp(&other.badness)
            .then_with(|| other.shortest_edge.total_cmp(&self.shortest_edge))
            .then_with(|| other.face.cmp(&self.face))
    }
}

struct Refiner<'a, K: Kernel> {
    mesh: &'a mut Mesh<K>,
    options: &'a RefineOptions,
    progress: &'a Progress,
    beta: f64,

    bad_faces: BinaryHeap<BadFace>,
    queued: HashSet<FaceId>,
    skipped: HashSet<FaceId>,
    encroached: BTreeSet<HalfEdgeId>,

    attempts: usize,
    stats: RefineStats,
}

impl<'a, K: Kernel> Refiner<'a, K> {
    fn new(mesh: &'a mut Mesh<K>, options: &'a RefineOptions, progress: &'a Progress) -> Self {
        Self {
            mesh,
            options,
            progress,
            beta: geometry::offcenter_beta(options.min_angle),
            bad_faces: BinaryHeap::new(),
            queued: HashSet::new(),
            skipped: HashSet::new(),
            encroached: BTreeSet::new(),
            attempts: 0,
            stats: RefineStats::default(),
        }
    }

    fn run(&mut self) -> Result<()> {
        let initial: Vec<HalfEdgeId> = self
            .mesh
            .boundary_halfedges()
            .map(|bhe| bhe.pair())
            .filter(|&he| self.mesh.halfedge_is_encroached(he))
            .collect();
        self.encroached.extend(initial);
        self.split_encroached(false)?;

        let faces: Vec<FaceId> = self.mesh.face_ids().collect();
        for f in faces {
            self.enqueue(f);
        }

        while let Some(bad) = self.next_bad_face() {
            self.progress.report(
                self.stats.steiner_points,
                self.stats.steiner_points + self.bad_faces.len() + 1,
                "refining",
            );
            self.fix(bad)?;
        }

        Ok(())
    }

    // ==================== Bad-face queue ====================

    fn badness(&self, f: FaceId) -> Option<Badness> {
        if self.mesh.face_area(f) > self.options.max_area {
            Some(Badness::Large)
        } else if self.mesh.face_min_angle(f) < self.options.min_angle
            && !self.mesh.is_restricted(f, self.options.min_angle)
        {
            Some(Badness::Skinny)
        } else {
            None
        }
    }

    fn enqueue(&mut self, f: FaceId) {
        if !self.mesh.contains_face(f) || self.skipped.contains(&f) || self.queued.contains(&f) {
            return;
        }
        if let Some(badness) = self.badness(f) {
            let (_, shortest_edge) = self.mesh.face_shortest_edge(f);
            self.queued.insert(f);
            self.bad_faces.push(BadFace {
                badness,
                shortest_edge,
                face: f,
            });
        }
    }

    fn enqueue_edge_faces(&mut self, e: EdgeId) {
        if !self.mesh.contains_edge(e) {
            return;
        }
        for he in self.mesh.edge_halfedges(e) {
            if let Some(f) = self.mesh.face_of(he) {
                self.enqueue(f);
            }
        }
    }

    /// Pop the worst face that is still alive and still bad.
    fn next_bad_face(&mut self) -> Option<FaceId> {
        while let Some(entry) = self.bad_faces.pop() {
            self.queued.remove(&entry.face);
            if self.mesh.contains_face(entry.face)
                && !self.skipped.contains(&entry.face)
                && self.badness(entry.face).is_some()
            {
                return Some(entry.face);
            }
        }
        None
    }

    fn skip(&mut self, f: FaceId, reason: &str) {
        warn!(
            "leaving bad face {:?} (min angle {:.2} deg, area {:.3e}): {}",
            f,
            self.mesh.face_min_angle(f).to_degrees(),
            self.mesh.face_area(f),
            reason
        );
        self.skipped.insert(f);
        self.stats.skipped_faces += 1;
    }

    // ==================== Bad faces ====================

    fn insertion_point(&self, f: FaceId) -> Option<Point2<f64>> {
        let [a, b, c] = self.mesh.face_points(f);
        match self.options.insertion {
            InsertionPoint::Circumcenter => geometry::circumcenter(&a, &b, &c),
            InsertionPoint::OffCenter => geometry::offcenter(&a, &b, &c, self.beta),
        }
    }

    fn fix(&mut self, bad: FaceId) -> Result<()> {
        let Some(center) = self.insertion_point(bad) else {
            self.skip(bad, "face is degenerate");
            return Ok(());
        };
        let nodes = self.mesh.face_nodes(bad);
        let (_, shortest) = self.mesh.face_shortest_edge(bad);
        let context = Attempt {
            nodes,
            shortest,
            area: self.mesh.face_area(bad),
        };

        match self.mesh.locate(&center, bad)? {
            Location::InFace(target) => self.insert_in_face(target, center, &context)?,
            Location::OnEdge(he) if self.mesh.is_boundary_edge(he.edge()) => {
                let inner = if self.mesh.is_boundary_halfedge(he) {
                    he.pair()
                } else {
                    he
                };
                self.encroached.insert(inner);
                self.split_encroached(true)?;
            }
            Location::OnEdge(he) => self.insert_on_edge(he, center, &context)?,
            Location::OnNode(_) => {
                self.skip(bad, "insertion point coincides with a node");
                return Ok(());
            }
            Location::Outside(bhe) => {
                trace!("insertion point outside the mesh, splitting {:?}", bhe.edge());
                self.encroached.insert(bhe.pair());
                self.split_encroached(true)?;
            }
        }

        // The bad face stays queued while it survives.
        let [a, b, c] = context.nodes;
        if let Some(f) = self.mesh.find_face(a, b, c) {
            self.enqueue(f);
        }
        Ok(())
    }

    fn insert_in_face(&mut self, target: FaceId, p: Point2<f64>, context: &Attempt) -> Result<()> {
        let he1 = self.mesh.face_halfedge(target);
        let he2 = self.mesh.next(he1);
        let he3 = self.mesh.next(he2);
        let ring = self.mesh.face_nodes(target);

        self.check_budget()?;
        let n = self.mesh.split_face(target, p)?;
        let mut log = SwapLog::new();
        for he in [he1, he2, he3] {
            recursive_swap_delaunay_logged(self.mesh, he, &mut log)?;
        }

        let encroached = self.encroached_by_node(n);
        if encroached.is_empty() {
            log.commit();
            self.stats.face_splits += 1;
            self.stats.steiner_points += 1;
            self.treat_new_node(n, true);
            return Ok(());
        }

        let restored = log.undo(self.mesh)?;
        self.mesh.remove_node(n)?;
        let f = self.restore_face(ring)?;
        self.after_rejection(restored, &[f], encroached, context)
    }

    fn insert_on_edge(&mut self, he: HalfEdgeId, p: Point2<f64>, context: &Attempt) -> Result<()> {
        let e = he.edge();
        let [h0, h1] = self.mesh.edge_halfedges(e);
        let n1 = self.mesh.origin(h0);
        let n2 = self.mesh.origin(h1);
        let n3 = self.mesh.origin(self.mesh.prev(h0));
        let n4 = self.mesh.origin(self.mesh.prev(h1));
        let quad = [
            self.mesh.next(h0),
            self.mesh.prev(h0),
            self.mesh.next(h1),
            self.mesh.prev(h1),
        ];

        self.check_budget()?;
        let n = self.mesh.split_edge(e, p)?;
        let mut log = SwapLog::new();
        for he in quad {
            recursive_swap_delaunay_logged(self.mesh, he, &mut log)?;
        }

        let encroached = self.encroached_by_node(n);
        if encroached.is_empty() {
            log.commit();
            self.stats.edge_splits += 1;
            self.stats.steiner_points += 1;
            self.treat_new_node(n, true);
            return Ok(());
        }

        let restored = log.undo(self.mesh)?;
        self.mesh.remove_node(n)?;
        self.mesh.add_edge(n1, n2)?;
        let f1 = self.restore_face([n1, n2, n3])?;
        let f2 = self.restore_face([n2, n1, n4])?;
        self.after_rejection(restored, &[f1, f2], encroached, context)
    }

    /// Rebuild the face `a, b, c` from existing free half-edges.
    fn restore_face(&mut self, [a, b, c]: [NodeId; 3]) -> Result<FaceId> {
        let find = |from: NodeId, to: NodeId| {
            self.mesh.find_halfedge(from, to).ok_or_else(|| {
                MeshError::InvalidState(format!(
                    "edge {:?}-{:?} missing while rolling back an insertion",
                    from, to
                ))
            })
        };
        let (ab, bc, ca) = (find(a, b)?, find(b, c)?, find(c, a)?);
        self.mesh.add_face(ab, bc, ca)
    }

    /// Requeue what the rollback rebuilt, then split the encroached boundary
    /// edges that may be split on behalf of the bad face.
    fn after_rejection(
        &mut self,
        restored: Vec<EdgeId>,
        faces: &[FaceId],
        encroached: Vec<HalfEdgeId>,
        context: &Attempt,
    ) -> Result<()> {
        self.stats.rejected_insertions += 1;
        for e in restored {
            self.enqueue_edge_faces(e);
        }
        for &f in faces {
            self.enqueue(f);
        }

        let mut pushed = false;
        for he in encroached {
            if context.area > self.options.max_area || self.split_permitted(he, context.shortest) {
                self.encroached.insert(he);
                pushed = true;
            }
        }

        if pushed {
            self.split_encroached(true)
        } else {
            let [a, b, c] = context.nodes;
            if let Some(f) = self.mesh.find_face(a, b, c) {
                self.skip(f, "only encroaches boundary edges that may not be split");
            }
            Ok(())
        }
    }

    // ==================== Boundary edges ====================

    /// Interior-side half-edges of boundary edges opposite `n` whose
    /// diametral circle contains `n`.
    fn encroached_by_node(&self, n: NodeId) -> Vec<HalfEdgeId> {
        let p = self.mesh.position(n);
        self.mesh
            .outgoing_halfedges(n)
            .filter(|&out| self.mesh.face_of(out).is_some())
            .map(|out| self.mesh.next(out))
            .filter(|&opp| {
                self.mesh.is_boundary_edge(opp.edge()) && self.mesh.edge_is_encroached_by(opp.edge(), &p)
            })
            .collect()
    }

    /// Queue the boundary edges a new node encroaches and, if requested,
    /// the faces around it.
    fn treat_new_node(&mut self, n: NodeId, check_quality: bool) {
        let p = self.mesh.position(n);
        let around: Vec<(HalfEdgeId, FaceId)> = self
            .mesh
            .outgoing_halfedges(n)
            .filter_map(|out| self.mesh.face_of(out).map(|f| (out, f)))
            .collect();

        for (out, f) in around {
            let opp = self.mesh.next(out);
            if self.mesh.is_boundary_edge(opp.edge()) && self.mesh.edge_is_encroached_by(opp.edge(), &p) {
                self.encroached.insert(opp);
            } else if check_quality {
                self.enqueue(f);
            }
        }
    }

    fn split_encroached(&mut self, check_quality: bool) -> Result<()> {
        while let Some(he) = self.encroached.pop_first() {
            let still_boundary = self.mesh.contains_halfedge(he)
                && !self.mesh.is_boundary_halfedge(he)
                && self.mesh.is_boundary_edge(he.edge());
            if still_boundary {
                self.split_boundary(he, check_quality)?;
            }
        }
        Ok(())
    }

    /// Split the boundary edge of the interior half-edge `he`.
    fn split_boundary(&mut self, he: HalfEdgeId, check_quality: bool) -> Result<()> {
        let hen = self.mesh.next(he);
        let hep = self.mesh.prev(he);
        let origin = self.mesh.origin(he);
        let dest = self.mesh.dest(he);

        let t = self.split_ratio(he);
        let p = geometry::interpolate(&self.mesh.position(origin), &self.mesh.position(dest), t);

        self.check_budget()?;
        let n = self.mesh.split_edge(he.edge(), p)?;
        self.stats.boundary_splits += 1;
        self.stats.steiner_points += 1;
        trace!("split boundary edge at ({}, {}), ratio {}", p.x, p.y, t);

        recursive_swap_delaunay(self.mesh, hen)?;
        recursive_swap_delaunay(self.mesh, hep)?;
        self.treat_new_node(n, check_quality);

        for (a, b) in [(origin, n), (n, dest)] {
            if let Some(sub) = self.mesh.find_halfedge(a, b) {
                if self.mesh.halfedge_is_encroached(sub) {
                    self.encroached.insert(sub);
                }
            }
        }
        Ok(())
    }

    /// Where along `he` to split, as a fraction from its origin.
    fn split_ratio(&self, he: HalfEdgeId) -> f64 {
        if !self.options.concentric_shells {
            return 0.5;
        }
        let next_on_boundary = self.mesh.is_boundary_edge(self.mesh.next(he).edge());
        let prev_on_boundary = self.mesh.is_boundary_edge(self.mesh.prev(he).edge());
        let acute_dest = next_on_boundary && !prev_on_boundary;
        let acute_origin = !next_on_boundary && prev_on_boundary;
        if !(acute_dest || acute_origin) {
            return 0.5;
        }

        let length = self.mesh.halfedge_length(he);
        if !(length > 0.0 && length.is_finite()) {
            return 0.5;
        }
        let mut shell = 1.0;
        while length > 3.0 * shell {
            shell *= 2.0;
        }
        while length < 1.5 * shell {
            shell *= 0.5;
        }

        let t = shell / length;
        if acute_dest {
            1.0 - t
        } else {
            t
        }
    }

    /// Whether a boundary edge may be split to make room for a skinny
    /// face's insertion point.
    ///
    /// Refused when the edge and its boundary neighbour have equal length
    /// (they were produced by shell splits around the same corner) and the
    /// split radius of that corner does not exceed the face's shortest edge.
    fn split_permitted(&self, he: HalfEdgeId, shortest: f64) -> bool {
        let prev = self.mesh.prev(he);
        let next = self.mesh.next(he);
        let prev_on_boundary = self.mesh.is_boundary_edge(prev.edge());
        let next_on_boundary = self.mesh.is_boundary_edge(next.edge());
        if prev_on_boundary == next_on_boundary {
            return true;
        }

        let (other, p1, p3) = if prev_on_boundary {
            (prev, self.mesh.origin(prev), self.mesh.dest(he))
        } else {
            (next, self.mesh.origin(he), self.mesh.dest(next))
        };

        let l = self.mesh.halfedge_length(he);
        let other_l = self.mesh.halfedge_length(other);
        if (l - other_l).abs() > 0.001 {
            return true;
        }

        let ll = geometry::distance(&self.mesh.position(p1), &self.mesh.position(p3));
        let cos_phi = ((l * l + other_l * other_l - ll * ll) / (2.0 * l * other_l)).clamp(-1.0, 1.0);
        let r_min = l * (0.5 * cos_phi.acos()).sin();
        r_min > shortest
    }

    fn check_budget(&mut self) -> Result<()> {
        if self.attempts >= self.options.max_insertions {
            return Err(MeshError::ConvergenceFailed {
                iterations: self.attempts,
            });
        }
        self.attempts += 1;
        Ok(())
    }
}

/// The bad face an insertion attempt works for.
struct Attempt {
    nodes: [NodeId; 3],
    shortest: f64,
    area: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::{is_constrained_delaunay, triangulate};
    use crate::polygon::Polygon;
    use approx::assert_relative_eq;

    fn assert_quality(mesh: &Mesh, options: &RefineOptions, stats: &RefineStats) {
        let bad = mesh
            .face_ids()
            .filter(|&f| {
                mesh.face_area(f) > options.max_area
                    || (mesh.face_min_angle(f) < options.min_angle
                        && !mesh.is_restricted(f, options.min_angle))
            })
            .count();
        assert!(
            bad <= stats.skipped_faces,
            "{} bad faces remain, {} were skipped",
            bad,
            stats.skipped_faces
        );
    }

    #[test]
    fn test_refine_unit_square() {
        let mut mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
        let options = RefineOptions::default().with_max_area(0.01);
        let stats = refine(&mut mesh, &options).unwrap();

        assert!(mesh.is_valid());
        assert!(is_constrained_delaunay(&mesh));
        assert_quality(&mesh, &options, &stats);
        assert_eq!(mesh.num_nodes(), 4 + stats.steiner_points);
        assert_eq!(
            stats.steiner_points,
            stats.boundary_splits + stats.face_splits + stats.edge_splits
        );
        assert_relative_eq!(mesh.total_area(), 1.0, epsilon = 1e-9);
        for f in mesh.face_ids() {
            assert!(mesh.face_area(f) <= 0.01);
        }
        assert_eq!(mesh.euler_characteristic(), 1);
    }

    #[test]
    fn test_refine_angle_only() {
        let poly = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
        .unwrap();
        let mut mesh = triangulate(&poly).unwrap();
        let options = RefineOptions::default().with_min_angle_degrees(25.0);
        let stats = refine(&mut mesh, &options).unwrap();

        assert!(mesh.is_valid());
        assert!(stats.steiner_points > 0);
        assert_quality(&mesh, &options, &stats);
        assert_relative_eq!(mesh.total_area(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_refine_letter_a() {
        let poly = Polygon::letter_a();
        let mut mesh = triangulate(&poly).unwrap();
        let options = RefineOptions::default()
            .with_max_area(0.002)
            .with_min_angle_degrees(20.0);
        let stats = refine(&mut mesh, &options).unwrap();

        assert!(mesh.is_valid());
        assert!(is_constrained_delaunay(&mesh));
        assert_quality(&mesh, &options, &stats);
        assert_relative_eq!(mesh.total_area(), poly.signed_area(), epsilon = 1e-9);
    }

    #[test]
    fn test_refine_offcenter() {
        let mut circumcenter_mesh = triangulate(&Polygon::regular(7, 1.0)).unwrap();
        let mut offcenter_mesh = circumcenter_mesh.clone();
        let options = RefineOptions::default().with_min_angle_degrees(25.0);

        let stats = refine(&mut circumcenter_mesh, &options).unwrap();
        assert_quality(&circumcenter_mesh, &options, &stats);

        let options = options.with_insertion(InsertionPoint::OffCenter);
        let stats = refine(&mut offcenter_mesh, &options).unwrap();
        assert!(offcenter_mesh.is_valid());
        assert_quality(&offcenter_mesh, &options, &stats);
    }

    #[test]
    fn test_invalid_options() {
        let mut mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
        for options in [
            RefineOptions::default().with_max_area(0.0),
            RefineOptions::default().with_max_area(f64::NAN),
            RefineOptions::default().with_min_angle(0.0),
            RefineOptions::default().with_min_angle_degrees(60.0),
        ] {
            assert!(matches!(
                refine(&mut mesh, &options),
                Err(MeshError::InvalidParameter { .. })
            ));
        }
        // Nothing was touched.
        assert_eq!(mesh.num_nodes(), 4);
    }

    #[test]
    fn test_min_angle_limit() {
        for options in [
            RefineOptions::default().with_min_angle_degrees(60.0),
            RefineOptions::default().with_min_angle(std::f64::consts::FRAC_PI_3),
            RefineOptions::default().with_min_angle_degrees(75.0),
        ] {
            assert!(matches!(
                options.validate(),
                Err(MeshError::InvalidParameter { .. })
            ));
        }
        assert!(RefineOptions::default()
            .with_min_angle_degrees(59.0)
            .validate()
            .is_ok());
        assert!(RefineOptions::default().validate().is_ok());
    }

    #[test]
    fn test_insertion_budget() {
        let mut mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
        let options = RefineOptions::default()
            .with_max_area(1e-4)
            .with_max_insertions(10);
        let result = refine(&mut mesh, &options);
        assert!(matches!(
            result,
            Err(MeshError::ConvergenceFailed { iterations: 10 })
        ));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_good_mesh_is_untouched() {
        let poly = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 0.8),
        ])
        .unwrap();
        let mut mesh = triangulate(&poly).unwrap();
        let stats = refine(&mut mesh, &RefineOptions::default()).unwrap();
        assert_eq!(stats, RefineStats::default());
        assert_eq!(mesh.num_faces(), 1);
    }

    #[test]
    fn test_split_ratio_shells() {
        // A corner face: two boundary edges meet at the origin of the long edge.
        let poly = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(5.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
        .unwrap();
        let mut mesh = triangulate(&poly).unwrap();
        make_constrained_delaunay(&mut mesh).unwrap();
        let options = RefineOptions::default();
        let progress = Progress::none();
        let refiner = Refiner::new(&mut mesh, &options, &progress);

        for he in refiner.mesh.boundary_halfedges().map(|b| b.pair()).collect::<Vec<_>>() {
            let t = refiner.split_ratio(he);
            assert!((1.0 / 3.0..=2.0 / 3.0).contains(&t), "ratio {}", t);
        }
    }

    #[test]
    fn test_bad_face_order() {
        let mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
        let faces: Vec<FaceId> = mesh.face_ids().collect();
        let large = BadFace {
            badness: Badness::Large,
            shortest_edge: 5.0,
            face: faces[0],
        };
        let skinny = BadFace {
            badness: Badness::Skinny,
            shortest_edge: 0.1,
            face: faces[1],
        };
        let short = BadFace {
            badness: Badness::Skinny,
            shortest_edge: 0.01,
            face: faces[0],
        };
        let mut heap = BinaryHeap::from(vec![skinny, short, large]);
        assert_eq!(heap.pop().map(|b| b.badness), Some(Badness::Large));
        assert_eq!(heap.pop().map(|b| b.shortest_edge), Some(0.01));
        assert_eq!(heap.pop().map(|b| b.shortest_edge), Some(0.1));
    }
}
