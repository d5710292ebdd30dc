//! Node smoothing.
//!
//! Smoothing moves interior nodes to improve element shape while keeping
//! the connectivity. Boundary nodes never move.
//!
//! Every pass is a Jacobi step: new positions are computed for all interior
//! nodes from the current positions, then written back together. The
//! compute step runs on the rayon thread pool when
//! [`SmoothOptions::parallel`] is set; the result does not depend on it.
//!
//! # Methods
//!
//! Each method computes a target for a node and moves the node a fraction
//! `w` of the way there. `h` is the edge length of an equilateral triangle
//! with area [`SmoothOptions::target_area`].
//!
//! - [`SmoothMethod::Laplacian`]: the centroid of the neighbours (`w = 0.3`).
//! - [`SmoothMethod::BossenHeckbert`]: each neighbour at normalized distance
//!   `d` pushes with force `(1 - d⁴)·exp(-d⁴)`, repulsive below `h` and
//!   attractive above (`w = 0.3`).
//! - [`SmoothMethod::ElementQuality`]: the average of the ideal apexes over
//!   the opposite edges of the surrounding faces, weighted towards poor
//!   faces (`w = 0.6`).
//! - [`SmoothMethod::EdgeLength`]: the average of the points at distance `h`
//!   from each neighbour, in the direction of the node (`w = 0.8`).
//!
//! # Example
//!
//! ```
//! use tessera::algo::{refine, smooth, triangulate, RefineOptions, SmoothMethod, SmoothOptions};
//! use tessera::polygon::Polygon;
//!
//! let mut mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
//! refine(&mut mesh, &RefineOptions::default().with_max_area(0.01)).unwrap();
//!
//! let options = SmoothOptions::default()
//!     .with_method(SmoothMethod::ElementQuality)
//!     .with_iterations(3);
//! smooth(&mut mesh, &options).unwrap();
//! ```

use log::debug;
use nalgebra::{Point2, Vector2};
use rayon::prelude::*;

use super::Progress;
use crate::error::{MeshError, Result};
use crate::geometry::{self, Kernel};
use crate::mesh::{Mesh, NodeId};

/// Smoothing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothMethod {
    /// Plain Laplacian averaging.
    #[default]
    Laplacian,
    /// Bossen–Heckbert particle forces.
    BossenHeckbert,
    /// Ideal points weighted by inverse element quality.
    ElementQuality,
    /// Ideal points at the target edge length.
    EdgeLength,
}

impl SmoothMethod {
    /// Fraction of the way from the current position to the target.
    fn weight(self) -> f64 {
        match self {
            SmoothMethod::Laplacian | SmoothMethod::BossenHeckbert => 0.3,
            SmoothMethod::ElementQuality => 0.6,
            SmoothMethod::EdgeLength => 0.8,
        }
    }
}

/// Options for [`smooth`].
#[derive(Debug, Clone)]
pub struct SmoothOptions {
    /// Smoothing scheme.
    pub method: SmoothMethod,

    /// Number of passes.
    pub iterations: usize,

    /// Target face area; sets the characteristic edge length used by the
    /// distance-based methods.
    pub target_area: f64,

    /// Whether to compute new positions in parallel (default: true).
    pub parallel: bool,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            method: SmoothMethod::Laplacian,
            iterations: 1,
            target_area: 1.0,
            parallel: true,
        }
    }
}

impl SmoothOptions {
    /// Set the smoothing scheme.
    pub fn with_method(mut self, method: SmoothMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the number of passes.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the target face area.
    pub fn with_target_area(mut self, target_area: f64) -> Self {
        self.target_area = target_area;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that the options are in range.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(MeshError::invalid_param(
                "iterations",
                self.iterations,
                "must be at least 1",
            ));
        }
        if !(self.target_area > 0.0 && self.target_area.is_finite()) {
            return Err(MeshError::invalid_param(
                "target_area",
                self.target_area,
                "must be positive and finite",
            ));
        }
        Ok(())
    }

    /// Edge length of an equilateral triangle with the target area.
    pub fn characteristic_length(&self) -> f64 {
        (4.0 * self.target_area / 3f64.sqrt()).sqrt()
    }
}

/// Smooth the interior nodes of a mesh.
///
/// # Errors
///
/// [`MeshError::InvalidParameter`] for out-of-range options.
pub fn smooth<K: Kernel>(mesh: &mut Mesh<K>, options: &SmoothOptions) -> Result<()> {
    smooth_with_progress(mesh, options, &Progress::none())
}

/// [`smooth`] with progress reporting, once per pass.
pub fn smooth_with_progress<K: Kernel>(
    mesh: &mut Mesh<K>,
    options: &SmoothOptions,
    progress: &Progress,
) -> Result<()> {
    options.validate()?;

    let interior: Vec<NodeId> = mesh
        .node_ids()
        .filter(|&n| mesh.out_halfedge(n).is_some() && !mesh.is_boundary_node(n))
        .collect();
    let h = options.characteristic_length();

    for iteration in 0..options.iterations {
        let new_positions: Vec<Point2<f64>> = {
            let mesh = &*mesh;
            if options.parallel {
                interior
                    .par_iter()
                    .map(|&n| smoothed_position(mesh, n, options.method, h))
                    .collect()
            } else {
                interior
                    .iter()
                    .map(|&n| smoothed_position(mesh, n, options.method, h))
                    .collect()
            }
        };

        for (&n, p) in interior.iter().zip(new_positions) {
            mesh.set_position(n, p);
        }
        progress.report(iteration + 1, options.iterations, "smoothing");
    }

    debug!(
        "{:?} smoothing moved {} interior nodes over {} passes",
        options.method,
        interior.len(),
        options.iterations
    );
    Ok(())
}

/// New position of an interior node.
fn smoothed_position<K: Kernel>(mesh: &Mesh<K>, n: NodeId, method: SmoothMethod, h: f64) -> Point2<f64> {
    let p = mesh.position(n);
    let target = match method {
        SmoothMethod::Laplacian => {
            let translation = force_translation(mesh, n, h, |d| -d);
            let count = mesh.degree(n).max(1) as f64;
            p + translation / count
        }
        SmoothMethod::BossenHeckbert => {
            let translation = force_translation(mesh, n, h, bossen_heckbert);
            p + translation * 0.2
        }
        SmoothMethod::ElementQuality => element_quality_target(mesh, n).unwrap_or(p),
        SmoothMethod::EdgeLength => edge_length_target(mesh, n, h).unwrap_or(p),
    };

    let w = method.weight();
    Point2::from(p.coords * (1.0 - w) + target.coords * w)
}

fn bossen_heckbert(d: f64) -> f64 {
    let d4 = d * d * d * d;
    (1.0 - d4) * (-d4).exp()
}

/// Sum of `force(d) · (p - q) / d` over the neighbours `q`, with `d` the
/// distance normalized by `h`.
fn force_translation<K: Kernel, F>(mesh: &Mesh<K>, n: NodeId, h: f64, force: F) -> Vector2<f64>
where
    F: Fn(f64) -> f64,
{
    let p = mesh.position(n);
    mesh.neighbors(n)
        .map(|m| {
            let v = p - mesh.position(m);
            let d = v.norm() / h;
            if d > 0.0 {
                v * (force(d) / d)
            } else {
                Vector2::zeros()
            }
        })
        .sum()
}

fn element_quality_target<K: Kernel>(mesh: &Mesh<K>, n: NodeId) -> Option<Point2<f64>> {
    let mut sum = Vector2::zeros();
    let mut weights = 0.0;

    for out in mesh.outgoing_halfedges(n) {
        let Some(f) = mesh.face_of(out) else {
            continue;
        };
        let [a, b, c] = mesh.face_points(f);
        let quality = geometry::fem_quality(&a, &b, &c);
        if quality <= 0.0 {
            continue;
        }

        let opposite = mesh.next(out);
        let q1 = mesh.position(mesh.origin(opposite));
        let q2 = mesh.position(mesh.dest(opposite));
        let ideal = geometry::ideal_point(&q1, &q2, geometry::distance(&q1, &q2));

        let weight = 1.0 / quality;
        sum += ideal.coords * weight;
        weights += weight;
    }

    (weights > 0.0).then(|| Point2::from(sum / weights))
}

fn edge_length_target<K: Kernel>(mesh: &Mesh<K>, n: NodeId, h: f64) -> Option<Point2<f64>> {
    let p = mesh.position(n);
    let mut sum = Vector2::zeros();
    let mut count = 0usize;

    for m in mesh.neighbors(n) {
        let q = mesh.position(m);
        let v = p - q;
        let length = v.norm();
        if length > 0.0 {
            sum += (q + v * (h / length)).coords;
            count += 1;
        }
    }

    (count > 0).then(|| Point2::from(sum / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::{refine, triangulate, RefineOptions};
    use crate::mesh::build_from_triangles;
    use crate::polygon::Polygon;
    use approx::assert_relative_eq;

    /// Unit hexagon with its center node moved to `center`.
    fn create_hexagon(center: Point2<f64>) -> (Mesh, NodeId) {
        let mut points = vec![center];
        points.extend((0..6).map(|i| {
            let t = std::f64::consts::TAU * i as f64 / 6.0;
            Point2::new(t.cos(), t.sin())
        }));
        let triangles: Vec<[usize; 3]> = (0..6).map(|i| [0, 1 + i, 1 + (i + 1) % 6]).collect();
        let mesh: Mesh = build_from_triangles(&points, &triangles).unwrap();
        let c = mesh.node_ids().find(|&n| !mesh.is_boundary_node(n)).unwrap();
        (mesh, c)
    }

    /// Area of an equilateral triangle with unit sides.
    fn unit_area() -> f64 {
        3f64.sqrt() / 4.0
    }

    #[test]
    fn test_laplacian_step() {
        let start = Point2::new(0.2, -0.1);
        let (mut mesh, c) = create_hexagon(start);
        smooth(&mut mesh, &SmoothOptions::default()).unwrap();
        let p = mesh.position(c);
        assert_relative_eq!(p.x, 0.7 * start.x, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.7 * start.y, epsilon = 1e-12);
    }

    #[test]
    fn test_boundary_is_fixed() {
        let (mut mesh, _) = create_hexagon(Point2::new(0.3, 0.3));
        let before: Vec<_> = mesh
            .node_ids()
            .filter(|&n| mesh.is_boundary_node(n))
            .map(|n| (n, mesh.position(n)))
            .collect();
        for method in [
            SmoothMethod::Laplacian,
            SmoothMethod::BossenHeckbert,
            SmoothMethod::ElementQuality,
            SmoothMethod::EdgeLength,
        ] {
            let options = SmoothOptions::default()
                .with_method(method)
                .with_iterations(4)
                .with_target_area(unit_area());
            smooth(&mut mesh, &options).unwrap();
        }
        for (n, p) in before {
            assert_eq!(mesh.position(n), p);
        }
    }

    #[test]
    fn test_every_method_recenters() {
        let start = Point2::new(0.25, 0.1);
        for method in [
            SmoothMethod::Laplacian,
            SmoothMethod::BossenHeckbert,
            SmoothMethod::ElementQuality,
            SmoothMethod::EdgeLength,
        ] {
            let (mut mesh, c) = create_hexagon(start);
            let options = SmoothOptions::default()
                .with_method(method)
                .with_iterations(10)
                .with_target_area(unit_area());
            smooth(&mut mesh, &options).unwrap();
            let offset = mesh.position(c).coords.norm();
            assert!(
                offset < 0.5 * start.coords.norm(),
                "{:?} left the node at offset {}",
                method,
                offset
            );
            assert!(mesh.is_valid());
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut mesh = triangulate(&Polygon::regular(9, 1.0)).unwrap();
        refine(&mut mesh, &RefineOptions::default().with_max_area(0.02)).unwrap();
        let mut other = mesh.clone();

        let options = SmoothOptions::default()
            .with_method(SmoothMethod::ElementQuality)
            .with_iterations(3);
        smooth(&mut mesh, &options).unwrap();
        smooth(&mut other, &options.clone().sequential()).unwrap();

        for n in mesh.node_ids() {
            assert_eq!(mesh.position(n), other.position(n));
        }
    }

    #[test]
    fn test_progress_is_reported_per_pass() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let (mut mesh, _) = create_hexagon(Point2::new(0.1, 0.0));
        let passes = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&passes);
        let progress = Progress::new(move |_, _, _| {
            seen.fetch_add(1, Ordering::Relaxed);
        });
        let options = SmoothOptions::default().with_iterations(5);
        smooth_with_progress(&mut mesh, &options, &progress).unwrap();
        assert_eq!(passes.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_invalid_options() {
        let (mut mesh, _) = create_hexagon(Point2::new(0.0, 0.0));
        for options in [
            SmoothOptions::default().with_iterations(0),
            SmoothOptions::default().with_target_area(0.0),
            SmoothOptions::default().with_target_area(f64::NAN),
        ] {
            assert!(matches!(
                smooth(&mut mesh, &options),
                Err(MeshError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_characteristic_length() {
        let options = SmoothOptions::default().with_target_area(unit_area());
        assert_relative_eq!(options.characteristic_length(), 1.0, epsilon = 1e-12);
    }
}
