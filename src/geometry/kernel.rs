//! Geometric kernels.
//!
//! A [`Kernel`] bundles the two predicates the mesh algorithms make topology
//! decisions with. The choice is made once, as a type parameter of
//! [`Mesh`](crate::mesh::Mesh):
//!
//! - [`FastKernel`] evaluates determinants in plain floating point.
//! - [`RobustKernel`] uses adaptive predicates whose signs are exact. This is
//!   the default.
//!
//! # Example
//!
//! ```
//! use tessera::geometry::{FastKernel, Kernel, Orientation, RobustKernel};
//! use nalgebra::Point2;
//!
//! let a = Point2::new(0.0, 0.0);
//! let b = Point2::new(1.0, 0.0);
//! let c = Point2::new(0.0, 1.0);
//!
//! assert_eq!(FastKernel.orientation(&a, &b, &c), Orientation::Positive);
//! assert_eq!(RobustKernel.orientation(&a, &b, &c), Orientation::Positive);
//! ```

use std::fmt::Debug;

use nalgebra::Point2;

use super::predicates;

/// Position of a point relative to a directed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Left of the line (counter-clockwise turn).
    Positive,
    /// Right of the line (clockwise turn).
    Negative,
    /// On the line.
    Collinear,
}

impl Orientation {
    /// Classify a determinant by its sign.
    #[inline]
    pub fn from_det(det: f64) -> Self {
        if det > 0.0 {
            Orientation::Positive
        } else if det < 0.0 {
            Orientation::Negative
        } else {
            Orientation::Collinear
        }
    }
}

/// Predicate provider used by every topology decision in the crate.
pub trait Kernel: Clone + Copy + Default + Debug + Send + Sync + 'static {
    /// Orientation determinant of `a, b, c`; positive for a counter-clockwise turn.
    fn orient2d(&self, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64;

    /// Incircle determinant; positive when `d` lies strictly inside the circle
    /// through the counter-clockwise triangle `a, b, c`.
    fn in_circle(&self, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64;

    /// Classify `c` against the directed line `a -> b`.
    #[inline]
    fn orientation(&self, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Orientation {
        Orientation::from_det(self.orient2d(a, b, c))
    }

    /// Whether `p` lies strictly inside the counter-clockwise triangle `a, b, c`.
    fn point_in_triangle(
        &self,
        p: &Point2<f64>,
        a: &Point2<f64>,
        b: &Point2<f64>,
        c: &Point2<f64>,
    ) -> bool {
        self.orient2d(a, b, p) > 0.0 && self.orient2d(b, c, p) > 0.0 && self.orient2d(c, a, p) > 0.0
    }

    /// Whether `p` lies inside or on the counter-clockwise triangle `a, b, c`.
    fn point_in_closed_triangle(
        &self,
        p: &Point2<f64>,
        a: &Point2<f64>,
        b: &Point2<f64>,
        c: &Point2<f64>,
    ) -> bool {
        self.orient2d(a, b, p) >= 0.0 && self.orient2d(b, c, p) >= 0.0 && self.orient2d(c, a, p) >= 0.0
    }
}

/// Kernel with plain floating-point predicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastKernel;

impl Kernel for FastKernel {
    #[inline]
    fn orient2d(&self, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
        predicates::orient2d_fast(a, b, c)
    }

    #[inline]
    fn in_circle(&self, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
        predicates::incircle_fast(a, b, c, d)
    }
}

/// Kernel with adaptive predicates whose signs are exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RobustKernel;

impl Kernel for RobustKernel {
    #[inline]
    fn orient2d(&self, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
        predicates::orient2d(a, b, c)
    }

    #[inline]
    fn in_circle(&self, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
        predicates::incircle(a, b, c, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> [Point2<f64>; 3] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_orientation_classification() {
        let [a, b, c] = unit_triangle();
        for kernel_result in [
            FastKernel.orientation(&a, &b, &c),
            RobustKernel.orientation(&a, &b, &c),
        ] {
            assert_eq!(kernel_result, Orientation::Positive);
        }
        assert_eq!(RobustKernel.orientation(&a, &c, &b), Orientation::Negative);
        assert_eq!(
            RobustKernel.orientation(&a, &b, &Point2::new(2.0, 0.0)),
            Orientation::Collinear
        );
    }

    #[test]
    fn test_point_in_triangle() {
        let [a, b, c] = unit_triangle();
        let inside = Point2::new(0.2, 0.2);
        let on_edge = Point2::new(0.5, 0.0);
        let outside = Point2::new(1.0, 1.0);

        assert!(RobustKernel.point_in_triangle(&inside, &a, &b, &c));
        assert!(!RobustKernel.point_in_triangle(&on_edge, &a, &b, &c));
        assert!(RobustKernel.point_in_closed_triangle(&on_edge, &a, &b, &c));
        assert!(!RobustKernel.point_in_closed_triangle(&outside, &a, &b, &c));
    }

    #[test]
    fn test_kernel_consistency_fast_vs_robust() {
        let [a, b, c] = unit_triangle();
        let d = Point2::new(0.3, 0.3);
        assert_eq!(
            FastKernel.in_circle(&a, &b, &c, &d) > 0.0,
            RobustKernel.in_circle(&a, &b, &c, &d) > 0.0
        );
    }
}
