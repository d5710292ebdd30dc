//! Geometric kernel.
//!
//! Points are [`nalgebra::Point2<f64>`] values. This module provides:
//!
//! - [`predicates`]: orientation and incircle determinants, in a fast
//!   floating-point form and an adaptive form whose sign is exact.
//! - [`Kernel`]: the interface the mesh algorithms use for every topology
//!   decision, implemented by [`FastKernel`] and [`RobustKernel`].
//! - [`triangle`]: derived constructions (circumcenter, angles, encroachment,
//!   off-centers, shape quality).

pub mod kernel;
pub mod predicates;
pub mod triangle;

pub use kernel::{FastKernel, Kernel, Orientation, RobustKernel};
pub use triangle::{
    bounding_box, circumcenter, circumradius, distance, fem_quality, ideal_point, interpolate,
    is_encroached, midpoint, min_angle, offcenter, offcenter_beta, signed_area, triangle_angles,
    triangle_area,
};
