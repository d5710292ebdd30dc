//! Mesh generation algorithms.
//!
//! The pipeline runs in this order:
//!
//! - **Triangulation**: ear clipping of a simple polygon ([`triangulate`])
//! - **Delaunay**: edge swapping to a constrained Delaunay triangulation
//!   ([`make_constrained_delaunay`])
//! - **Refinement**: Ruppert's algorithm with area and angle targets
//!   ([`refine`])
//! - **Post-processing**: degree relaxation ([`relax`]) and node smoothing
//!   ([`smooth`])
//!
//! Everything except the compute phase of smoothing is single-threaded.

pub mod delaunay;
pub mod progress;
pub mod refine;
pub mod relax;
pub mod smooth;
pub mod triangulate;

pub use delaunay::{
    is_constrained_delaunay, make_constrained_delaunay, recursive_swap_delaunay,
    recursive_swap_delaunay_logged, SwapLog,
};
pub use progress::Progress;
pub use refine::{refine, refine_with_progress, InsertionPoint, RefineOptions, RefineStats};
pub use relax::{ideal_degree, relax, relaxation_index, virtual_degree, RelaxOptions, RelaxStats};
pub use smooth::{smooth, smooth_with_progress, SmoothMethod, SmoothOptions};
pub use triangulate::{triangulate, triangulate_with_kernel};
