//! Progress reporting for long-running algorithms.
//!
//! Refinement and smoothing accept a [`Progress`] through their
//! `*_with_progress` variants and call it as they work.
//!
//! # Example
//!
//! ```
//! use tessera::algo::{refine_with_progress, triangulate, Progress, RefineOptions};
//! use tessera::polygon::Polygon;
//!
//! let mut mesh = triangulate(&Polygon::rectangle(1.0, 1.0)).unwrap();
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let options = RefineOptions::default().with_max_area(0.05);
//! refine_with_progress(&mut mesh, &options, &progress).unwrap();
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Work done so far
/// - `total`: Expected amount of work, or the running estimate of it
/// - `message`: Description of the current stage
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
