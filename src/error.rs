//! Error types for tessera.
//!
//! This module defines all error types used throughout the library. Topology
//! operators report failures through [`MeshError`] and never apply a partial
//! mutation before returning one.

use std::path::PathBuf;
use thiserror::Error;

use crate::mesh::{EdgeId, FaceId, HalfEdgeId, NodeId};

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    // ==================== Preconditions ====================
    /// A polygon needs at least three vertices.
    #[error("polygon has {count} vertices, at least 3 are required")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },

    /// The polygon has zero area or repeated consecutive vertices.
    #[error("polygon is degenerate: {details}")]
    DegeneratePolygon {
        /// Description of the degeneracy.
        details: String,
    },

    /// The polygon is listed clockwise.
    #[error("polygon vertices must be listed counter-clockwise")]
    NotCounterClockwise,

    /// Two non-adjacent polygon edges touch or cross.
    #[error("polygon edges {first} and {second} intersect")]
    SelfIntersecting {
        /// Index of the first edge (starting at vertex `first`).
        first: usize,
        /// Index of the second edge (starting at vertex `second`).
        second: usize,
    },

    /// A handle refers to an entity that no longer exists.
    #[error("stale handle: {entity}")]
    StaleHandle {
        /// Debug rendering of the handle.
        entity: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    // ==================== Topology ====================
    /// An edge would connect a node to itself.
    #[error("cannot add loop edge at node {node:?}")]
    LoopEdge {
        /// The node.
        node: NodeId,
    },

    /// The two nodes are already connected.
    #[error("nodes {n1:?} and {n2:?} are already connected by {edge:?}")]
    DuplicateEdge {
        /// First node.
        n1: NodeId,
        /// Second node.
        n2: NodeId,
        /// The existing edge.
        edge: EdgeId,
    },

    /// A node has no free (boundary) slot in its cyclic order for a new edge.
    #[error("node {node:?} has no free incident half-edge")]
    NoFreeSlot {
        /// The node.
        node: NodeId,
    },

    /// A half-edge passed to `add_face` already bounds a face.
    #[error("half-edge {halfedge:?} already bounds a face")]
    NotFree {
        /// The occupied half-edge.
        halfedge: HalfEdgeId,
    },

    /// The half-edges passed to `add_face` do not form a chain.
    #[error("half-edges {first:?} and {second:?} are not chained")]
    NotChain {
        /// The half-edge whose destination does not match.
        first: HalfEdgeId,
        /// The half-edge whose origin does not match.
        second: HalfEdgeId,
    },

    /// The operation would create non-manifold topology.
    #[error("operation would create non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// The operation is not defined for boundary edges.
    #[error("edge {edge:?} is on the boundary")]
    BoundaryEdge {
        /// The edge.
        edge: EdgeId,
    },

    /// The quadrilateral around the edge is not strictly convex.
    #[error("edge {edge:?} is not swappable")]
    NotSwappable {
        /// The edge.
        edge: EdgeId,
    },

    /// The operation is not defined for boundary nodes.
    #[error("node {node:?} is on the boundary")]
    BoundaryNode {
        /// The node.
        node: NodeId,
    },

    /// The operation would flip the orientation of a face.
    #[error("operation would invert face {face:?}")]
    InvertedFace {
        /// The face that would be inverted.
        face: FaceId,
    },

    // ==================== Algorithms ====================
    /// Ear clipping ran out of ears before the polygon was consumed.
    #[error("triangulation failed with {remaining} polygon vertices left")]
    TriangulationFailed {
        /// Number of vertices still on the unclipped ring.
        remaining: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// Algorithm failed to converge.
    #[error("algorithm failed to converge after {iterations} iterations")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: usize,
    },

    // ==================== I/O ====================
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading data from file.
    #[error("failed to load {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a stale handle error.
    pub(crate) fn stale<T: std::fmt::Debug>(entity: T) -> Self {
        MeshError::StaleHandle {
            entity: format!("{:?}", entity),
        }
    }

    /// Whether this error is a topology violation reported by a mesh operator.
    pub fn is_topology_error(&self) -> bool {
        matches!(
            self,
            MeshError::LoopEdge { .. }
                | MeshError::DuplicateEdge { .. }
                | MeshError::NoFreeSlot { .. }
                | MeshError::NotFree { .. }
                | MeshError::NotChain { .. }
                | MeshError::NonManifold { .. }
                | MeshError::BoundaryEdge { .. }
                | MeshError::NotSwappable { .. }
                | MeshError::BoundaryNode { .. }
                | MeshError::InvertedFace { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_message() {
        let err = MeshError::invalid_param("max_area", -1.0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter: max_area = -1 (must be positive)"
        );
        assert!(!err.is_topology_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MeshError = io.into();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
