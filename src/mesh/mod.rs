//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation, its topology
//! operators and point location.
//!
//! # Overview
//!
//! The primary type is [`Mesh`], a planar triangle mesh stored as a half-edge
//! (doubly-connected edge list) structure with O(1) adjacency queries. The
//! region outside the mesh is not a face: its half-edges simply carry no
//! face and are linked into boundary cycles.
//!
//! # Handle Types
//!
//! Mesh elements are identified by type-safe handles:
//! - [`NodeId`] - Identifies a node
//! - [`EdgeId`] - Identifies an undirected edge
//! - [`HalfEdgeId`] - Identifies one side of an edge
//! - [`FaceId`] - Identifies a triangular face
//!
//! Handles are generational: an operator that removes an entity invalidates
//! its handle, and later use is reported as [`MeshError::StaleHandle`].
//!
//! # Construction
//!
//! Meshes are usually produced by [`crate::algo::triangulate`], or built from
//! face-vertex lists:
//!
//! ```
//! use tessera::mesh::{Mesh, build_from_triangles};
//! use nalgebra::Point2;
//!
//! let points = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let mesh: Mesh = build_from_triangles(&points, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//! assert_eq!(mesh.num_edges(), 5);
//! assert!(mesh.is_valid());
//! ```
//!
//! [`MeshError::StaleHandle`]: crate::error::MeshError::StaleHandle

mod builder;
mod criteria;
mod halfedge;
mod keys;
mod locate;
mod ops;

pub use builder::build_from_triangles;
pub use halfedge::{Edge, Face, FaceHalfEdges, HalfEdge, Mesh, Node, OutgoingHalfEdges};
pub use keys::{EdgeId, FaceId, HalfEdgeId, NodeId};
pub use locate::Location;
