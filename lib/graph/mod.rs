//! Typed graph storage for ZX(H)-diagrams.
//!
//! A [`Diagram`] is a simple, undirected graph whose vertices carry a
//! [`VertexKind`] and a (possibly symbolic) phase, and whose edges carry an
//! [`EdgeKind`]. Vertices are stored in a flat arena indexed by [`VertexId`];
//! ids are never renumbered or reused, so ids recorded before a mutation keep
//! referring to the same vertex (or to nothing) afterwards. See
//! [`diagram!`][crate::diagram] for abbreviated construction.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),

    #[error("error adding edge: vertex {0} cannot be connected to itself")]
    SelfLoop(VertexId),

    #[error("error adding edge: vertices {0} and {1} are already connected")]
    DuplicateEdge(VertexId, VertexId),

    #[error("error placing vertex: id {0} is already taken")]
    OccupiedId(VertexId),

    #[error("error inserting subgraph: temporary id of vertex #{0} is used twice")]
    DuplicateTempId(usize),

    #[error("error inserting subgraph: edge #{0} refers to an unknown temporary id")]
    UnknownTempId(usize),
}
pub type GraphResult<T> = Result<T, GraphError>;

pub(crate) mod vertex;
pub use vertex::*;

pub(crate) mod diagram;
pub use diagram::*;

/// Identifies a vertex in a diagram.
pub type VertexId = usize;
