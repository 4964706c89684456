//! Error type shared by the editor core, persistence and export.

use crate::types::{EdgeId, LabelId, NodeId};
use thiserror::Error;

/// Everything that can go wrong while editing, loading or exporting a topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The referenced node is not part of the scene.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    /// The referenced edge is not part of the scene.
    #[error("connection {0} does not exist")]
    UnknownEdge(EdgeId),
    /// The referenced text label is not part of the scene.
    #[error("text label {0} does not exist")]
    UnknownLabel(LabelId),
    /// A connection from a node to itself was requested.
    #[error("cannot connect node {0} to itself")]
    SelfLoop(NodeId),
    /// The two nodes are already connected (in either direction).
    #[error("nodes {0} and {1} are already connected")]
    DuplicateEdge(NodeId, NodeId),
    /// The topology JSON could not be parsed or written.
    #[error("invalid topology JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Rasterizing the scene failed.
    #[error("failed to render image: {0}")]
    Render(String),
    /// Nothing has been saved under the storage key yet.
    #[error("no saved topology found")]
    StorageEmpty,
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, TopologyError>;
