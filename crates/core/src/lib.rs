#![warn(missing_docs)]
//! Core primitives shared across the workspace: the scene graph, typed
//! component storage, interaction capabilities and transaction strategies.

pub mod capability;
pub mod components;
pub mod scene;
pub mod transaction;

use thiserror::Error;

// Re-export commonly used types
pub use capability::{
    Capabilities, Grabbable, InteractionContext, InteractionError, Touchable, Triggerable,
};
pub use components::{Component, Components};
pub use scene::{Node, NodeId, Scene, Transform3D};
pub use transaction::{GroupId, RuntimeLog, TransactionLog, UndoGroup, UndoLog, UndoRecord};

/// Axis used when reporting geometric failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Local right axis (width).
    X,
    /// Local up axis (height).
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("width"),
            Axis::Y => f.write_str("height"),
        }
    }
}

/// Errors emitted by scene-graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The id refers to a node that was destroyed (or never existed).
    #[error("node {0} is not alive")]
    UnknownNode(NodeId),
    /// Attaching would make a node its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    CyclicAttach {
        /// Node being attached.
        child: NodeId,
        /// Requested parent.
        parent: NodeId,
    },
    /// A resize ratio was requested against a zero-extent source.
    #[error("node {node} has zero world {axis}; resize scale is undefined")]
    DegenerateGeometry {
        /// Node being resized.
        node: NodeId,
        /// Axis whose extent is zero.
        axis: Axis,
    },
}
