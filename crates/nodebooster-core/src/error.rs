//! Error types for curve synchronization.

use thiserror::Error;

use crate::graph::{NodeId, SocketId};

/// Errors raised while synchronizing interpolation curves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A backward walk reached more than one upstream socket. Node types
    /// feeding interpolation sockets must converge on a single output, so
    /// this means the surrounding graph is structurally broken.
    #[error("backward walk from {socket} collided with {count} sockets, expected at most one")]
    MultipleCollisions { socket: SocketId, count: usize },

    /// The socket does not exist in the node tree.
    #[error("unknown socket: {0}")]
    UnknownSocket(SocketId),

    /// The node does not exist in the node tree.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The node has no socket with this name on the requested side.
    #[error("{node} has no socket named '{name}'")]
    MissingSocket { node: NodeId, name: String },

    /// A channel points at a curve its mapping does not have.
    #[error("channel '{channel}' targets missing curve {index}")]
    MissingCurve { channel: &'static str, index: usize },

    /// Links must go from an output socket to an input socket.
    #[error("cannot link {from} to {to}")]
    InvalidLink { from: SocketId, to: SocketId },
}
