use thiserror::Error;

use crate::genealogy::NodeId;

/// Reasons a [`Graph`](crate::genealogy::Graph) snapshot is rejected before a
/// simulation is started for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphIntegrityError {
    /// An edge names a node id that is not part of the snapshot.
    #[error("edge {from} -> {to} references missing node {missing}")]
    DanglingEdge {
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    /// Two nodes share the same id.
    #[error("node id {id} appears more than once")]
    DuplicateNode { id: NodeId },
}
