use thiserror::Error;

use crate::GraphId;

/// Misuse of the graph store API.
///
/// These indicate a defect in the caller (the compiler never deletes a node
/// it still links to); the lowering pass turns them into internal
/// diagnostics instead of aborting.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    #[error("graph node {0:?} does not exist")]
    Missing(GraphId),
    #[error("graph node {0:?} is still referenced and cannot be deleted")]
    StillReferenced(GraphId),
    #[error("graph node {0:?} is already finalized")]
    AlreadyFinalized(GraphId),
    #[error("graph node {0:?} is not a cluster")]
    NotACluster(GraphId),
}
