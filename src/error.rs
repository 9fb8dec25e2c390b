//! Error types for minigrad

use thiserror::Error;

use crate::VarId;

/// Result type alias using minigrad's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while walking a computation graph
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A node was reached again while it was still on the active traversal
    /// path, so the graph contains a cycle.
    #[error("Computation graph is not a DAG: variable {id} depends on itself")]
    GraphNotADag {
        /// The variable that closed the cycle
        id: VarId,
    },
}
