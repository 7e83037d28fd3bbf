//! Error types for the todo store facade

use crate::types::Operation;
use tasksync_runtime::StoreError;
use thiserror::Error;

/// Errors returned by [`crate::TodoStore`] operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// The remote service rejected or failed the operation
    #[error("{operation} failed: {message}")]
    Api {
        /// Which operation
        operation: Operation,
        /// Error reported by the service client
        message: String,
    },

    /// The store could not process the action
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The todo has never been persisted, so it has nothing to update
    #[error("Todo has no id; it has not been created yet")]
    MissingId,
}

/// Result type for todo store operations
pub type Result<T> = std::result::Result<T, TodoError>;
