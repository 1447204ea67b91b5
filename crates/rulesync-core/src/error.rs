//! Error types for rulesync-core

use crate::store::StoreError;

/// Result type for rulesync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rulesync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Local rule files could not be parsed; nothing was sent to the store
    #[error("load operation unsuccessful, unable to parse rules files: {0}")]
    Parse(#[from] rulesync_model::Error),

    /// A reconciliation run stopped at a group
    #[error("load operation unsuccessful at {namespace}/{group}: {message}")]
    LoadFailed {
        namespace: String,
        group: String,
        message: String,
    },

    /// Error from the rule store
    #[error(transparent)]
    Store(#[from] StoreError),
}
