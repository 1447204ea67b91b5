//! Error types for rulesync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from rulesync-model
    #[error(transparent)]
    Model(#[from] rulesync_model::Error),

    /// Error from rulesync-core
    #[error(transparent)]
    Core(#[from] rulesync_core::Error),

    /// Error from rulesync-client
    #[error(transparent)]
    Client(#[from] rulesync_client::Error),

    /// Error from the rule store
    #[error(transparent)]
    Store(#[from] rulesync_core::StoreError),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Output encoding error
    #[error("unable to encode output: {0}")]
    Encode(String),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Encode(e.to_string())
    }
}
