//! Error types for rulesync-client

use std::path::PathBuf;

/// Result type for rulesync-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or building the client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("{setting} is not set; pass {flag} or set {env}")]
    MissingSetting {
        setting: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("Invalid address {address:?}: {message}")]
    InvalidAddress { address: String, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
