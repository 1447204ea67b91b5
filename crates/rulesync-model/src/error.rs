//! Error types for rulesync-model

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid namespace in {path}: {message}")]
    InvalidNamespace { path: PathBuf, message: String },

    #[error("Rule group in namespace {namespace} ({path}) has an empty name")]
    EmptyGroupName { path: PathBuf, namespace: String },

    #[error(
        "Rule group {namespace}/{group} is declared more than once ({first} and {second})"
    )]
    DuplicateGroup {
        namespace: String,
        group: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
