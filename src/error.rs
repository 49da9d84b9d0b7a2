use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The scan root or one of its subdirectories could not be read
    #[error("Failed to traverse {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A matching template file could not be read
    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created or written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize messages: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
