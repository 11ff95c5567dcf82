use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed architecture document: {0}")]
    MalformedArchitecture(String),

    #[error("malformed weight blob: {0}")]
    MalformedWeights(String),

    #[error(
        "shape mismatch for layer \"{layer}\" parameter {index}: expected {expected:?}, got {actual:?}"
    )]
    ShapeMismatch {
        layer: String,
        index: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LoadError>;
