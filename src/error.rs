//! Error types for skelfit.
//!
//! [`RigError`] covers every failure after the run configuration is built:
//! mesh loading, embedding and export. [`ConfigError`] covers the
//! configuration builder itself.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`RigError`].
pub type Result<T> = std::result::Result<T, RigError>;

/// Errors that can occur while loading, rigging or exporting.
#[derive(Error, Debug)]
pub enum RigError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    Load {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// The loaded mesh has no vertices.
    #[error("mesh {path} has no vertices")]
    EmptyMesh {
        /// The file path.
        path: PathBuf,
    },

    /// Unsupported mesh file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A skeleton file could not be read or is malformed.
    #[error("failed to load skeleton from {path}: {message}")]
    SkeletonFile {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// The fitting strategy produced no embedding.
    #[error("embedding failed: no joint positions were produced")]
    EmbeddingFailed,

    /// The embedding does not have one position per skeleton joint.
    #[error("embedding has {actual} positions but the skeleton has {expected} joints")]
    EmbeddingMismatch {
        /// Joint count of the skeleton.
        expected: usize,
        /// Length of the embedding.
        actual: usize,
    },

    /// The attachment does not line up with the mesh or the embedding.
    #[error("attachment mismatch at vertex {vertex}: expected {expected} entries, found {actual}")]
    AttachmentMismatch {
        /// The vertex index (or the vertex count for a row-count mismatch).
        vertex: usize,
        /// Expected number of entries.
        expected: usize,
        /// Actual number of entries.
        actual: usize,
    },

    /// Error writing an output file.
    #[error("failed to write {path}: {message}")]
    Export {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

impl RigError {
    /// Create a load error for `path`.
    pub fn load<P: Into<PathBuf>, M: std::fmt::Display>(path: P, message: M) -> Self {
        RigError::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create an export error for `path`.
    pub fn export<P: Into<PathBuf>, M: std::fmt::Display>(path: P, message: M) -> Self {
        RigError::Export {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error belongs to the mesh-loading stage.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            RigError::Load { .. }
                | RigError::EmptyMesh { .. }
                | RigError::UnsupportedFormat { .. }
                | RigError::InvalidVertexIndex { .. }
        )
    }

    /// Whether this error belongs to the embedding stage.
    pub fn is_embedding_failure(&self) -> bool {
        matches!(
            self,
            RigError::EmbeddingFailed
                | RigError::EmbeddingMismatch { .. }
                | RigError::AttachmentMismatch { .. }
        )
    }
}

/// Errors produced while building a run configuration from command tokens.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Malformed or unrecognized command-line input.
    #[error("{0}")]
    Usage(String),

    /// A custom skeleton file named by `-skel` could not be loaded.
    #[error("could not load skeleton `{name}`: {source}")]
    Skeleton {
        /// The literal `-skel` argument.
        name: String,
        /// The underlying load error.
        #[source]
        source: RigError,
    },
}

impl ConfigError {
    /// Create a usage error with the given diagnostic.
    pub fn usage<M: Into<String>>(message: M) -> Self {
        ConfigError::Usage(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RigError::load("model.obj", "truncated face");
        assert_eq!(
            err.to_string(),
            "failed to load mesh from model.obj: truncated face"
        );

        let err = RigError::EmbeddingMismatch {
            expected: 18,
            actual: 17,
        };
        assert!(err.to_string().contains("18 joints"));

        let err = ConfigError::usage("No scale provided; exiting.");
        assert_eq!(err.to_string(), "No scale provided; exiting.");
    }

    #[test]
    fn test_error_stage_classification() {
        assert!(RigError::EmptyMesh { path: "a.obj".into() }.is_load_failure());
        assert!(!RigError::EmptyMesh { path: "a.obj".into() }.is_embedding_failure());
        assert!(RigError::EmbeddingFailed.is_embedding_failure());
        assert!(!RigError::export("skeleton.out", "denied").is_load_failure());
    }
}
