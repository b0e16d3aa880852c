//! Error types for stac-merkle-core.
//!
//! Errors raised by the pure components (canonicalizer, hasher, reducer, proof
//! verifier) are returned immediately. The tree builder and verifiers catch them
//! per node and turn them into skip records or discrepancies.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used across the crate.
pub type MerkleResult<T> = Result<T, MerkleError>;

#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("unsupported hash function: {0}")]
    UnsupportedHashFunction(String),

    #[error("unsupported ordering: {0}")]
    UnsupportedOrdering(String),

    #[error("hash method not specified for {0}")]
    MissingHashMethod(String),

    #[error("malformed document {path}: {message}")]
    MalformedDocument { path: String, message: String },

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("malformed digest: {0}")]
    MalformedDigest(String),

    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

impl MerkleError {
    pub fn malformed_document(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn malformed_proof(message: impl Into<String>) -> Self {
        Self::MalformedProof(message.into())
    }

    pub fn malformed_digest(digest: impl Into<String>) -> Self {
        Self::MalformedDigest(digest.into())
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        Self::LimitExceeded(message.into())
    }
}

impl From<serde_json::Error> for MerkleError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
