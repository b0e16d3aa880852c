//! Configuration structures for stac-merkle-core.
//!
//! Configuration is explicit and passed in by the caller. The core crate does
//! not read environment variables or files.

use crate::errors::{MerkleError, MerkleResult};
use crate::method::HashMethod;

/// Global configuration container.
#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    pub hashing: HashingConfig,
    pub limits: LimitsConfig,
}

/// Hashing-related configuration.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    /// Method inherited by a root node that declares none.
    pub default_method: HashMethod,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            default_method: HashMethod::system_default(),
        }
    }
}

/// Walk limits.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Maximum nesting depth below the root (root is depth 0).
    pub max_depth: usize,
    /// Maximum number of documents visited in one walk.
    pub max_nodes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 1_000_000,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> MerkleResult<()> {
    cfg.hashing
        .default_method
        .validate()
        .map_err(|e| MerkleError::invalid_config(format!("default hash method: {e}")))?;

    if cfg.limits.max_depth == 0 {
        return Err(MerkleError::invalid_config(
            "max_depth must be greater than zero",
        ));
    }

    if cfg.limits.max_nodes == 0 {
        return Err(MerkleError::invalid_config(
            "max_nodes must be greater than zero",
        ));
    }

    Ok(())
}
