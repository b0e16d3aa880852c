//! JSON file helpers.
//!
//! Documents are written pretty-printed with a two-space indent and a trailing
//! newline. Key order is preserved as read.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use stac_merkle_core::summary::SummaryNode;
use stac_merkle_core::{MerkleError, MerkleResult};

pub fn read_json(path: &Path) -> MerkleResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| MerkleError::io(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| MerkleError::malformed_document(path.display().to_string(), e.to_string()))
}

pub fn write_json(path: &Path, value: &Value) -> MerkleResult<()> {
    write_pretty(path, value)
}

fn write_pretty<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> MerkleResult<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MerkleError::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| MerkleError::io(path, e))?;
    debug!(path = %path.display(), "wrote json");
    Ok(())
}

pub fn write_summary(path: &Path, summary: &SummaryNode) -> MerkleResult<()> {
    write_pretty(path, summary)
}

pub fn read_summary(path: &Path) -> MerkleResult<SummaryNode> {
    let text = fs::read_to_string(path).map_err(|e| MerkleError::io(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| MerkleError::malformed_document(path.display().to_string(), e.to_string()))
}
