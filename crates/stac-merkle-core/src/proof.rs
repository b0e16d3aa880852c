//! Inclusion proofs.
//!
//! A proof is the ordered list of sibling digests met on the way from one node's
//! digest up to a Merkle root, each tagged with the side the sibling sits on:
//! - `left`:  current = H(sibling || current)
//! - `right`: current = H(current || sibling)
//!
//! This mirrors the pairing order of [`crate::merkle`] exactly.
//!
//! Wire shape, attached to (or shipped next to) the proven node:
//!
//! ```json
//! {
//!   "merkle:object_hash": "...",
//!   "merkle:hash_method": { "function": "sha256", ... },
//!   "merkle:proof": { "catalog_root": "...", "hashes": ["..."], "positions": ["left"] }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MerkleError, MerkleResult};
use crate::hash::HashFunction;
use crate::merkle::inclusion_path;
use crate::method::HashMethod;
use crate::summary::SummaryNode;
use crate::{HASH_METHOD_KEY, OBJECT_HASH_KEY, PROOF_KEY, PROPERTIES_KEY};

/// Side of the sibling relative to the running digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
}

impl Position {
    pub fn parse(s: &str) -> MerkleResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(MerkleError::malformed_proof(format!(
                "invalid position value: {s} (must be 'left' or 'right')"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One level of a proof path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    pub hash: String,
    pub position: Position,
}

impl ProofStep {
    pub fn new(hash: impl Into<String>, position: Position) -> Self {
        Self {
            hash: hash.into(),
            position,
        }
    }
}

/// Verify an inclusion proof.
///
/// Fails with `MalformedProof` when the lists differ in length, a digest is not
/// hex, or a position is neither `left` nor `right`. Returns whether the
/// reconstructed root equals `claimed_root` (case-insensitive).
pub fn verify_proof(
    target_digest: &str,
    sibling_hashes: &[String],
    sibling_positions: &[String],
    claimed_root: &str,
    hash_function: &str,
) -> MerkleResult<bool> {
    if sibling_hashes.len() != sibling_positions.len() {
        return Err(MerkleError::malformed_proof(format!(
            "the number of proof hashes ({}) must match the number of proof positions ({})",
            sibling_hashes.len(),
            sibling_positions.len()
        )));
    }

    let function = HashFunction::parse(hash_function)?;

    let mut current = hex::decode(target_digest).map_err(|_| {
        MerkleError::malformed_proof(format!("invalid hex string for target digest: {target_digest}"))
    })?;
    hex::decode(claimed_root).map_err(|_| {
        MerkleError::malformed_proof(format!("invalid hex string for merkle root: {claimed_root}"))
    })?;

    for (idx, (sibling_hex, position)) in sibling_hashes.iter().zip(sibling_positions).enumerate() {
        let sibling = hex::decode(sibling_hex).map_err(|_| {
            MerkleError::malformed_proof(format!(
                "invalid hex string in proof hashes at index {idx}: {sibling_hex}"
            ))
        })?;

        let mut buf = Vec::with_capacity(sibling.len() + current.len());
        match Position::parse(position)? {
            Position::Left => {
                buf.extend_from_slice(&sibling);
                buf.extend_from_slice(&current);
            }
            Position::Right => {
                buf.extend_from_slice(&current);
                buf.extend_from_slice(&sibling);
            }
        }
        current = function.digest(&buf);
    }

    Ok(hex::encode(current).eq_ignore_ascii_case(claimed_root))
}

/// The `merkle:proof` object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InclusionProof {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_root: Option<String>,
    #[serde(default)]
    pub hashes: Vec<String>,
    #[serde(default)]
    pub positions: Vec<String>,
}

impl InclusionProof {
    pub fn from_steps(steps: &[ProofStep], root: Option<String>) -> Self {
        Self {
            catalog_root: root,
            hashes: steps.iter().map(|s| s.hash.clone()).collect(),
            positions: steps.iter().map(|s| s.position.as_str().to_string()).collect(),
        }
    }
}

/// Node digest, method and proof, as carried by a proven node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofEnvelope {
    #[serde(rename = "merkle:object_hash")]
    pub object_hash: String,
    #[serde(rename = "merkle:hash_method")]
    pub hash_method: HashMethod,
    #[serde(rename = "merkle:proof")]
    pub proof: InclusionProof,
}

impl ProofEnvelope {
    /// Extract the proof fields from a document.
    ///
    /// Each field is looked up at the top level first, then under `properties`.
    pub fn from_document(doc: &Value) -> MerkleResult<Self> {
        let object_hash = lookup(doc, OBJECT_HASH_KEY)?
            .as_str()
            .ok_or_else(|| MerkleError::malformed_proof("merkle:object_hash must be a string"))?
            .to_string();
        let hash_method = HashMethod::from_value(lookup(doc, HASH_METHOD_KEY)?)
            .map_err(|e| MerkleError::malformed_proof(format!("merkle:hash_method: {e}")))?;
        let proof: InclusionProof = serde_json::from_value(lookup(doc, PROOF_KEY)?.clone())
            .map_err(|e| MerkleError::malformed_proof(format!("merkle:proof: {e}")))?;

        Ok(Self {
            object_hash,
            hash_method,
            proof,
        })
    }

    /// Root to check against: the caller's root if given, else `catalog_root`.
    pub fn resolve_root<'a>(&'a self, trusted_root: Option<&'a str>) -> MerkleResult<&'a str> {
        trusted_root
            .or(self.proof.catalog_root.as_deref())
            .ok_or_else(|| {
                MerkleError::malformed_proof("merkle root not provided in proof or by the caller")
            })
    }

    pub fn verify(&self, trusted_root: Option<&str>) -> MerkleResult<bool> {
        let root = self.resolve_root(trusted_root)?;
        verify_proof(
            &self.object_hash,
            &self.proof.hashes,
            &self.proof.positions,
            root,
            &self.hash_method.function,
        )
    }

    pub fn to_value(&self) -> MerkleResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn lookup<'a>(doc: &'a Value, key: &str) -> MerkleResult<&'a Value> {
    doc.get(key)
        .filter(|v| !v.is_null())
        .or_else(|| doc.get(PROPERTIES_KEY).and_then(|p| p.get(key)))
        .ok_or_else(|| MerkleError::malformed_proof(format!("missing required merkle field: {key}")))
}

/// Build the proof for `node_id` against the top root of `summary`.
///
/// For an Item the path starts at its slot in the parent's reduction. For a
/// Collection or Catalog it starts at its own object hash inside its own
/// reduction, then continues with its root inside every ancestor's reduction.
/// Every level must use the same hash function, since the wire shape carries one.
pub fn prove(summary: &SummaryNode, node_id: &str) -> MerkleResult<ProofEnvelope> {
    let chain = summary
        .path_to(node_id)
        .ok_or_else(|| MerkleError::malformed_proof(format!("node '{node_id}' not found in summary")))?;

    let target = chain[chain.len() - 1];
    let mut levels: Vec<&SummaryNode> = chain[..chain.len() - 1].to_vec();
    if target.kind.is_interior() {
        levels.push(target);
    }

    let Some(first) = levels.last() else {
        return Err(MerkleError::malformed_proof(format!(
            "node '{node_id}' has no enclosing reduction"
        )));
    };
    let method = first.effective_method();
    let function = method.hash_function()?;

    let mut current = target.object_hash.clone();
    let mut steps = Vec::new();

    for level in levels.iter().rev() {
        let level_method = level.effective_method();
        if level_method.hash_function()? != function {
            return Err(MerkleError::malformed_proof(format!(
                "'{}' uses {} but the proof uses {function}",
                level.node_id, level_method.function
            )));
        }

        let inputs = level.reduction_inputs();
        let path = inclusion_path(&inputs, &current, &level_method)?.ok_or_else(|| {
            MerkleError::malformed_proof(format!(
                "digest {current} is not part of the reduction of '{}'",
                level.node_id
            ))
        })?;

        if level.root.as_deref() != Some(path.root.as_str()) {
            return Err(MerkleError::malformed_proof(format!(
                "summary is inconsistent: recomputed root of '{}' does not match",
                level.node_id
            )));
        }

        steps.extend(path.steps);
        current = path.root;
    }

    Ok(ProofEnvelope {
        object_hash: target.object_hash.clone(),
        hash_method: method,
        proof: InclusionProof::from_steps(&steps, Some(current)),
    })
}
