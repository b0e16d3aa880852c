//! stac-merkle-core
//!
//! Core primitives for STAC Merkle trees:
//! - Canonical JSON encoding with reserved-field stripping
//! - Hash function registry and hash methods
//! - Object hashing and Merkle reduction
//! - Tree building and verification over a pluggable document source
//! - Inclusion proofs (generation and verification)

pub mod builder;
pub mod canonical;
pub mod config;
pub mod document;
pub mod errors;
pub mod hash;
pub mod merkle;
pub mod method;
pub mod object_hash;
pub mod proof;
pub mod source;
pub mod summary;
pub mod verify;

pub use crate::errors::{MerkleError, MerkleResult};

/// Object hash of a node (under `properties` on Items).
pub const OBJECT_HASH_KEY: &str = "merkle:object_hash";
/// Resolved hash method of a Collection or Catalog.
pub const HASH_METHOD_KEY: &str = "merkle:hash_method";
/// Merkle root of a Collection or Catalog.
pub const ROOT_KEY: &str = "merkle:root";
/// Inclusion proof of a node.
pub const PROOF_KEY: &str = "merkle:proof";

pub const PROPERTIES_KEY: &str = "properties";
pub const EXTENSIONS_KEY: &str = "stac_extensions";

/// Schema URL of the integrity extension.
pub const MERKLE_EXTENSION_URL: &str = "https://stacchain.github.io/merkle-tree/v1.0.0/schema.json";

/// Computed fields removed at every depth before hashing.
pub const RESERVED_KEYS: [&str; 3] = [OBJECT_HASH_KEY, HASH_METHOD_KEY, ROOT_KEY];

/// File name of the persisted summary.
pub const DEFAULT_SUMMARY_FILE: &str = "merkle_tree.json";

/// Convenience re-exports.
pub mod prelude {
    pub use crate::builder::{build_tree, BuildReport, SkippedNode, TreeBuilder};
    pub use crate::canonical::{canonical_json_bytes, canonicalize_document};
    pub use crate::config::{validate_config, CoreConfig};
    pub use crate::document::{kind_of, NodeKind};
    pub use crate::hash::HashFunction;
    pub use crate::merkle::{inclusion_path, merkle_root};
    pub use crate::method::{DigestOrdering, FieldSelection, HashMethod};
    pub use crate::object_hash::object_hash;
    pub use crate::proof::{prove, verify_proof, InclusionProof, Position, ProofEnvelope};
    pub use crate::source::{Child, DocumentSource, MemorySource};
    pub use crate::summary::SummaryNode;
    pub use crate::verify::{verify_documents, verify_summary, VerifyReport};
    pub use crate::{MerkleError, MerkleResult};
}
