use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use stac_merkle_core::proof::ProofEnvelope;
use stac_merkle_store::read_json;

use crate::output::{self, Output};

#[derive(Debug, Serialize)]
pub struct VerifyProofOut {
    pub ok: bool,
    pub object_hash: String,
    pub merkle_root: String,
    pub hash_function: String,
    pub steps: usize,
}

pub fn run(out: &Output, node: &Path, trusted_root: Option<&str>) -> Result<bool> {
    let doc = read_json(node).with_context(|| format!("reading {}", node.display()))?;
    let envelope = ProofEnvelope::from_document(&doc)
        .with_context(|| format!("extracting proof from {}", node.display()))?;

    let root = envelope.resolve_root(trusted_root)?.to_string();
    let ok = envelope.verify(trusted_root)?;

    let result = VerifyProofOut {
        ok,
        object_hash: envelope.object_hash.clone(),
        merkle_root: root,
        hash_function: envelope.hash_method.function.clone(),
        steps: envelope.proof.hashes.len(),
    };

    out.report(&result, |w| {
        if ok {
            output::status(w, true, "Proof verified")?;
        } else {
            output::status(w, false, "Proof does not reconstruct the merkle root")?;
        }
        writeln!(w, " - merkle:object_hash: {}", result.object_hash)?;
        writeln!(w, " - merkle:root: {}", result.merkle_root)
    })?;

    Ok(ok)
}
