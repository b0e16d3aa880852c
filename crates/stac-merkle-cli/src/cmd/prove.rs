use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use stac_merkle_core::proof::prove;
use stac_merkle_store::{read_summary, write_json};

use crate::output::Output;

pub fn run(out: &Output, merkle_tree_file: &Path, node_id: &str, out_file: Option<&Path>) -> Result<bool> {
    let summary = read_summary(merkle_tree_file)
        .with_context(|| format!("reading {}", merkle_tree_file.display()))?;

    let envelope = prove(&summary, node_id)?;
    let value = envelope.to_value()?;
    info!(node = node_id, steps = envelope.proof.hashes.len(), "proof generated");

    let Some(path) = out_file else {
        out.print_json(&value)?;
        return Ok(true);
    };

    write_json(path, &value).with_context(|| format!("writing {}", path.display()))?;
    out.report(&value, |w| {
        writeln!(w, "Proof for '{node_id}' saved to {}", path.display())
    })?;
    Ok(true)
}
