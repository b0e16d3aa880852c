use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use stac_merkle_core::verify::verify_summary;
use stac_merkle_store::read_summary;

use crate::output::Output;

pub fn run(out: &Output, merkle_tree_file: &Path) -> Result<bool> {
    info!(path = %merkle_tree_file.display(), "verifying tree summary");
    let summary = read_summary(merkle_tree_file)
        .with_context(|| format!("reading {}", merkle_tree_file.display()))?;

    let report = verify_summary(&summary);
    super::print_verify_report(out, &report)
}
