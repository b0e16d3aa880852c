use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use stac_merkle_store::split_feature_collection;

use crate::output::Output;

pub fn run(out: &Output, input: &Path, out_dir: &Path) -> Result<bool> {
    let report = split_feature_collection(input, out_dir)
        .with_context(|| format!("splitting {}", input.display()))?;

    out.report(&report, |w| {
        if report.written.is_empty() && report.failed.is_empty() {
            return writeln!(w, "No features found in the collection.");
        }
        for path in &report.written {
            writeln!(w, "Feature saved to: {}", path.display())?;
        }
        for f in &report.failed {
            writeln!(w, "Error writing feature {}: {}", f.index, f.reason)?;
        }
        Ok(())
    })?;

    Ok(report.failed.is_empty())
}
