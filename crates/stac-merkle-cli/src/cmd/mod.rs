use std::io::{self, Write};

use anyhow::Result;
use termcolor::StandardStream;

use stac_merkle_core::verify::VerifyReport;

use crate::args::{Cli, Command};
use crate::output::{self, Output};

mod compute;
mod prove;
mod split;
mod verify;
mod verify_proof;
mod verify_tree;

/// Run the selected command. `Ok(false)` means the command ran but the check failed.
pub fn dispatch(cli: &Cli, out: &Output) -> Result<bool> {
    match &cli.command {
        Command::Compute {
            catalog,
            merkle_tree_file,
        } => compute::run(out, catalog, merkle_tree_file),
        Command::Verify { merkle_tree_file } => verify::run(out, merkle_tree_file),
        Command::VerifyTree { catalog } => verify_tree::run(out, catalog),
        Command::VerifyProof { node, merkle_root } => {
            verify_proof::run(out, node, merkle_root.as_deref())
        }
        Command::Prove {
            merkle_tree_file,
            node_id,
            out: out_file,
        } => prove::run(out, merkle_tree_file, node_id, out_file.as_deref()),
        Command::SplitFeatures { input, out_dir } => split::run(out, input, out_dir),
    }
}

/// Shared rendering of a tree verification result.
fn print_verify_report(out: &Output, report: &VerifyReport) -> Result<bool> {
    out.report(report, |w: &mut StandardStream| -> io::Result<()> {
        if report.ok {
            return output::status(
                w,
                true,
                &format!("merkle:root matches ({})", report.computed_root),
            );
        }

        output::status(w, false, "merkle:root verification failed")?;
        match &report.expected_root {
            Some(expected) => writeln!(w, " - Expected merkle:root: {expected}")?,
            None => writeln!(w, " - Expected merkle:root: not found")?,
        }
        writeln!(w, " - Calculated merkle:root: {}", report.computed_root)?;
        if !report.discrepancies.is_empty() {
            writeln!(w, "Discrepancies found in the following nodes:")?;
            for d in &report.discrepancies {
                writeln!(w, " - {d}")?;
            }
        }
        Ok(())
    })?;
    Ok(report.ok)
}
