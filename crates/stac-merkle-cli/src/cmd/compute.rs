use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use stac_merkle_core::builder::TreeBuilder;
use stac_merkle_core::config::{validate_config, CoreConfig};
use stac_merkle_store::{write_summary, FsDocumentSource, LayoutConfig};

use crate::output::{self, Output};

#[derive(Debug, Serialize)]
pub struct ComputeOut {
    pub ok: bool,
    pub merkle_root: Option<String>,
    pub merkle_tree_file: Option<PathBuf>,
    pub nodes: usize,
    pub skipped: Vec<SkippedOut>,
}

#[derive(Debug, Serialize)]
pub struct SkippedOut {
    pub path: PathBuf,
    pub reason: String,
}

pub fn run(out: &Output, catalog: &Path, merkle_tree_file: &Path) -> Result<bool> {
    let config = CoreConfig::default();
    validate_config(&config)?;

    let pb = if out.is_json() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(80));

    pb.set_message(format!("hashing {}", catalog.display()));
    let mut layout = LayoutConfig::default();
    if let Some(name) = merkle_tree_file.file_name().and_then(|n| n.to_str()) {
        layout.summary_file = name.to_string();
    }
    let mut source = FsDocumentSource::with_layout(layout);
    let report = TreeBuilder::new(&mut source, &config).build(catalog);

    let written = match &report.summary {
        Some(summary) => {
            pb.set_message("writing tree summary");
            write_summary(merkle_tree_file, summary)
                .with_context(|| format!("writing {}", merkle_tree_file.display()))?;
            Some(merkle_tree_file.to_path_buf())
        }
        None => None,
    };
    pb.finish_and_clear();

    let result = ComputeOut {
        ok: report.summary.is_some(),
        merkle_root: report.root().map(str::to_string),
        merkle_tree_file: written,
        nodes: report.summary.as_ref().map_or(0, |s| s.node_count()),
        skipped: report
            .skipped
            .iter()
            .map(|s| SkippedOut {
                path: s.path.clone(),
                reason: s.reason.clone(),
            })
            .collect(),
    };

    out.report(&result, |w| {
        for s in &result.skipped {
            writeln!(w, "skipped {}: {}", s.path.display(), s.reason)?;
        }
        match (&result.merkle_root, &result.merkle_tree_file) {
            (Some(root), Some(file)) => {
                output::status(w, true, &format!("merkle:root {root} ({} nodes)", result.nodes))?;
                writeln!(w, "Merkle tree structure saved to {}", file.display())
            }
            _ => output::status(w, false, &format!("no merkle:root computed for {}", catalog.display())),
        }
    })?;

    Ok(result.ok)
}
