use std::path::Path;

use anyhow::Result;
use tracing::info;

use stac_merkle_core::config::CoreConfig;
use stac_merkle_core::verify::verify_documents;
use stac_merkle_store::FsDocumentSource;

use crate::output::Output;

pub fn run(out: &Output, catalog: &Path) -> Result<bool> {
    info!(path = %catalog.display(), "verifying annotated catalog");
    let source = FsDocumentSource::new();
    let report = verify_documents(&source, catalog, &CoreConfig::default());
    super::print_verify_report(out, &report)
}
