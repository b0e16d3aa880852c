//! Split a GeoJSON FeatureCollection into one Item file per feature.
//!
//! Each feature is written to `<out_dir>/<id>.json`, or `feature_<index>.json`
//! when it has no usable `id`. A feature that cannot be written is recorded and
//! the remaining features are still processed.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use stac_merkle_core::{MerkleError, MerkleResult};

use crate::json::{read_json, write_json};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<SplitFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitFailure {
    pub index: usize,
    pub reason: String,
}

fn file_stem(feature: &Value, index: usize) -> String {
    let id = match feature.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    id.unwrap_or_else(|| format!("feature_{index}"))
}

fn is_safe_stem(stem: &str) -> bool {
    !stem.is_empty() && stem != "." && stem != ".." && !stem.contains(['/', '\\'])
}

pub fn split_feature_collection(input: &Path, out_dir: &Path) -> MerkleResult<SplitReport> {
    let doc = read_json(input)?;
    let location = input.display().to_string();

    if doc.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(MerkleError::malformed_document(
            location,
            "not a GeoJSON FeatureCollection",
        ));
    }
    let Some(features) = doc.get("features").and_then(Value::as_array) else {
        return Err(MerkleError::malformed_document(location, "missing features array"));
    };

    let mut report = SplitReport::default();
    if features.is_empty() {
        warn!(input = %location, "no features found in the collection");
        return Ok(report);
    }

    for (index, feature) in features.iter().enumerate() {
        let stem = file_stem(feature, index);
        if !is_safe_stem(&stem) {
            report.failed.push(SplitFailure {
                index,
                reason: format!("feature id {stem:?} is not a usable file name"),
            });
            continue;
        }

        let path = out_dir.join(format!("{stem}.json"));
        match write_json(&path, feature) {
            Ok(()) => {
                info!(path = %path.display(), "feature saved");
                report.written.push(path);
            }
            Err(e) => {
                warn!(index, error = %e, "failed to write feature");
                report.failed.push(SplitFailure {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}
