//! stac-merkle-store
//!
//! Filesystem side of STAC Merkle trees:
//! - `fs`: a [`stac_merkle_core::source::DocumentSource`] over STAC directory conventions
//! - `json`: reading and writing documents and the summary file
//! - `split`: GeoJSON FeatureCollection to per-feature Item files

pub mod fs;
pub mod json;
pub mod split;

pub use crate::fs::{FsDocumentSource, LayoutConfig};
pub use crate::json::{read_json, read_summary, write_json, write_summary};
pub use crate::split::{split_feature_collection, SplitReport};
