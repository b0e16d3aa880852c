use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use stac_merkle_core::DEFAULT_SUMMARY_FILE;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "stac-merkle",
    version,
    about = "Compute and verify Merkle trees over STAC catalogs"
)]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compute object hashes and roots for a catalog, annotate every document and
    /// write the tree summary.
    Compute {
        /// Path to the root catalog.json (or collection.json).
        catalog: PathBuf,

        /// Where to write the tree summary.
        #[arg(long, default_value = DEFAULT_SUMMARY_FILE)]
        merkle_tree_file: PathBuf,
    },

    /// Recompute every root of a tree summary and compare with the stored values.
    Verify {
        /// Tree summary written by `compute`.
        merkle_tree_file: PathBuf,
    },

    /// Recompute hashes and roots from an annotated catalog on disk.
    VerifyTree {
        /// Path to the root catalog.json (or collection.json).
        catalog: PathBuf,
    },

    /// Check a node's inclusion proof.
    VerifyProof {
        /// Document carrying merkle:object_hash, merkle:hash_method and merkle:proof.
        node: PathBuf,

        /// Trusted root; takes precedence over the proof's catalog_root.
        #[arg(long)]
        merkle_root: Option<String>,
    },

    /// Generate the inclusion proof of a node from a tree summary.
    Prove {
        /// Tree summary written by `compute`.
        merkle_tree_file: PathBuf,

        /// `node_id` of the node to prove.
        node_id: String,

        /// Write the proof envelope to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write every feature of a GeoJSON FeatureCollection as its own Item file.
    SplitFeatures {
        /// GeoJSON FeatureCollection file.
        input: PathBuf,

        /// Output directory (created if missing).
        out_dir: PathBuf,
    },
}
