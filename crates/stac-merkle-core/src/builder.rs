//! Tree building.
//!
//! Walks a document hierarchy depth-first, computes every node's object hash and
//! root, writes the computed fields back through the [`DocumentSource`] and
//! returns the hierarchical summary.
//!
//! For a Collection or Catalog:
//! 1. resolve the hash method (declared, else inherited)
//! 2. process every child (recursing into interior children with this method)
//! 3. hash the node's own content
//! 4. reduce child contributions plus the own hash into the root
//! 5. persist `merkle:object_hash`, `merkle:root`, `merkle:hash_method` and the extension
//!
//! A node that fails is recorded in [`BuildReport::skipped`] and contributes
//! nothing to its parent. The walk never aborts because of one node.

use std::path::{Path, PathBuf};

use tracing::{debug, debug_span, info, warn};

use crate::config::CoreConfig;
use crate::document::{
    declared_method, ensure_extension, kind_of, node_id, set_interior_fields,
    set_item_object_hash, NodeKind,
};
use crate::errors::{MerkleError, MerkleResult};
use crate::merkle::merkle_root;
use crate::method::HashMethod;
use crate::object_hash::object_hash;
use crate::source::{Child, DocumentSource};
use crate::summary::SummaryNode;

/// A node or container that was left out of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNode {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a build.
///
/// `summary` is `None` when no root could be produced at all. A present summary
/// with a non-empty `skipped` list is a partial tree.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub summary: Option<SummaryNode>,
    pub skipped: Vec<SkippedNode>,
    pub visited: usize,
}

impl BuildReport {
    pub fn root(&self) -> Option<&str> {
        self.summary.as_ref().and_then(|s| s.root.as_deref())
    }

    pub fn is_complete(&self) -> bool {
        self.summary.is_some() && self.skipped.is_empty()
    }
}

/// Build the tree rooted at `root` with the given configuration.
pub fn build_tree<S: DocumentSource + ?Sized>(
    source: &mut S,
    root: &Path,
    config: &CoreConfig,
) -> BuildReport {
    TreeBuilder::new(source, config).build(root)
}

pub struct TreeBuilder<'a, S: DocumentSource + ?Sized> {
    source: &'a mut S,
    config: &'a CoreConfig,
    visited: usize,
    skipped: Vec<SkippedNode>,
}

impl<'a, S: DocumentSource + ?Sized> TreeBuilder<'a, S> {
    pub fn new(source: &'a mut S, config: &'a CoreConfig) -> Self {
        Self {
            source,
            config,
            visited: 0,
            skipped: Vec::new(),
        }
    }

    /// Process the root document and everything below it.
    ///
    /// The root inherits `config.hashing.default_method` when it declares none.
    pub fn build(mut self, root: &Path) -> BuildReport {
        let inherited = self.config.hashing.default_method.clone();

        let summary = match self.process_root(root, &inherited) {
            Ok(node) => Some(node),
            Err(e) => {
                self.skip(root, e.to_string());
                None
            }
        };

        BuildReport {
            summary,
            skipped: self.skipped,
            visited: self.visited,
        }
    }

    fn process_root(&mut self, path: &Path, inherited: &HashMethod) -> MerkleResult<SummaryNode> {
        let doc = self.read(path)?;
        match kind_of(&doc) {
            kind @ (NodeKind::Catalog | NodeKind::Collection) => {
                self.process_interior(path, doc, kind, Some(inherited), 0)
            }
            other => Err(MerkleError::malformed_document(
                path.display().to_string(),
                format!("root must be a Catalog or Collection, found {other}"),
            )),
        }
    }

    fn read(&mut self, path: &Path) -> MerkleResult<serde_json::Value> {
        self.visited += 1;
        if self.visited > self.config.limits.max_nodes {
            return Err(MerkleError::limit_exceeded(format!(
                "more than {} documents",
                self.config.limits.max_nodes
            )));
        }
        self.source.read(path)
    }

    fn skip(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(path = %path.display(), %reason, "skipping node");
        self.skipped.push(SkippedNode {
            path: path.to_path_buf(),
            reason,
        });
    }

    fn visit_child(&mut self, path: &Path, method: &HashMethod, depth: usize) -> Option<SummaryNode> {
        match self.process_child(path, method, depth) {
            Ok(node) => node,
            Err(e) => {
                self.skip(path, e.to_string());
                None
            }
        }
    }

    fn process_child(
        &mut self,
        path: &Path,
        method: &HashMethod,
        depth: usize,
    ) -> MerkleResult<Option<SummaryNode>> {
        if depth > self.config.limits.max_depth {
            return Err(MerkleError::limit_exceeded(format!(
                "nesting deeper than {}",
                self.config.limits.max_depth
            )));
        }

        let doc = self.read(path)?;
        match kind_of(&doc) {
            NodeKind::Item => self.process_item(path, doc, method).map(Some),
            kind @ (NodeKind::Collection | NodeKind::Catalog) => self
                .process_interior(path, doc, kind, Some(method), depth)
                .map(Some),
            NodeKind::Unknown => {
                self.skip(path, "not a STAC Item, Collection or Catalog");
                Ok(None)
            }
        }
    }

    fn process_item(
        &mut self,
        path: &Path,
        mut doc: serde_json::Value,
        method: &HashMethod,
    ) -> MerkleResult<SummaryNode> {
        let hash = object_hash(&doc, method)?;

        set_item_object_hash(&mut doc, &hash)?;
        ensure_extension(&mut doc)?;
        self.source.write(path, &doc)?;

        let id = node_id(&doc, &path.display().to_string());
        info!(item = %id, object_hash = %hash, "processed item");
        Ok(SummaryNode::item(id, hash))
    }

    fn process_interior(
        &mut self,
        path: &Path,
        mut doc: serde_json::Value,
        kind: NodeKind,
        inherited: Option<&HashMethod>,
        depth: usize,
    ) -> MerkleResult<SummaryNode> {
        let location = path.display().to_string();
        let _span = debug_span!("node", %kind, path = %location).entered();

        let method = match declared_method(&doc)? {
            Some(m) => m,
            None => inherited
                .cloned()
                .ok_or_else(|| MerkleError::MissingHashMethod(location.clone()))?,
        };
        method.validate()?;

        let mut children = Vec::new();
        for child in self.source.list_children(path)? {
            match child {
                Child::Document(p) => {
                    if let Some(node) = self.visit_child(&p, &method, depth + 1) {
                        children.push(node);
                    }
                }
                Child::Unrecognized { path, reason } => self.skip(&path, reason),
            }
        }

        let own = object_hash(&doc, &method)?;

        let mut inputs: Vec<String> = children
            .iter()
            .map(SummaryNode::contribution)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect();
        inputs.push(own.clone());
        debug!(inputs = inputs.len(), "computing root");

        let root = merkle_root(&inputs, &method)?;

        set_interior_fields(&mut doc, &own, &root, &method)?;
        ensure_extension(&mut doc)?;
        self.source.write(path, &doc)?;

        let id = node_id(&doc, &location);
        info!(%kind, node = %id, root = %root, children = children.len(), "processed node");

        let mut node = SummaryNode {
            node_id: id,
            kind,
            object_hash: own,
            root: Some(root),
            hash_method: Some(method),
            children,
        };
        node.sort_children();
        Ok(node)
    }
}
