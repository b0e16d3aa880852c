//! Tree verification.
//!
//! Two entry points:
//! - [`verify_summary`] recomputes every root of a persisted summary from the
//!   stored object hashes.
//! - [`verify_documents`] walks an annotated document tree and recomputes object
//!   hashes from content as well, so edited documents are detected.
//!
//! Both continue past mismatches and collect one message per offending node.
//! A recomputed (not stored) root is what a node contributes to its parent, so a
//! change low in the tree shows up at every ancestor.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::CoreConfig;
use crate::document::{
    declared_method, kind_of, node_id, stored_object_hash, stored_root, NodeKind,
};
use crate::errors::{MerkleError, MerkleResult};
use crate::merkle::{merkle_root, EMPTY_ROOT};
use crate::method::HashMethod;
use crate::object_hash::object_hash;
use crate::source::{Child, DocumentSource};
use crate::summary::SummaryNode;

/// Outcome of a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub ok: bool,
    pub computed_root: String,
    pub expected_root: Option<String>,
    pub discrepancies: Vec<String>,
}

impl VerifyReport {
    fn finish(computed_root: String, expected_root: Option<String>, discrepancies: Vec<String>) -> Self {
        let root_matches = expected_root
            .as_deref()
            .is_some_and(|expected| expected.eq_ignore_ascii_case(&computed_root));
        let ok = root_matches && discrepancies.is_empty();

        if ok {
            info!(root = %computed_root, "merkle tree verified");
        } else {
            warn!(
                computed = %computed_root,
                expected = expected_root.as_deref().unwrap_or("<none>"),
                discrepancies = discrepancies.len(),
                "merkle tree verification failed"
            );
        }

        Self {
            ok,
            computed_root,
            expected_root,
            discrepancies,
        }
    }
}

fn mismatch(kind: NodeKind, id: &str, field: &str) -> String {
    format!("{kind} '{id}' has mismatched {field}")
}

fn unrecomputable(kind: NodeKind, id: &str, err: &MerkleError) -> String {
    format!("{kind} '{id}' could not be recomputed: {err}")
}

/// Recomputed contribution of one subtree and the messages it produced, in
/// children-first order.
struct Recomputed {
    contribution: String,
    discrepancies: Vec<String>,
}

/// Verify a hierarchical summary against its own stored roots.
pub fn verify_summary(summary: &SummaryNode) -> VerifyReport {
    let top = recompute(summary);
    let mut discrepancies = top.discrepancies;

    if !summary.kind.is_interior() {
        discrepancies.push(format!(
            "{} '{}' is not a Collection or Catalog",
            summary.kind, summary.node_id
        ));
    }

    VerifyReport::finish(top.contribution, summary.root.clone(), discrepancies)
}

fn recompute(node: &SummaryNode) -> Recomputed {
    if !node.kind.is_interior() {
        return Recomputed {
            contribution: node.object_hash.clone(),
            discrepancies: Vec::new(),
        };
    }

    let mut discrepancies = Vec::new();
    let mut inputs = Vec::with_capacity(node.children.len() + 1);

    for child in recompute_children(&node.children) {
        discrepancies.extend(child.discrepancies);
        if !child.contribution.is_empty() {
            inputs.push(child.contribution);
        }
    }
    if !node.object_hash.is_empty() {
        inputs.push(node.object_hash.clone());
    }

    let computed = match merkle_root(&inputs, &node.effective_method()) {
        Ok(root) => root,
        Err(e) => {
            discrepancies.push(unrecomputable(node.kind, &node.node_id, &e));
            return Recomputed {
                contribution: EMPTY_ROOT.to_string(),
                discrepancies,
            };
        }
    };

    let matches = node
        .root
        .as_deref()
        .is_some_and(|stored| stored.eq_ignore_ascii_case(&computed));
    if !matches {
        debug!(node = %node.node_id, %computed, stored = ?node.root, "root mismatch");
        discrepancies.push(mismatch(node.kind, &node.node_id, crate::ROOT_KEY));
    }

    Recomputed {
        contribution: computed,
        discrepancies,
    }
}

#[cfg(feature = "parallel")]
fn recompute_children(children: &[SummaryNode]) -> Vec<Recomputed> {
    use rayon::prelude::*;
    children.par_iter().map(recompute).collect()
}

#[cfg(not(feature = "parallel"))]
fn recompute_children(children: &[SummaryNode]) -> Vec<Recomputed> {
    children.iter().map(recompute).collect()
}

/// Verify an annotated document tree rooted at `root`.
///
/// Object hashes are recomputed from content with each node's persisted method
/// (Items use their parent's). The source is only read.
pub fn verify_documents<S: DocumentSource + ?Sized>(
    source: &S,
    root: &Path,
    config: &CoreConfig,
) -> VerifyReport {
    let location = root.display().to_string();
    let doc = match source.read(root) {
        Ok(doc) => doc,
        Err(e) => {
            return VerifyReport::finish(
                EMPTY_ROOT.to_string(),
                None,
                vec![format!("'{location}' could not be read: {e}")],
            )
        }
    };

    let kind = kind_of(&doc);
    let expected = stored_root(&doc).map(str::to_string);
    let mut walker = DocumentWalker {
        source,
        config,
        discrepancies: Vec::new(),
    };

    let computed = if kind.is_interior() {
        walker.interior(root, &doc, kind, &config.hashing.default_method, 0)
    } else {
        walker.discrepancies.push(format!(
            "{kind} '{}' is not a Collection or Catalog",
            node_id(&doc, &location)
        ));
        EMPTY_ROOT.to_string()
    };

    VerifyReport::finish(computed, expected, walker.discrepancies)
}

struct DocumentWalker<'a, S: DocumentSource + ?Sized> {
    source: &'a S,
    config: &'a CoreConfig,
    discrepancies: Vec<String>,
}

impl<'a, S: DocumentSource + ?Sized> DocumentWalker<'a, S> {
    fn child(&mut self, path: &Path, method: &HashMethod, depth: usize) -> String {
        let doc = match self.source.read(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable child");
                self.discrepancies
                    .push(format!("'{}' could not be read: {e}", path.display()));
                return EMPTY_ROOT.to_string();
            }
        };

        match kind_of(&doc) {
            NodeKind::Item => self.item(path, &doc, method),
            kind @ (NodeKind::Collection | NodeKind::Catalog) => {
                self.interior(path, &doc, kind, method, depth)
            }
            NodeKind::Unknown => {
                debug!(path = %path.display(), "non-STAC child document");
                self.discrepancies.push(format!(
                    "'{}' is not a STAC Item, Collection or Catalog",
                    path.display()
                ));
                EMPTY_ROOT.to_string()
            }
        }
    }

    fn item(&mut self, path: &Path, doc: &serde_json::Value, method: &HashMethod) -> String {
        let id = node_id(doc, &path.display().to_string());
        match object_hash(doc, method) {
            Ok(computed) => {
                let matches =
                    stored_object_hash(doc).is_some_and(|stored| stored.eq_ignore_ascii_case(&computed));
                if !matches {
                    self.discrepancies
                        .push(mismatch(NodeKind::Item, &id, crate::OBJECT_HASH_KEY));
                }
                computed
            }
            Err(e) => {
                self.discrepancies.push(unrecomputable(NodeKind::Item, &id, &e));
                EMPTY_ROOT.to_string()
            }
        }
    }

    fn interior(
        &mut self,
        path: &Path,
        doc: &serde_json::Value,
        kind: NodeKind,
        inherited: &HashMethod,
        depth: usize,
    ) -> String {
        let id = node_id(doc, &path.display().to_string());
        match self.try_interior(path, doc, &id, kind, inherited, depth) {
            Ok(root) => root,
            Err(e) => {
                self.discrepancies.push(unrecomputable(kind, &id, &e));
                EMPTY_ROOT.to_string()
            }
        }
    }

    fn try_interior(
        &mut self,
        path: &Path,
        doc: &serde_json::Value,
        id: &str,
        kind: NodeKind,
        inherited: &HashMethod,
        depth: usize,
    ) -> MerkleResult<String> {
        if depth > self.config.limits.max_depth {
            return Err(MerkleError::limit_exceeded(format!(
                "nesting deeper than {}",
                self.config.limits.max_depth
            )));
        }

        let method = declared_method(doc)?.unwrap_or_else(|| inherited.clone());
        method.validate()?;

        let mut inputs = Vec::new();
        for child in self.source.list_children(path)? {
            match child {
                Child::Document(p) => {
                    let contribution = self.child(&p, &method, depth + 1);
                    if !contribution.is_empty() {
                        inputs.push(contribution);
                    }
                }
                Child::Unrecognized { path, reason } => {
                    debug!(path = %path.display(), %reason, "unrecognized container ignored");
                }
            }
        }

        let own = object_hash(doc, &method)?;
        let own_matches = stored_object_hash(doc).is_some_and(|stored| stored.eq_ignore_ascii_case(&own));
        if !own_matches {
            self.discrepancies.push(mismatch(kind, id, crate::OBJECT_HASH_KEY));
        }
        inputs.push(own);

        let computed = merkle_root(&inputs, &method)?;
        let matches = stored_root(doc).is_some_and(|stored| stored.eq_ignore_ascii_case(&computed));
        if !matches {
            self.discrepancies.push(mismatch(kind, id, crate::ROOT_KEY));
        }
        Ok(computed)
    }
}
