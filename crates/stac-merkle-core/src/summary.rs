//! Hierarchical summary of a computed Merkle tree.
//!
//! The summary is the flat artifact written once after a build (`merkle_tree.json`)
//! and consumed whole by the verifier and the prover. Children are sorted by
//! `node_id` so that two builds over the same tree produce identical files no
//! matter how the source enumerated its entries.

use serde::{Deserialize, Serialize};

use crate::document::NodeKind;
use crate::method::HashMethod;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryNode {
    pub node_id: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(rename = "merkle:object_hash", alias = "object_hash", default)]
    pub object_hash: String,

    #[serde(
        rename = "merkle:root",
        alias = "root",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub root: Option<String>,

    #[serde(
        rename = "merkle:hash_method",
        alias = "hash_method",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hash_method: Option<HashMethod>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SummaryNode>,
}

impl SummaryNode {
    pub fn item(node_id: impl Into<String>, object_hash: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            kind: NodeKind::Item,
            object_hash: object_hash.into(),
            root: None,
            hash_method: None,
            children: Vec::new(),
        }
    }

    /// The digest this node contributes to its parent's reduction: the root of a
    /// Collection or Catalog, the object hash of an Item.
    pub fn contribution(&self) -> &str {
        if self.kind.is_interior() {
            self.root.as_deref().unwrap_or("")
        } else {
            &self.object_hash
        }
    }

    /// Persisted method, or the system default for summaries written without one.
    pub fn effective_method(&self) -> HashMethod {
        self.hash_method.clone().unwrap_or_default()
    }

    /// Stored digests that reduce to this node's root: non-empty child
    /// contributions followed by the node's own object hash.
    pub fn reduction_inputs(&self) -> Vec<String> {
        let mut inputs: Vec<String> = self
            .children
            .iter()
            .map(|c| c.contribution())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect();
        if !self.object_hash.is_empty() {
            inputs.push(self.object_hash.clone());
        }
        inputs
    }

    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.node_id.cmp(&b.node_id));
    }

    /// Nodes from `self` down to the first node with `node_id` (depth-first).
    pub fn path_to(&self, node_id: &str) -> Option<Vec<&SummaryNode>> {
        if self.node_id == node_id {
            return Some(vec![self]);
        }
        for child in &self.children {
            if let Some(mut tail) = child.path_to(node_id) {
                tail.insert(0, self);
                return Some(tail);
            }
        }
        None
    }

    pub fn find(&self, node_id: &str) -> Option<&SummaryNode> {
        self.path_to(node_id).and_then(|p| p.last().copied())
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SummaryNode::node_count).sum::<usize>()
    }

    /// Visit every node depth-first, parents before children.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a SummaryNode)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}
