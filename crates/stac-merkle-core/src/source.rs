//! Document sources.
//!
//! The tree builder and the document verifier never touch the filesystem. They
//! read, write and enumerate documents through [`DocumentSource`]. The
//! filesystem implementation lives in `stac-merkle-store`; [`MemorySource`] keeps
//! everything in memory and is what the algorithms are tested against.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::{MerkleError, MerkleResult};

/// One entry found while enumerating a node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// A document to process. Its kind is decided after reading it.
    Document(PathBuf),
    /// A container that does not follow any known layout. Reported, never fatal.
    Unrecognized { path: PathBuf, reason: String },
}

impl Child {
    pub fn path(&self) -> &Path {
        match self {
            Child::Document(p) => p,
            Child::Unrecognized { path, .. } => path,
        }
    }
}

/// Read/write access to a tree of documents.
pub trait DocumentSource {
    fn read(&self, path: &Path) -> MerkleResult<Value>;

    fn write(&mut self, path: &Path, document: &Value) -> MerkleResult<()>;

    /// Children of the interior node stored at `path`, in a stable order.
    fn list_children(&self, path: &Path) -> MerkleResult<Vec<Child>>;
}

/// In-memory document tree with explicit parent/child links.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: BTreeMap<PathBuf, Value>,
    children: BTreeMap<PathBuf, Vec<Child>>,
    writes: usize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, document: Value) -> &mut Self {
        self.documents.insert(path.into(), document);
        self
    }

    /// Link `child` under `parent`.
    pub fn link(&mut self, parent: impl Into<PathBuf>, child: impl Into<PathBuf>) -> &mut Self {
        self.children
            .entry(parent.into())
            .or_default()
            .push(Child::Document(child.into()));
        self
    }

    /// Insert a document and link it under `parent` in one go.
    pub fn add_child(
        &mut self,
        parent: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
        document: Value,
    ) -> &mut Self {
        let path = path.into();
        self.documents.insert(path.clone(), document);
        self.link(parent, path)
    }

    /// Record a container under `parent` that the layout did not recognize.
    pub fn add_unrecognized(
        &mut self,
        parent: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> &mut Self {
        self.children.entry(parent.into()).or_default().push(Child::Unrecognized {
            path: path.into(),
            reason: reason.into(),
        });
        self
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&Value> {
        self.documents.get(path.as_ref())
    }

    pub fn get_mut(&mut self, path: impl AsRef<Path>) -> Option<&mut Value> {
        self.documents.get_mut(path.as_ref())
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl DocumentSource for MemorySource {
    fn read(&self, path: &Path) -> MerkleResult<Value> {
        self.documents.get(path).cloned().ok_or_else(|| {
            MerkleError::io(path, io::Error::new(io::ErrorKind::NotFound, "no such document"))
        })
    }

    fn write(&mut self, path: &Path, document: &Value) -> MerkleResult<()> {
        self.documents.insert(path.to_path_buf(), document.clone());
        self.writes += 1;
        Ok(())
    }

    fn list_children(&self, path: &Path) -> MerkleResult<Vec<Child>> {
        Ok(self.children.get(path).cloned().unwrap_or_default())
    }
}
