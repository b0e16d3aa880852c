//! Filesystem document source.
//!
//! A node is a JSON file; its directory is the file's parent. The children of a
//! Collection or Catalog are found in that directory:
//! - sibling `*.json` files holding Items
//! - subdirectories holding `collection.json` or `catalog.json`
//! - subdirectories holding exactly one JSON file that is an Item
//! - subdirectories of a `collections/` directory, classified the same way
//!
//! The tree summary file is never a child. Anything else that looks like content
//! is reported as unrecognized. Entries are
//! enumerated in file-name order so builds are reproducible across platforms.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use stac_merkle_core::document::{kind_of, NodeKind};
use stac_merkle_core::source::{Child, DocumentSource};
use stac_merkle_core::{MerkleError, MerkleResult, DEFAULT_SUMMARY_FILE};

use crate::json::{read_json, write_json};

/// File and directory names of the STAC layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub catalog_file: String,
    pub collection_file: String,
    pub collections_dir: String,
    pub summary_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            catalog_file: "catalog.json".to_string(),
            collection_file: "collection.json".to_string(),
            collections_dir: "collections".to_string(),
            summary_file: DEFAULT_SUMMARY_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FsDocumentSource {
    layout: LayoutConfig,
}

impl FsDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    fn classify_dir(&self, dir: &Path) -> MerkleResult<Child> {
        for name in [&self.layout.collection_file, &self.layout.catalog_file] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(Child::Document(candidate));
            }
        }

        let json_files: Vec<PathBuf> = entries(dir)?
            .into_iter()
            .filter(|p| p.is_file() && is_json(p))
            .collect();

        match json_files.as_slice() {
            [only] if peek_kind(only) == Some(NodeKind::Item) => Ok(Child::Document(only.clone())),
            [_] => Ok(unrecognized(dir, "single JSON file is not an Item")),
            [] => Ok(unrecognized(dir, "no STAC document found")),
            many => Ok(unrecognized(
                dir,
                format!(
                    "{} JSON files and no {} or {}",
                    many.len(),
                    self.layout.collection_file,
                    self.layout.catalog_file
                ),
            )),
        }
    }
}

fn unrecognized(path: &Path, reason: impl Into<String>) -> Child {
    Child::Unrecognized {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Kind of the document at `path`, or `None` if it cannot be read as JSON.
fn peek_kind(path: &Path) -> Option<NodeKind> {
    read_json(path).ok().map(|doc| kind_of(&doc))
}

/// Direct entries of `dir`, sorted by file name.
fn entries(dir: &Path) -> MerkleResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            MerkleError::io(path, source)
        })?;
        out.push(entry.into_path());
    }
    Ok(out)
}

impl DocumentSource for FsDocumentSource {
    fn read(&self, path: &Path) -> MerkleResult<Value> {
        read_json(path)
    }

    fn write(&mut self, path: &Path, document: &Value) -> MerkleResult<()> {
        write_json(path, document)
    }

    fn list_children(&self, path: &Path) -> MerkleResult<Vec<Child>> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let own_name = path.file_name();

        let mut children = Vec::new();
        for entry in entries(dir)? {
            if entry.is_dir() {
                if entry.file_name().and_then(|n| n.to_str()) == Some(self.layout.collections_dir.as_str()) {
                    for sub in entries(&entry)? {
                        if sub.is_dir() {
                            children.push(self.classify_dir(&sub)?);
                        }
                    }
                } else {
                    children.push(self.classify_dir(&entry)?);
                }
                continue;
            }

            let name = entry.file_name();
            if !is_json(&entry)
                || name == own_name
                || name.and_then(|n| n.to_str()) == Some(self.layout.summary_file.as_str())
            {
                continue;
            }

            match peek_kind(&entry) {
                Some(NodeKind::Item) | None => children.push(Child::Document(entry)),
                Some(other) => children.push(unrecognized(
                    &entry,
                    format!("sibling {other} document is not an Item"),
                )),
            }
        }

        debug!(node = %path.display(), children = children.len(), "listed children");
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn put(path: &Path, value: Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    fn names(root: &Path, children: &[Child]) -> Vec<String> {
        children
            .iter()
            .map(|c| {
                let rel = c.path().strip_prefix(root).unwrap().display().to_string();
                match c {
                    Child::Document(_) => rel,
                    Child::Unrecognized { .. } => format!("?{rel}"),
                }
            })
            .collect()
    }

    #[test]
    fn collection_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let item = json!({"type": "Feature", "id": "i"});

        put(&root.join("collection.json"), json!({"type": "Collection", "id": "c"}));
        put(&root.join("b.json"), item.clone());
        put(&root.join("a.json"), item.clone());
        put(&root.join("other.json"), json!({"type": "Catalog"}));
        fs::write(root.join("readme.md"), "x").unwrap();
        put(&root.join("one").join("one.json"), item.clone());
        put(&root.join("sub").join("catalog.json"), json!({"type": "Catalog"}));
        put(&root.join("twice").join("x.json"), item.clone());
        put(&root.join("twice").join("y.json"), item);
        fs::create_dir_all(root.join("empty")).unwrap();

        let src = FsDocumentSource::new();
        let kids = src.list_children(&root.join("collection.json")).unwrap();
        assert_eq!(
            names(root, &kids),
            vec![
                "a.json",
                "b.json",
                "?empty",
                "one/one.json",
                "?other.json",
                "sub/catalog.json",
                "?twice",
            ]
        );
    }

    #[test]
    fn collections_directory_is_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        put(&root.join("catalog.json"), json!({"type": "Catalog", "id": "root"}));
        put(
            &root.join("collections").join("c1").join("collection.json"),
            json!({"type": "Collection"}),
        );
        put(
            &root.join("collections").join("c0").join("collection.json"),
            json!({"type": "Collection"}),
        );

        let src = FsDocumentSource::new();
        let kids = src.list_children(&root.join("catalog.json")).unwrap();
        assert_eq!(
            names(root, &kids),
            vec!["collections/c0/collection.json", "collections/c1/collection.json"]
        );
    }

    #[test]
    fn summary_file_is_not_a_child() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        put(&root.join("catalog.json"), json!({"type": "Catalog", "id": "root"}));
        put(
            &root.join("merkle_tree.json"),
            json!({"node_id": "root", "type": "Catalog", "children": []}),
        );
        put(&root.join("item.json"), json!({"type": "Feature", "id": "i"}));

        let src = FsDocumentSource::new();
        let kids = src.list_children(&root.join("catalog.json")).unwrap();
        assert_eq!(names(root, &kids), vec!["item.json"]);
    }

    #[test]
    fn writes_are_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let mut src = FsDocumentSource::new();
        src.write(&path, &json!({"type": "Catalog", "id": "x"})).unwrap();
        assert_eq!(src.read(&path).unwrap()["id"], "x");
    }
}
