//! cli.rs
//!
//! Drives the `stac-merkle` binary over a catalog written to a temp directory.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

fn put(path: &Path, value: Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn item(id: &str) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "geometry": null,
        "properties": {"datetime": "2024-10-15T12:00:00Z"},
        "links": []
    })
}

fn catalog(root: &Path) {
    put(
        &root.join("catalog.json"),
        json!({"type": "Catalog", "id": "root", "description": "root", "links": []}),
    );
    let col = root.join("collections").join("c1");
    put(
        &col.join("collection.json"),
        json!({"type": "Collection", "id": "c1", "description": "c1", "links": []}),
    );
    put(&col.join("i1").join("i1.json"), item("i1"));
    put(&col.join("i2").join("i2.json"), item("i2"));
    put(&col.join("i3.json"), item("i3"));
}

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("stac-merkle").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let out = cmd.output().unwrap();
    serde_json::from_slice(&out.stdout).unwrap()
}

fn compute(root: &Path) -> Value {
    json_stdout(
        bin()
            .arg("--json")
            .arg("compute")
            .arg(root.join("catalog.json"))
            .arg("--merkle-tree-file")
            .arg(root.join("merkle_tree.json")),
    )
}

#[test]
fn compute_then_verify() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    catalog(root);

    let computed = compute(root);
    assert_eq!(computed["ok"], true);
    assert_eq!(computed["nodes"], 5);
    let merkle_root = computed["merkle_root"].as_str().unwrap().to_string();

    bin()
        .arg("verify")
        .arg(root.join("merkle_tree.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(merkle_root.as_str()));

    bin()
        .arg("verify-tree")
        .arg(root.join("catalog.json"))
        .assert()
        .success();
}

#[test]
fn recompute_ignores_the_previous_summary() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    catalog(root);

    let first = compute(root);
    let second = compute(root);
    assert_eq!(second["skipped"], json!([]));
    assert_eq!(second["nodes"], 5);
    assert_eq!(second["merkle_root"], first["merkle_root"]);
}

#[test]
fn tampered_summary_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    catalog(root);
    compute(root);

    let path = root.join("merkle_tree.json");
    let mut summary: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    summary["children"][0]["children"][0]["merkle:object_hash"] = json!("00".repeat(32));
    fs::write(&path, summary.to_string()).unwrap();

    bin()
        .arg("verify")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Collection 'c1' has mismatched merkle:root"))
        .stdout(predicate::str::contains("Catalog 'root' has mismatched merkle:root"));
}

#[test]
fn edited_item_fails_tree_verification() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    catalog(root);
    compute(root);

    let path = root.join("collections/c1/i3.json");
    let mut doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    doc["properties"]["datetime"] = json!("1999-01-01T00:00:00Z");
    fs::write(&path, doc.to_string()).unwrap();

    let report = json_stdout(bin().arg("--json").arg("verify-tree").arg(root.join("catalog.json")));
    assert_eq!(report["ok"], false);
    assert_eq!(report["discrepancies"][0], "Item 'i3' has mismatched merkle:object_hash");
}

#[test]
fn prove_then_verify_proof() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    catalog(root);
    let computed = compute(root);
    let merkle_root = computed["merkle_root"].as_str().unwrap().to_string();

    let proof_file = root.join("i2.proof.json");
    bin()
        .arg("prove")
        .arg(root.join("merkle_tree.json"))
        .arg("i2")
        .arg("--out")
        .arg(&proof_file)
        .assert()
        .success();

    bin()
        .arg("verify-proof")
        .arg(&proof_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));

    bin()
        .arg("verify-proof")
        .arg(&proof_file)
        .arg("--merkle-root")
        .arg(&merkle_root)
        .assert()
        .success();

    bin()
        .arg("verify-proof")
        .arg(&proof_file)
        .arg("--merkle-root")
        .arg("ab".repeat(32))
        .assert()
        .failure();
}

#[test]
fn prove_unknown_node_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    catalog(root);
    compute(root);

    bin()
        .arg("prove")
        .arg(root.join("merkle_tree.json"))
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn compute_on_an_item_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("item.json");
    put(&path, item("x"));

    bin()
        .arg("compute")
        .arg(&path)
        .arg("--merkle-tree-file")
        .arg(dir.path().join("merkle_tree.json"))
        .assert()
        .failure();
    assert!(!dir.path().join("merkle_tree.json").exists());
}

#[test]
fn split_features_writes_items() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fc.geojson");
    let out_dir = dir.path().join("items");
    put(
        &input,
        json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": "a", "properties": {}},
                {"type": "Feature", "properties": {}}
            ]
        }),
    );

    bin()
        .arg("split-features")
        .arg(&input)
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Feature saved to"));

    assert!(out_dir.join("a.json").is_file());
    assert!(out_dir.join("feature_1.json").is_file());
}
