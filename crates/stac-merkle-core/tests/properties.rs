//! properties.rs
//!
//! Property tests for object hashing and Merkle reduction.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use stac_merkle_core::prelude::*;

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 éß\u{1F600}]{0,12}".prop_map(Value::from),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    leaf_value().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn document() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z_]{1,8}", json_value(), 1..6)
        .prop_map(|m| m.into_iter().collect())
}

fn digests() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(any::<[u8; 32]>().prop_map(hex::encode), 1..12)
}

proptest! {
    #[test]
    fn hashing_is_deterministic(doc in document()) {
        let method = HashMethod::system_default();
        let v = Value::Object(doc);
        prop_assert_eq!(object_hash(&v, &method).unwrap(), object_hash(&v, &method).unwrap());
    }

    #[test]
    fn key_order_does_not_matter(doc in document()) {
        let method = HashMethod::system_default();
        let forward = Value::Object(doc.clone());
        let reversed: Map<String, Value> = doc.into_iter().rev().collect();
        prop_assert_eq!(
            object_hash(&forward, &method).unwrap(),
            object_hash(&Value::Object(reversed), &method).unwrap()
        );
    }

    #[test]
    fn reserved_fields_do_not_matter(doc in document(), junk in "[0-9a-f]{8}") {
        let method = HashMethod::system_default();
        let plain = Value::Object(doc.clone());

        let mut annotated = doc;
        annotated.insert("merkle:object_hash".to_string(), json!(junk.clone()));
        annotated.insert("merkle:root".to_string(), json!(junk));
        annotated.insert("merkle:hash_method".to_string(), json!({"function": "md5"}));

        prop_assert_eq!(
            object_hash(&plain, &method).unwrap(),
            object_hash(&Value::Object(annotated), &method).unwrap()
        );
    }

    #[test]
    fn sorted_reduction_ignores_input_order(mut list in digests()) {
        for ordering in [DigestOrdering::Ascending, DigestOrdering::Descending] {
            let method = HashMethod::new(HashFunction::Sha256, FieldSelection::Wildcard, ordering);
            let before = merkle_root(&list, &method).unwrap();
            list.reverse();
            prop_assert_eq!(before, merkle_root(&list, &method).unwrap());
        }
    }

    #[test]
    fn every_leaf_has_a_verifying_path(list in digests(), pick in any::<prop::sample::Index>()) {
        let method = HashMethod::system_default();
        let target = pick.get(&list).clone();
        let path = inclusion_path(&list, &target, &method).unwrap().unwrap();
        prop_assert_eq!(&path.root, &merkle_root(&list, &method).unwrap());

        let hashes: Vec<String> = path.steps.iter().map(|s| s.hash.clone()).collect();
        let positions: Vec<String> = path.steps.iter().map(|s| s.position.to_string()).collect();
        prop_assert!(verify_proof(&target, &hashes, &positions, &path.root, "sha256").unwrap());
    }
}
