//! Object hashing: the digest of one document's own content.

use serde_json::Value;

use crate::canonical::canonicalize_document;
use crate::errors::MerkleResult;
use crate::method::HashMethod;

/// Compute `merkle:object_hash` for a document.
///
/// Selects fields per `method.fields`, strips reserved keys, encodes canonically
/// and hashes with `method.function`. Returns lowercase hex.
pub fn object_hash(document: &Value, method: &HashMethod) -> MerkleResult<String> {
    let function = method.hash_function()?;
    let bytes = canonicalize_document(document, method);
    Ok(function.digest_hex(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MerkleError;
    use crate::hash::HashFunction;
    use crate::method::{DigestOrdering, FieldSelection};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn method(function: &str, fields: FieldSelection) -> HashMethod {
        let mut m = HashMethod::new(HashFunction::Sha256, fields, DigestOrdering::Ascending);
        m.function = function.to_string();
        m
    }

    #[test]
    fn merkle_fields_do_not_contribute() {
        let doc = json!({
            "id": "test-object",
            "merkle:object_hash": "should be excluded",
            "merkle:hash_method": "should be excluded",
            "merkle:root": "should be excluded",
            "other_field": "value"
        });
        let m = method("sha256", FieldSelection::Wildcard);
        let expected =
            HashFunction::Sha256.digest_hex(br#"{"id":"test-object","other_field":"value"}"#);
        assert_eq!(object_hash(&doc, &m).unwrap(), expected);
    }

    #[test]
    fn selected_fields_are_stripped_too() {
        let doc = json!({
            "type": "Feature",
            "id": "test-item",
            "properties": {
                "other_property": "value",
                "datetime": "2024-10-15T12:00:00Z",
                "merkle:object_hash": "should be excluded"
            },
            "geometry": {},
            "links": []
        });
        let m = method(
            "sha256",
            FieldSelection::Named(vec!["id".to_string(), "properties".to_string()]),
        );
        let expected = HashFunction::Sha256.digest_hex(
            br#"{"id":"test-item","properties":{"datetime":"2024-10-15T12:00:00Z","other_property":"value"}}"#,
        );
        assert_eq!(object_hash(&doc, &m).unwrap(), expected);
    }

    #[test]
    fn missing_fields_hash_the_empty_object() {
        let doc = json!({"id": "test-object", "some_field": "some value"});
        let m = method(
            "sha256",
            FieldSelection::Named(vec!["non_existent_field".to_string()]),
        );
        assert_eq!(
            object_hash(&doc, &m).unwrap(),
            HashFunction::Sha256.digest_hex(b"{}")
        );
    }

    #[test]
    fn each_registered_function_is_used() {
        let doc = json!({"id": "test-object"});
        for name in ["sha256", "md5", "sha1", "sha512"] {
            let m = method(name, FieldSelection::Wildcard);
            let f = HashFunction::parse(name).unwrap();
            assert_eq!(
                object_hash(&doc, &m).unwrap(),
                f.digest_hex(br#"{"id":"test-object"}"#)
            );
        }
    }

    #[test]
    fn unsupported_function_fails() {
        let m = method("unsupported-hash", FieldSelection::Wildcard);
        assert_matches!(
            object_hash(&json!({"id": "x"}), &m),
            Err(MerkleError::UnsupportedHashFunction(_))
        );
    }

    #[test]
    fn input_is_not_mutated() {
        let doc = json!({"id": "x", "merkle:root": "r"});
        let before = doc.clone();
        object_hash(&doc, &HashMethod::system_default()).unwrap();
        assert_eq!(doc, before);
    }
}
