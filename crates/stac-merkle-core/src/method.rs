//! The `merkle:hash_method` object.
//!
//! A hash method is attached to a Collection or Catalog (or inherited from its
//! parent) and says how object hashes and roots are computed below it. The wire
//! form is kept as close to what was read as possible: `function` and `ordering`
//! stay text so that an unknown value surfaces as the matching error when it is
//! used, and unknown keys survive a read/write cycle.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{MerkleError, MerkleResult};
use crate::hash::HashFunction;

/// Wildcard sentinel for `fields`.
pub const WILDCARD: &str = "*";

/// Legacy spelling of the wildcard.
pub const WILDCARD_ALL: &str = "all";

/// Which top-level fields of a document take part in its object hash.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum FieldSelection {
    #[default]
    Wildcard,
    Named(Vec<String>),
}

impl From<Vec<String>> for FieldSelection {
    fn from(fields: Vec<String>) -> Self {
        match fields.as_slice() {
            [one] if one == WILDCARD || one == WILDCARD_ALL => FieldSelection::Wildcard,
            _ => FieldSelection::Named(fields),
        }
    }
}

impl From<FieldSelection> for Vec<String> {
    fn from(sel: FieldSelection) -> Self {
        match sel {
            FieldSelection::Wildcard => vec![WILDCARD.to_string()],
            FieldSelection::Named(fields) => fields,
        }
    }
}

/// Sort policy applied to sibling digests before reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestOrdering {
    Ascending,
    Descending,
    Unsorted,
}

impl DigestOrdering {
    pub fn parse(s: &str) -> MerkleResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ascending" => Ok(Self::Ascending),
            "descending" => Ok(Self::Descending),
            "unsorted" => Ok(Self::Unsorted),
            _ => Err(MerkleError::UnsupportedOrdering(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::Unsorted => "unsorted",
        }
    }

    /// Apply the policy in place.
    pub fn apply(&self, digests: &mut [String]) {
        match self {
            Self::Ascending => digests.sort(),
            Self::Descending => digests.sort_by(|a, b| b.cmp(a)),
            Self::Unsorted => {}
        }
    }
}

impl fmt::Display for DigestOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_function() -> String {
    "sha256".to_string()
}

fn default_ordering() -> String {
    "ascending".to_string()
}

/// A hash method as persisted under `merkle:hash_method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashMethod {
    #[serde(default = "default_function")]
    pub function: String,

    #[serde(default)]
    pub fields: FieldSelection,

    #[serde(default = "default_ordering")]
    pub ordering: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Keys this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HashMethod {
    pub fn new(function: HashFunction, fields: FieldSelection, ordering: DigestOrdering) -> Self {
        Self {
            function: function.as_str().to_string(),
            fields,
            ordering: ordering.as_str().to_string(),
            description: None,
            extra: Map::new(),
        }
    }

    /// The method used for a root catalog that does not declare one.
    pub fn system_default() -> Self {
        Self::new(
            HashFunction::Sha256,
            FieldSelection::Wildcard,
            DigestOrdering::Ascending,
        )
        .with_description(
            "Computed by including the merkle:root of collections and the catalog's own merkle:object_hash.",
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn hash_function(&self) -> MerkleResult<HashFunction> {
        HashFunction::parse(&self.function)
    }

    pub fn ordering(&self) -> MerkleResult<DigestOrdering> {
        DigestOrdering::parse(&self.ordering)
    }

    /// Check that both the function and the ordering resolve.
    pub fn validate(&self) -> MerkleResult<()> {
        self.hash_function()?;
        self.ordering()?;
        Ok(())
    }

    pub fn from_value(value: &Value) -> MerkleResult<Self> {
        if !value.is_object() {
            return Err(MerkleError::serialization(
                "merkle:hash_method must be an object",
            ));
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Default for HashMethod {
    fn default() -> Self {
        Self::system_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn missing_keys_take_defaults() {
        let m = HashMethod::from_value(&json!({})).unwrap();
        assert_eq!(m.function, "sha256");
        assert_eq!(m.fields, FieldSelection::Wildcard);
        assert_eq!(m.ordering().unwrap(), DigestOrdering::Ascending);
    }

    #[test]
    fn wildcard_spellings() {
        let a: FieldSelection = serde_json::from_value(json!(["*"])).unwrap();
        let b: FieldSelection = serde_json::from_value(json!(["all"])).unwrap();
        assert_eq!(a, FieldSelection::Wildcard);
        assert_eq!(b, FieldSelection::Wildcard);
        assert_eq!(serde_json::to_value(&a).unwrap(), json!(["*"]));

        let named: FieldSelection = serde_json::from_value(json!(["id", "*"])).unwrap();
        assert_eq!(
            named,
            FieldSelection::Named(vec!["id".to_string(), "*".to_string()])
        );
    }

    #[test]
    fn unknown_keys_round_trip() {
        let v = json!({
            "function": "SHA-256",
            "fields": ["id"],
            "ordering": "unsorted",
            "description": "d",
            "x-note": {"k": 1}
        });
        let m = HashMethod::from_value(&v).unwrap();
        assert_eq!(m.to_value(), v);
    }

    #[test]
    fn ordering_is_resolved_lazily() {
        let m = HashMethod::from_value(&json!({"ordering": "random"})).unwrap();
        assert_matches!(m.ordering(), Err(MerkleError::UnsupportedOrdering(o)) if o == "random");
        assert!(m.validate().is_err());
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(HashMethod::from_value(&json!("should be excluded")).is_err());
    }

    #[test]
    fn descending_sorts_reverse() {
        let mut v = vec!["a".to_string(), "c".to_string(), "b".to_string()];
        DigestOrdering::Descending.apply(&mut v);
        assert_eq!(v, vec!["c", "b", "a"]);
    }
}
