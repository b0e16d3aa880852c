//! Merkle reduction over hex digests.
//!
//! Construction:
//! - the digest list is ordered per the hash method (`ascending`, `descending`, `unsorted`)
//! - each level is scanned left to right in non-overlapping pairs
//! - parent = H(decode(left) || decode(right))
//! - an odd level pairs its last digest with itself
//! - repeat until one digest remains
//!
//! The odd-node rule changes the root value, so any other implementation must
//! duplicate the last digest the same way to agree on roots.

use tracing::debug;

use crate::errors::MerkleResult;
use crate::hash::{decode_digest, HashFunction};
use crate::method::HashMethod;
use crate::proof::{Position, ProofStep};

/// Root of an empty digest list.
pub const EMPTY_ROOT: &str = "";

/// Reduce a list of digests to a single root.
///
/// The method is resolved before anything else, so an unsupported function or
/// ordering fails even for an empty list. An empty list yields [`EMPTY_ROOT`].
pub fn merkle_root(digests: &[String], method: &HashMethod) -> MerkleResult<String> {
    let function = method.hash_function()?;
    let ordering = method.ordering()?;

    if digests.is_empty() {
        debug!("empty digest list, returning empty root");
        return Ok(EMPTY_ROOT.to_string());
    }

    let mut ordered = digests.to_vec();
    ordering.apply(&mut ordered);
    debug!(count = ordered.len(), %ordering, %function, "reducing digests");

    let mut level = decode_all(&ordered)?;
    while level.len() > 1 {
        level = next_level(function, &level);
        debug!(width = level.len(), "reduced level");
    }

    Ok(hex::encode(&level[0]))
}

/// Sibling path from one digest to the root of `digests`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerklePath {
    pub leaf: String,
    pub steps: Vec<ProofStep>,
    pub root: String,
}

/// Build the sibling path for `target` inside the reduction of `digests`.
///
/// The first occurrence of `target` in the ordered list is used. Returns `None`
/// when `target` is not one of the digests.
pub fn inclusion_path(
    digests: &[String],
    target: &str,
    method: &HashMethod,
) -> MerkleResult<Option<MerklePath>> {
    let function = method.hash_function()?;
    let ordering = method.ordering()?;

    let mut ordered = digests.to_vec();
    ordering.apply(&mut ordered);

    let Some(mut idx) = ordered.iter().position(|d| d == target) else {
        return Ok(None);
    };

    let mut level = decode_all(&ordered)?;
    let mut steps = Vec::new();

    while level.len() > 1 {
        let step = if idx % 2 == 0 {
            let sibling = level.get(idx + 1).unwrap_or(&level[idx]);
            ProofStep::new(hex::encode(sibling), Position::Right)
        } else {
            ProofStep::new(hex::encode(&level[idx - 1]), Position::Left)
        };
        steps.push(step);

        level = next_level(function, &level);
        idx /= 2;
    }

    Ok(Some(MerklePath {
        leaf: target.to_string(),
        steps,
        root: hex::encode(&level[0]),
    }))
}

fn decode_all(digests: &[String]) -> MerkleResult<Vec<Vec<u8>>> {
    digests.iter().map(|d| decode_digest(d)).collect()
}

fn next_level(function: HashFunction, level: &[Vec<u8>]) -> Vec<Vec<u8>> {
    level
        .chunks(2)
        .map(|pair| {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            let mut buf = Vec::with_capacity(left.len() + right.len());
            buf.extend_from_slice(left);
            buf.extend_from_slice(right);
            function.digest(&buf)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MerkleError;
    use crate::method::{DigestOrdering, FieldSelection};
    use assert_matches::assert_matches;

    fn method(ordering: &str) -> HashMethod {
        let mut m = HashMethod::new(
            HashFunction::Sha256,
            FieldSelection::Wildcard,
            DigestOrdering::Ascending,
        );
        m.ordering = ordering.to_string();
        m
    }

    fn h(s: &str) -> String {
        HashFunction::Sha256.digest_hex(s.as_bytes())
    }

    fn pair(l: &str, r: &str) -> String {
        HashFunction::Sha256.combine_hex(l, r).unwrap()
    }

    #[test]
    fn empty_list_yields_sentinel() {
        assert_eq!(merkle_root(&[], &method("ascending")).unwrap(), EMPTY_ROOT);
    }

    #[test]
    fn single_digest_is_its_own_root() {
        let a = h("a");
        assert_eq!(merkle_root(&[a.clone()], &method("ascending")).unwrap(), a);
    }

    #[test]
    fn odd_levels_duplicate_last() {
        // 5 leaves: widths 5 -> 3 -> 2 -> 1, with duplication at widths 5 and 3.
        let leaves: Vec<String> = ["1", "2", "3", "4", "5"].iter().map(|s| h(s)).collect();
        let l1 = vec![
            pair(&leaves[0], &leaves[1]),
            pair(&leaves[2], &leaves[3]),
            pair(&leaves[4], &leaves[4]),
        ];
        let l2 = vec![pair(&l1[0], &l1[1]), pair(&l1[2], &l1[2])];
        let expected = pair(&l2[0], &l2[1]);
        assert_eq!(merkle_root(&leaves, &method("unsorted")).unwrap(), expected);
    }

    #[test]
    fn unsorted_depends_on_order_ascending_does_not() {
        let a = vec![h("a"), h("b"), h("c")];
        let b = vec![h("c"), h("a"), h("b")];
        assert_ne!(
            merkle_root(&a, &method("unsorted")).unwrap(),
            merkle_root(&b, &method("unsorted")).unwrap()
        );
        assert_eq!(
            merkle_root(&a, &method("ascending")).unwrap(),
            merkle_root(&b, &method("ascending")).unwrap()
        );
        assert_eq!(
            merkle_root(&a, &method("descending")).unwrap(),
            merkle_root(&b, &method("descending")).unwrap()
        );
    }

    #[test]
    fn unsupported_ordering_fails() {
        assert_matches!(
            merkle_root(&[h("a")], &method("random")),
            Err(MerkleError::UnsupportedOrdering(_))
        );
    }

    #[test]
    fn unsupported_function_fails() {
        let mut m = method("ascending");
        m.function = "whirlpool".to_string();
        assert_matches!(
            merkle_root(&[h("a"), h("b")], &m),
            Err(MerkleError::UnsupportedHashFunction(_))
        );
    }

    #[test]
    fn bad_hex_fails() {
        assert_matches!(
            merkle_root(&["not-hex".to_string()], &method("ascending")),
            Err(MerkleError::MalformedDigest(_))
        );
    }

    #[test]
    fn path_reaches_root_for_every_leaf() {
        let leaves: Vec<String> = ["q", "w", "e", "r", "t", "y", "u"].iter().map(|s| h(s)).collect();
        let m = method("ascending");
        let root = merkle_root(&leaves, &m).unwrap();
        for leaf in &leaves {
            let path = inclusion_path(&leaves, leaf, &m).unwrap().unwrap();
            assert_eq!(path.root, root);

            let mut cur = leaf.clone();
            for step in &path.steps {
                cur = match step.position {
                    Position::Left => pair(&step.hash, &cur),
                    Position::Right => pair(&cur, &step.hash),
                };
            }
            assert_eq!(cur, root);
        }
    }

    #[test]
    fn path_for_unknown_target_is_none() {
        let leaves = vec![h("a")];
        assert!(inclusion_path(&leaves, &h("z"), &method("ascending"))
            .unwrap()
            .is_none());
    }
}
