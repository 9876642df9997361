//! Merkle tree computation over transaction digests
//!
//! Builds the root committing a block to its transactions, and constructs
//! the audit paths that let a headers-only client re-derive that root from
//! a single leaf. Both sides of the protocol use the same level-by-level
//! pairing, so the functions here are shared by the prover and verifier.
//!
//! All digests are lowercase hex strings; a parent is the SHA-256 of the
//! two child hex strings concatenated left-then-right. A level with an odd
//! count pairs its last element with a copy of itself. That duplication
//! rule lets certain duplicate-leaf inputs produce colliding trees; it is
//! kept as-is because every previously committed root depends on it.

use serde::{Deserialize, Serialize};

use super::hash::sha256_hex;

/// Side of the concatenation a proof sibling occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Orientation {
    Left,
    Right,
}

/// One level of an audit path: a sibling digest and the side it sits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub hash: String,
    #[serde(rename = "side")]
    pub orientation: Orientation,
}

/// Hash of two child digests, concatenated left-then-right.
fn hash_pair(left: &str, right: &str) -> String {
    sha256_hex(format!("{}{}", left, right).as_bytes())
}

/// Calculate the merkle root of an ordered sequence of leaf digests.
///
/// A single leaf is its own root. The empty sequence hashes the empty
/// string (only the genesis block has an empty body).
pub fn merkle_root(leaves: &[String]) -> String {
    if leaves.is_empty() {
        return sha256_hex(b"");
    }

    let mut level: Vec<String> = leaves.to_vec();

    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);

        for pair in level.chunks(2) {
            let left = &pair[0];
            // An unpaired last element is its own pair partner.
            let right = pair.get(1).unwrap_or(left);
            next.push(hash_pair(left, right));
        }

        level = next;
    }

    level.remove(0)
}

/// Construct the audit path for `target` within `leaves`.
///
/// Recomputes the tree level by level, tracking the digest on the route
/// from the target leaf to the root. At each level the partner of the
/// tracked digest is recorded along with the side it occupies, then the
/// tracked digest advances to the freshly computed parent.
///
/// A single-leaf sequence yields an empty path: the leaf is the root.
pub fn audit_path(leaves: &[String], target: &str) -> Vec<PathStep> {
    let mut path = Vec::new();
    let mut path_hash = target.to_string();

    let mut level: Vec<String> = leaves.to_vec();

    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);

        for pair in level.chunks(2) {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            let parent = hash_pair(left, right);

            if path_hash == *left {
                // A duplicated last element records itself as its sibling.
                path.push(PathStep {
                    hash: right.clone(),
                    orientation: Orientation::Right,
                });
                path_hash = parent.clone();
            } else if path_hash == *right {
                path.push(PathStep {
                    hash: left.clone(),
                    orientation: Orientation::Left,
                });
                path_hash = parent.clone();
            }

            next.push(parent);
        }

        level = next;
    }

    path
}

/// Recompute the root from a leaf digest and its audit path.
///
/// The orientation names the sibling's slot, so the running digest takes
/// the opposite one.
pub fn fold_path(leaf: &str, path: &[PathStep]) -> String {
    let mut computed = leaf.to_string();

    for step in path {
        computed = match step.orientation {
            Orientation::Left => hash_pair(&step.hash, &computed),
            Orientation::Right => hash_pair(&computed, &step.hash),
        };
    }

    computed
}
