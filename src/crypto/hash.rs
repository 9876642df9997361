//! Cryptographic hashing utilities for the ledger
//!
//! Provides the SHA-256 digests used for transaction identities, merkle
//! nodes, and block hashes, plus the difficulty predicate for mining.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Checks if a hex-encoded hash meets the difficulty target.
/// A block is solved when its hash starts with the configured hex prefix;
/// an empty prefix accepts every hash.
pub fn has_difficulty_prefix(hash_hex: &str, prefix: &str) -> bool {
    hash_hex.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha256_deterministic() {
        assert_eq!(sha256_hex(b"tx"), sha256_hex(b"tx"));
        assert_ne!(sha256_hex(b"tx"), sha256_hex(b"ty"));
    }

    #[test]
    fn test_difficulty_prefix() {
        assert!(has_difficulty_prefix("0000ab3f", "0000"));
        assert!(!has_difficulty_prefix("0001ab3f", "0000"));
        assert!(has_difficulty_prefix("0001ab3f", "000"));
    }

    #[test]
    fn test_empty_prefix_accepts_everything() {
        assert!(has_difficulty_prefix("ffffffff", ""));
        assert!(has_difficulty_prefix("", ""));
    }
}
