//! Cryptographic primitives for the ledger
//!
//! This module provides:
//! - SHA-256 hashing and the mining difficulty predicate
//! - ECDSA key management (secp256k1)
//! - Merkle root and audit-path construction

pub mod hash;
pub mod keys;
pub mod merkle;

pub use hash::{has_difficulty_prefix, sha256, sha256_hex};
pub use keys::{
    public_key_from_hex, public_key_to_address, sign_payload, verify_payload, KeyError, KeyPair,
};
pub use merkle::{audit_path, fold_path, merkle_root, Orientation, PathStep};
