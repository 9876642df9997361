//! A minimal proof-of-work UTXO ledger with SPV proofs
//!
//! This crate provides the consensus and verification core of a
//! single-producer chain:
//! - Merkle commitment over transaction batches
//! - Proof-of-work mining with a random-nonce search
//! - A bounded transaction pool rendezvousing producers with the miner
//! - Audit-path construction for inclusion proofs
//! - Headers-only SPV clients verifying those proofs locally
//!
//! # Example
//!
//! ```rust
//! use pow_ledger::crypto::hash::sha256_hex;
//! use pow_ledger::crypto::merkle::{audit_path, fold_path, merkle_root};
//!
//! let leaves: Vec<String> = ["a", "b", "c", "d"]
//!     .iter()
//!     .map(|t| sha256_hex(t.as_bytes()))
//!     .collect();
//!
//! let root = merkle_root(&leaves);
//! let path = audit_path(&leaves, &leaves[2]);
//! assert_eq!(fold_path(&leaves[2], &path), root);
//! ```

pub mod core;
pub mod crypto;
pub mod mining;
pub mod network;
pub mod wallet;

// Re-export commonly used types
pub use crate::core::{
    Block, BlockBody, BlockHeader, Blockchain, MerkleProof, ProofService, SpvClient, SpvError,
    Transaction, TransactionInput, TransactionOutput, UTXO,
};
pub use crate::crypto::KeyPair;
pub use crate::mining::{
    Miner, MinerError, MiningStats, TransactionPool, DEFAULT_BATCH_CAPACITY,
    DEFAULT_DIFFICULTY_PREFIX,
};
pub use crate::network::{FullNode, HeaderSink, Network};
pub use crate::wallet::Wallet;
