//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Transactions (UTXO model with ECDSA signatures)
//! - Blocks (header, body, canonical encodings)
//! - Blockchain (append-only chain from genesis)
//! - Proof service (audit-path construction)
//! - SPV support (headers-only light client)

pub mod block;
pub mod blockchain;
pub mod proof;
pub mod spv;
pub mod transaction;

pub use block::{Block, BlockBody, BlockHeader};
pub use blockchain::Blockchain;
pub use proof::ProofService;
pub use spv::{MerkleProof, SpvClient, SpvError};
pub use transaction::{Transaction, TransactionInput, TransactionOutput, UTXO};
