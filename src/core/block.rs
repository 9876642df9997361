//! Block structures for the ledger
//!
//! A block pairs a header (previous hash, merkle root, nonce) with a body
//! carrying the merkle root and the transaction batch it commits to. The
//! block hash is the SHA-256 of the canonical header-then-body encoding;
//! mining varies only the nonce until that hash meets the difficulty
//! prefix.

use serde::{Deserialize, Serialize};

use crate::core::transaction::Transaction;
use crate::crypto::hash::sha256_hex;
use crate::crypto::merkle::merkle_root;

/// Block header: the only part light clients ever hold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    /// Hash of the previous block
    pub previous_hash: String,
    /// Merkle root of the block's transactions
    pub merkle_root: String,
    /// Nonce varied during mining; immutable once the block is solved
    pub nonce: u64,
}

impl BlockHeader {
    /// Canonical encoding: `header{prev=<hash>|root=<root>|nonce=<n>}`.
    /// Part of the block digest format.
    pub fn canonical(&self) -> String {
        format!(
            "header{{prev={}|root={}|nonce={}}}",
            self.previous_hash, self.merkle_root, self.nonce
        )
    }
}

/// Block body: the transaction batch and the root committing to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockBody {
    /// Merkle root over the batch's leaf digests, in batch order
    pub merkle_root: String,
    /// The committed transaction batch
    pub transactions: Vec<Transaction>,
}

impl BlockBody {
    /// Build a body from a batch, computing the root over the batch's
    /// leaf digests in order.
    pub fn from_batch(transactions: Vec<Transaction>) -> Self {
        let leaves: Vec<String> = transactions.iter().map(|tx| tx.hash()).collect();
        Self {
            merkle_root: merkle_root(&leaves),
            transactions,
        }
    }

    /// Leaf digests of the batch, in batch order
    pub fn leaf_hashes(&self) -> Vec<String> {
        self.transactions.iter().map(|tx| tx.hash()).collect()
    }

    /// Canonical encoding: `body{root=<root>|txs=<tx canonicals>}`
    pub fn canonical(&self) -> String {
        let txs = self
            .transactions
            .iter()
            .map(|tx| tx.canonical())
            .collect::<Vec<_>>()
            .join(",");
        format!("body{{root={}|txs={}}}", self.merkle_root, txs)
    }
}

/// A block in the chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub body: BlockBody,
}

impl Block {
    pub fn new(header: BlockHeader, body: BlockBody) -> Self {
        Self { header, body }
    }

    /// Canonical encoding of header then body
    pub fn canonical(&self) -> String {
        format!("{}{}", self.header.canonical(), self.body.canonical())
    }

    /// Block identity: digest of the canonical encoding
    pub fn hash(&self) -> String {
        sha256_hex(self.canonical().as_bytes())
    }

    /// The fixed origin block: empty body, all-zero previous hash,
    /// zero nonce. Never mined and never proof-queried.
    pub fn genesis() -> Self {
        let body = BlockBody::from_batch(Vec::new());
        let header = BlockHeader {
            previous_hash: "0".repeat(64),
            merkle_root: body.merkle_root.clone(),
            nonce: 0,
        };
        Self { header, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::TransactionOutput;
    use crate::crypto::keys::KeyPair;
    use crate::crypto::merkle::merkle_root;

    fn signed_tx(recipient: &str) -> Transaction {
        Transaction::new(
            vec![],
            vec![TransactionOutput {
                amount: 10,
                recipient: recipient.to_string(),
            }],
            &KeyPair::generate(),
        )
        .unwrap()
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis();
        assert_eq!(genesis.header.previous_hash, "0".repeat(64));
        assert_eq!(genesis.header.nonce, 0);
        assert!(genesis.body.transactions.is_empty());
        assert_eq!(genesis.header.merkle_root, genesis.body.merkle_root);
    }

    #[test]
    fn test_body_root_matches_batch() {
        let batch = vec![signed_tx("a"), signed_tx("b"), signed_tx("c")];
        let leaves: Vec<String> = batch.iter().map(|tx| tx.hash()).collect();
        let body = BlockBody::from_batch(batch);
        assert_eq!(body.merkle_root, merkle_root(&leaves));
        assert_eq!(body.leaf_hashes(), leaves);
    }

    #[test]
    fn test_single_transaction_body_root_is_leaf() {
        let tx = signed_tx("a");
        let leaf = tx.hash();
        let body = BlockBody::from_batch(vec![tx]);
        assert_eq!(body.merkle_root, leaf);
    }

    #[test]
    fn test_nonce_changes_block_hash() {
        let body = BlockBody::from_batch(vec![signed_tx("a")]);
        let header = BlockHeader {
            previous_hash: "0".repeat(64),
            merkle_root: body.merkle_root.clone(),
            nonce: 1,
        };
        let block = Block::new(header, body);

        let mut other = block.clone();
        other.header.nonce = 2;
        assert_ne!(block.hash(), other.hash());
    }
}
