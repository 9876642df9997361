//! SPV (Simplified Payment Verification) support
//!
//! A light client holds block header copies only, never transaction data.
//! When a freshly mined header arrives it asks a full node for the
//! transactions in that block paying its address, requests an audit path
//! for each, and re-derives the merkle root locally. Under correct
//! operation verification cannot fail; a mismatch means tampering or a
//! hashing bug and is surfaced as a hard error for the host to act on.

use std::sync::Mutex;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::block::BlockHeader;
use crate::crypto::merkle::{fold_path, PathStep};
use crate::network::{FullNode, HeaderSink};

/// SPV verification errors
#[derive(Error, Debug)]
pub enum SpvError {
    #[error("no local header at height {height}")]
    UnknownHeader { height: u64 },
    #[error("no proof available for expected transaction {tx_hash}")]
    ProofUnavailable { tx_hash: String },
    #[error(
        "merkle root mismatch for {tx_hash}: computed {computed}, local {local}, remote {remote}"
    )]
    RootMismatch {
        tx_hash: String,
        computed: String,
        local: String,
        remote: String,
    },
}

/// Proof that a transaction is committed by a block's merkle root.
///
/// This is the one structure that would cross the wire in a distributed
/// deployment, so it serializes to the request/response schema:
/// `{txHash, merkleRoot, height, path: [{hash, side}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Digest of the proven transaction
    #[serde(rename = "txHash")]
    pub tx_hash: String,
    /// Root claimed by the proving node
    #[serde(rename = "merkleRoot")]
    pub merkle_root: String,
    /// Height of the block containing the transaction
    pub height: u64,
    /// Sibling digests from leaf to root
    pub path: Vec<PathStep>,
}

/// A headers-only light client watching one address
#[derive(Debug)]
pub struct SpvClient {
    /// Address whose transactions this client verifies
    address: String,
    /// Owned header copies, index-aligned with chain height
    headers: Mutex<Vec<BlockHeader>>,
}

impl SpvClient {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            headers: Mutex::new(Vec::new()),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Number of headers received so far
    pub fn header_count(&self) -> usize {
        self.headers.lock().expect("header lock poisoned").len()
    }

    /// Store a header copy and verify the new block's relevant
    /// transactions against it.
    pub fn on_header(&self, header: BlockHeader, node: &dyn FullNode) -> Result<(), SpvError> {
        let height = {
            let mut headers = self.headers.lock().expect("header lock poisoned");
            headers.push(header);
            headers.len() as u64 - 1
        };
        self.verify_relevant_at(height, node)
    }

    /// Verify every transaction at `height` that pays this client's
    /// address. A transaction reported by the node is expected to be
    /// provable, so a missing proof is an invariant violation rather
    /// than a benign NotFound.
    fn verify_relevant_at(&self, height: u64, node: &dyn FullNode) -> Result<(), SpvError> {
        let relevant = node.transactions_for(height, &self.address);
        if relevant.is_empty() {
            debug!("[{}] nothing to verify at height {}", self.address, height);
            return Ok(());
        }

        info!(
            "[{}] verifying {} transaction(s) at height {}",
            self.address,
            relevant.len(),
            height
        );

        for tx in &relevant {
            let tx_hash = tx.hash();
            let proof = node
                .build_proof(&tx_hash)
                .ok_or(SpvError::ProofUnavailable {
                    tx_hash: tx_hash.clone(),
                })?;
            self.verify(&proof)?;
            info!("[{}] verified {}", self.address, tx_hash);
        }

        Ok(())
    }

    /// Re-derive the root from the proof and compare it against both the
    /// local header at the proof's height and the root the proving node
    /// claimed. The remote comparison guards against a tampered response
    /// even when the local header already matches.
    pub fn verify(&self, proof: &MerkleProof) -> Result<(), SpvError> {
        let local_root = {
            let headers = self.headers.lock().expect("header lock poisoned");
            headers
                .get(proof.height as usize)
                .map(|h| h.merkle_root.clone())
                .ok_or(SpvError::UnknownHeader {
                    height: proof.height,
                })?
        };

        let computed = fold_path(&proof.tx_hash, &proof.path);

        if computed == local_root && computed == proof.merkle_root {
            Ok(())
        } else {
            Err(SpvError::RootMismatch {
                tx_hash: proof.tx_hash.clone(),
                computed,
                local: local_root,
                remote: proof.merkle_root.clone(),
            })
        }
    }
}

impl HeaderSink for SpvClient {
    fn accept_header(&self, header: BlockHeader, node: &dyn FullNode) -> Result<(), SpvError> {
        self.on_header(header, node)
    }
}
