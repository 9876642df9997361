//! Audit-path construction for SPV requests
//!
//! The proof service answers "prove transaction X is mined" on behalf of
//! a full node. It locates the transaction by digest with a linear scan
//! from the genesis block upward, then rebuilds the containing block's
//! merkle tree to extract the sibling path. The scan is read-only, so
//! repeated requests for the same digest yield identical proofs.

use std::sync::{Arc, RwLock};

use log::debug;

use crate::core::blockchain::Blockchain;
use crate::core::spv::MerkleProof;
use crate::crypto::merkle::audit_path;

/// Builds inclusion proofs against a shared chain
pub struct ProofService {
    chain: Arc<RwLock<Blockchain>>,
}

impl ProofService {
    pub fn new(chain: Arc<RwLock<Blockchain>>) -> Self {
        Self { chain }
    }

    /// Build the audit path for a transaction digest, or `None` if no
    /// block contains it. The proof's root is the one stored in the
    /// containing block's header, not a recomputation.
    pub fn build_proof(&self, tx_hash: &str) -> Option<MerkleProof> {
        let chain = self.chain.read().expect("chain lock poisoned");

        for (height, block) in chain.blocks().iter().enumerate() {
            let leaves = block.body.leaf_hashes();
            if leaves.iter().any(|leaf| leaf == tx_hash) {
                return Some(MerkleProof {
                    tx_hash: tx_hash.to_string(),
                    merkle_root: block.header.merkle_root.clone(),
                    height: height as u64,
                    path: audit_path(&leaves, tx_hash),
                });
            }
        }

        debug!("no block contains transaction {}", tx_hash);
        None
    }
}
