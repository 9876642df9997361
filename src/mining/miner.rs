//! Mining engine
//!
//! Each cycle the miner takes a full batch from the pool, re-verifies
//! every signature, builds the block body with its merkle root, and
//! searches for a nonce whose block hash carries the difficulty prefix.
//! The nonce is redrawn uniformly at random on every failed attempt
//! rather than incremented; any satisfying value is acceptable, and the
//! search is unbounded. The solved block is appended to the chain and
//! its header (never the body) is broadcast to every registered client.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use rand::Rng;
use thiserror::Error;

use crate::core::block::{Block, BlockBody, BlockHeader};
use crate::core::transaction::Transaction;
use crate::crypto::hash::has_difficulty_prefix;
use crate::crypto::keys::KeyError;
use crate::network::Network;

/// Default hex prefix a solved block hash must start with
pub const DEFAULT_DIFFICULTY_PREFIX: &str = "0000";

/// Batch validation errors. Any bad transaction rejects the whole batch;
/// the host decides whether to log, alert, or shut down.
#[derive(Error, Debug)]
pub enum MinerError {
    #[error("invalid signature on transaction {tx_hash}")]
    InvalidSignature { tx_hash: String },
    #[error("signature check failed for transaction {tx_hash}: {source}")]
    SignatureCheck {
        tx_hash: String,
        #[source]
        source: KeyError,
    },
}

/// Effort spent solving one block
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of digest attempts, including the successful one
    pub attempts: u64,
    /// Wall time of the search in milliseconds
    pub time_ms: u128,
}

/// The single block producer
pub struct Miner {
    network: Arc<Network>,
    difficulty_prefix: String,
}

impl Miner {
    pub fn new(network: Arc<Network>, difficulty_prefix: &str) -> Self {
        Self {
            network,
            difficulty_prefix: difficulty_prefix.to_string(),
        }
    }

    /// Drive full mining cycles until `blocks` have been appended:
    /// wait for a full pool, validate, build, search, append, broadcast.
    /// A rejected batch is dropped and does not count; no state carries
    /// over between cycles.
    pub fn run(&self, blocks: u64) {
        let mut mined = 0;
        while mined < blocks {
            let batch = self.network.pool().drain_full();
            match self.mine_batch(batch) {
                Ok((block, stats)) => {
                    mined += 1;
                    info!(
                        "block {} of {} solved: {} ({} attempts, {}ms)",
                        mined,
                        blocks,
                        block.hash(),
                        stats.attempts,
                        stats.time_ms
                    );
                }
                Err(e) => warn!("batch rejected: {}", e),
            }
        }
    }

    /// Mine one block from a batch: verify signatures, commit the batch
    /// under a merkle root, solve the proof of work, append the block,
    /// and broadcast its header.
    pub fn mine_batch(&self, batch: Vec<Transaction>) -> Result<(Block, MiningStats), MinerError> {
        self.check_batch(&batch)?;

        let body = BlockBody::from_batch(batch);
        let previous_hash = {
            let chain = self.network.chain().read().expect("chain lock poisoned");
            chain.latest_block().hash()
        };

        let mut block = Block::new(
            BlockHeader {
                previous_hash,
                merkle_root: body.merkle_root.clone(),
                nonce: random_nonce(),
            },
            body,
        );

        info!(
            "mining over root {} against prefix {:?}",
            block.header.merkle_root, self.difficulty_prefix
        );

        let start = Instant::now();
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            let hash = block.hash();
            if has_difficulty_prefix(&hash, &self.difficulty_prefix) {
                info!("solved block {} after {} attempts", hash, attempts);
                break;
            }
            block.header.nonce = random_nonce();
        }
        let stats = MiningStats {
            attempts,
            time_ms: start.elapsed().as_millis(),
        };

        {
            let mut chain = self.network.chain().write().expect("chain lock poisoned");
            chain.append(block.clone());
        }

        self.network.broadcast_header(&block.header);

        Ok((block, stats))
    }

    /// Re-verify every signature in the batch; any failure is fatal for
    /// the whole batch, never for the process.
    fn check_batch(&self, batch: &[Transaction]) -> Result<(), MinerError> {
        for tx in batch {
            let valid = tx.verify_signature().map_err(|source| MinerError::SignatureCheck {
                tx_hash: tx.hash(),
                source,
            })?;
            if !valid {
                return Err(MinerError::InvalidSignature { tx_hash: tx.hash() });
            }
        }
        Ok(())
    }
}

/// Uniform random 63-bit non-negative nonce. The initial value carries no
/// meaning; only the search over redraws does.
fn random_nonce() -> u64 {
    rand::thread_rng().gen::<u64>() >> 1
}
