//! Chain management
//!
//! An append-only sequence of blocks starting from the genesis block.
//! The chain performs no validation of its own: the miner is its only
//! writer and has already checked the batch, built the root, and solved
//! the proof of work before appending.

use serde::{Deserialize, Serialize};

use crate::core::block::Block;

/// The append-only block chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blockchain {
    blocks: Vec<Block>,
}

impl Blockchain {
    /// Create a new chain holding only the genesis block
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// Get the latest block
    pub fn latest_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("chain always holds at least the genesis block")
    }

    /// Get a block by height (zero-based, genesis at 0)
    pub fn block_at(&self, height: u64) -> Option<&Block> {
        self.blocks.get(height as usize)
    }

    /// All blocks in order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Height of the chain tip (genesis is height 0)
    pub fn height(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    /// Append a solved block
    pub fn append(&mut self, block: Block) {
        self.blocks.push(block);
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::{BlockBody, BlockHeader};

    fn next_block(chain: &Blockchain) -> Block {
        let body = BlockBody::from_batch(Vec::new());
        let header = BlockHeader {
            previous_hash: chain.latest_block().hash(),
            merkle_root: body.merkle_root.clone(),
            nonce: 7,
        };
        Block::new(header, body)
    }

    #[test]
    fn test_new_chain_has_genesis() {
        let chain = Blockchain::new();
        assert_eq!(chain.height(), 0);
        assert_eq!(chain.latest_block().header.previous_hash, "0".repeat(64));
    }

    #[test]
    fn test_append_advances_tip() {
        let mut chain = Blockchain::new();
        let block = next_block(&chain);
        let block_hash = block.hash();

        chain.append(block);

        assert_eq!(chain.height(), 1);
        assert_eq!(chain.latest_block().hash(), block_hash);
        assert_eq!(chain.blocks().len(), 2);
    }

    #[test]
    fn test_block_at() {
        let mut chain = Blockchain::new();
        chain.append(next_block(&chain));

        assert!(chain.block_at(0).is_some());
        assert!(chain.block_at(1).is_some());
        assert!(chain.block_at(2).is_none());
    }
}
