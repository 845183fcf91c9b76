use crate::constants::{GENESIS_INDEX, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::{LedgerError, Result};
use crate::pow::{self, Difficulty};
use crate::{Block, Transaction};

/// Append-only sequence of blocks, 1-indexed, always starting at genesis.
#[derive(Clone, Debug)]
pub struct Ledger {
    blocks: Vec<Block>,
    difficulty: Difficulty,
}

impl Ledger {
    pub fn new(difficulty: Difficulty) -> Self {
        let mut ledger = Self {
            blocks: Vec::new(),
            difficulty,
        };
        ledger.append_genesis();
        ledger
    }

    fn append_genesis(&mut self) {
        self.blocks.push(genesis_block());
    }

    pub fn last_block(&self) -> &Block {
        // Never empty: genesis is pushed on construction and `replace` only
        // ever receives validated, non-empty chains.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Builds the block that would extend the current tip with `proof`.
    pub fn next_block(&self, proof: u64, transactions: Vec<Transaction>) -> Block {
        let last = self.last_block();
        Block::new(last.index + 1, transactions, proof, last.hash())
    }

    /// Appends `block` if it extends the tip: next index, linked hash and a
    /// proof that solves the puzzle against the tip's proof.
    pub fn append(&mut self, block: Block) -> Result<()> {
        let last = self.last_block();
        let reject = |reason: String| LedgerError::BlockRejected {
            index: block.index,
            reason,
        };
        if block.index != last.index + 1 {
            return Err(reject(format!("expected index {}", last.index + 1)));
        }
        if block.previous_hash != last.hash() {
            return Err(reject("previous_hash does not match the tip".to_string()));
        }
        if !pow::valid(last.proof, block.proof, self.difficulty) {
            return Err(reject(format!(
                "proof {} does not solve the puzzle against {}",
                block.proof, last.proof
            )));
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Wholesale swap; callers validate `chain` first.
    pub(crate) fn replace(&mut self, chain: Vec<Block>) {
        if !chain.is_empty() {
            self.blocks = chain;
        }
    }
}

/// Index 1 with a sentinel previous hash and a placeholder proof.
pub fn genesis_block() -> Block {
    Block::new(GENESIS_INDEX, vec![], GENESIS_PROOF, GENESIS_PREVIOUS_HASH)
}
