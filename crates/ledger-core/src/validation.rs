//! Integrity checks for candidate chains received from peers.
use crate::pow::{self, Difficulty};
use crate::Block;
use thiserror::Error;

/// First defect found in a candidate chain. `position` is the slice offset of
/// the later block of the failing pair.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainFault {
    #[error("chain is empty")]
    Empty,

    #[error("block at position {position} does not reference the digest of its predecessor")]
    BrokenLink { position: usize },

    #[error("block at position {position} carries proof {proof} which does not solve the puzzle against {last_proof}")]
    InvalidProof {
        position: usize,
        last_proof: u64,
        proof: u64,
    },
}

/// Scans every adjacent pair and stops at the first broken link or unsolved proof.
pub fn check_chain(chain: &[Block], difficulty: Difficulty) -> Result<(), ChainFault> {
    if chain.is_empty() {
        return Err(ChainFault::Empty);
    }
    for (position, pair) in chain.windows(2).enumerate().map(|(i, w)| (i + 1, w)) {
        let (last, block) = (&pair[0], &pair[1]);
        if block.previous_hash != last.hash() {
            return Err(ChainFault::BrokenLink { position });
        }
        if !pow::valid(last.proof, block.proof, difficulty) {
            return Err(ChainFault::InvalidProof {
                position,
                last_proof: last.proof,
                proof: block.proof,
            });
        }
    }
    Ok(())
}

pub fn is_valid(chain: &[Block], difficulty: Difficulty) -> bool {
    check_chain(chain, difficulty).is_ok()
}
