//! Proof-of-work puzzle.
//!
//! A candidate proof is accepted when `sha256(format!("{last_proof}{candidate}"))`,
//! rendered as hex, starts with [`Difficulty`] zero characters. The puzzle only
//! binds the previous proof; it does not commit to the block's transactions or
//! previous hash.
use crate::constants::{HASH_HEX_SIZE, POW_SEARCH_BATCH, POW_TARGET_DIFFICULTY};
use crate::hasher::sha256_hex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of leading `'0'` hex characters a proof digest must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(usize);

impl Difficulty {
    pub const fn new(zeros: usize) -> Self {
        if zeros < HASH_HEX_SIZE {
            Self(zeros)
        } else {
            Self(HASH_HEX_SIZE)
        }
    }

    pub fn zeros(self) -> usize {
        self.0
    }

    pub fn is_met_by(self, hex_digest: &str) -> bool {
        count_leading_zero_chars(hex_digest) >= self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(POW_TARGET_DIFFICULTY)
    }
}

pub fn count_leading_zero_chars(hex_digest: &str) -> usize {
    hex_digest.bytes().take_while(|b| *b == b'0').count()
}

pub fn valid(last_proof: u64, candidate: u64, difficulty: Difficulty) -> bool {
    let guess = format!("{last_proof}{candidate}");
    difficulty.is_met_by(&sha256_hex(guess.as_bytes()))
}

/// Smallest candidate, counting up from 0, that satisfies [`valid`].
pub fn search(last_proof: u64, difficulty: Difficulty) -> u64 {
    let mut candidate = 0u64;
    while !valid(last_proof, candidate, difficulty) {
        candidate += 1;
    }
    candidate
}

/// Same answer as [`search`], scanned in parallel batches.
///
/// `should_stop` is polled before every batch; once it returns true the search
/// is abandoned and `None` is returned.
pub fn search_until<F>(last_proof: u64, difficulty: Difficulty, should_stop: F) -> Option<u64>
where
    F: Fn() -> bool,
{
    let mut start = 0u64;
    loop {
        if should_stop() {
            return None;
        }
        let end = start.saturating_add(POW_SEARCH_BATCH);
        // find_first keeps the lowest match in the batch, so the result is deterministic.
        let found = (start..end)
            .into_par_iter()
            .find_first(|candidate| valid(last_proof, *candidate, difficulty));
        if found.is_some() {
            return found;
        }
        if end == u64::MAX {
            return None;
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn leading_zero_chars_examples() {
        assert_eq!(count_leading_zero_chars("0000ab"), 4);
        assert_eq!(count_leading_zero_chars("00a000"), 2);
        assert_eq!(count_leading_zero_chars("f000"), 0);
        assert_eq!(count_leading_zero_chars(""), 0);
    }

    #[test]
    fn difficulty_default_is_four_zeros() {
        assert_eq!(Difficulty::default().zeros(), 4);
        assert!(Difficulty::default().is_met_by("0000ffff"));
        assert!(!Difficulty::default().is_met_by("000fffff"));
    }

    #[test]
    fn difficulty_is_capped_at_digest_width() {
        assert_eq!(Difficulty::new(1_000).zeros(), HASH_HEX_SIZE);
    }

    #[test]
    fn valid_matches_digest_prefix() {
        let difficulty = Difficulty::new(2);
        for candidate in 0..500u64 {
            let digest = sha256_hex(format!("100{candidate}").as_bytes());
            assert_eq!(
                valid(100, candidate, difficulty),
                digest.starts_with("00"),
                "candidate {candidate}"
            );
        }
    }

    #[test]
    fn zero_difficulty_accepts_everything() {
        assert!(valid(7, 0, Difficulty::new(0)));
        assert_eq!(search(7, Difficulty::new(0)), 0);
    }

    #[test]
    fn search_returns_smallest_valid_candidate() {
        let difficulty = Difficulty::new(3);
        let proof = search(100, difficulty);
        assert!(valid(100, proof, difficulty));
        assert!((0..proof).all(|c| !valid(100, c, difficulty)));
    }

    #[test]
    fn search_with_default_difficulty() {
        let proof = search(100, Difficulty::default());
        assert!(valid(100, proof, Difficulty::default()));
    }

    #[test]
    fn parallel_search_agrees_with_sequential() {
        let difficulty = Difficulty::new(3);
        for last_proof in [0u64, 100, 35_293, 987_654] {
            assert_eq!(
                search_until(last_proof, difficulty, || false),
                Some(search(last_proof, difficulty))
            );
        }
    }

    #[test]
    fn search_until_stops_when_asked() {
        let stop = AtomicBool::new(true);
        assert_eq!(
            search_until(100, Difficulty::new(64), || stop.load(Ordering::SeqCst)),
            None
        );
    }

    #[test]
    fn search_until_polls_between_batches() {
        let polls = AtomicUsize::new(0);
        let found = search_until(100, Difficulty::new(64), || {
            polls.fetch_add(1, Ordering::SeqCst) >= 3
        });
        assert_eq!(found, None);
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }
}
