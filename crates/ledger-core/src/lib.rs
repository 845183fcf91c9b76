//! Core of a minimal hash-chained ledger node.
//!
//! Blocks are linked by the SHA-256 digest of their canonical JSON form and
//! gated by a brute-force proof-of-work puzzle. Nodes agree on history with the
//! longest-valid-chain rule, polling peers through an injected [`PeerTransport`].
pub mod chain;
pub mod config;
pub mod consensus;
pub mod constants;
pub mod error;
pub mod hasher;
pub mod node;
pub mod pool;
pub mod pow;
pub mod registry;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use constants::{SESSION_KEY_SIZE, TRANSACTION_WEIGHT};

pub use chain::Ledger;
pub use config::NodeConfig;
pub use consensus::{PeerChain, PeerTransport};
pub use error::{LedgerError, Result, TransportError};
pub use node::{ChainView, Node};
pub use pool::TransactionPool;
pub use pow::Difficulty;
pub use registry::NodeRegistry;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub party_a: String,
    pub party_b: String,
    pub weight: u64,
}

impl Transaction {
    pub fn new(party_a: impl Into<String>, party_b: impl Into<String>) -> Self {
        Self {
            party_a: party_a.into(),
            party_b: party_b.into(),
            weight: TRANSACTION_WEIGHT,
        }
    }
}

/// A block as stored locally and exchanged with peers.
///
/// Field names are part of the wire contract: peers hash the same canonical
/// JSON rendering, so renaming a field forks the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub session_key: String,
    pub previous_hash: String,
}

impl Block {
    /// Stamps the block with the current time and a fresh session key.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: impl Into<String>,
    ) -> Self {
        Self {
            index,
            timestamp: unix_now(),
            transactions,
            proof,
            session_key: session_key(),
            previous_hash: previous_hash.into(),
        }
    }

    pub fn hash(&self) -> String {
        hasher::digest(self)
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// 128 random bits rendered as 32 lowercase hex characters.
pub fn session_key() -> String {
    let bytes: [u8; SESSION_KEY_SIZE] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block {
            index: 2,
            timestamp: 1_600_000_000,
            transactions: vec![Transaction::new("A", "B"), Transaction::new("C", "D")],
            proof: 35_293,
            session_key: "0123456789abcdef0123456789abcdef".to_string(),
            previous_hash: "1".to_string(),
        }
    }

    #[test]
    fn transaction_weight_is_fixed() {
        let tx = Transaction::new("Alice", "Bob");
        assert_eq!(tx.weight, 1);
        assert_eq!(tx.party_a, "Alice");
        assert_eq!(tx.party_b, "Bob");
    }

    #[test]
    fn transaction_serialization_example() {
        let tx = Transaction::new("Alice", "Bob");
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, r#"{"party_a":"Alice","party_b":"Bob","weight":1}"#);
    }

    #[test]
    fn block_new_example() {
        let block = Block::new(3, vec![], 42, "abc");
        assert_eq!(block.index, 3);
        assert_eq!(block.proof, 42);
        assert_eq!(block.previous_hash, "abc");
        assert!(block.timestamp > 0);
        assert!(block.transactions.is_empty());
    }

    #[test]
    fn session_keys_are_hex_and_unique() {
        let a = session_key();
        let b = session_key();
        assert_eq!(a.len(), SESSION_KEY_SIZE * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn block_deserializes_from_peer_payload() {
        let payload = r#"{
            "previous_hash": "1",
            "proof": 35293,
            "index": 2,
            "session_key": "0123456789abcdef0123456789abcdef",
            "transactions": [
                {"weight": 1, "party_b": "B", "party_a": "A"},
                {"party_a": "C", "party_b": "D", "weight": 1}
            ],
            "timestamp": 1600000000
        }"#;
        let block: Block = serde_json::from_str(payload).unwrap();
        assert_eq!(block, sample_block());
    }

    #[test]
    fn block_hash_matches_hasher() {
        let block = sample_block();
        assert_eq!(block.hash(), hasher::digest(&block));
    }
}
