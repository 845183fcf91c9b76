//! Canonical block digests.
//!
//! A block is rendered as compact JSON with every object's keys sorted
//! lexicographically, then hashed with SHA-256. Peers compare these digests
//! directly, so the rendering must stay stable across nodes.
use crate::Block;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Sorted-key compact JSON for `block`.
pub fn canonical_json(block: &Block) -> Vec<u8> {
    // A Block holds only strings, integers and sequences of those.
    let value = serde_json::to_value(block).expect("block serializes to a JSON value");
    serde_json::to_vec(&sorted(value)).expect("JSON value serializes to bytes")
}

/// Lowercase hex SHA-256 of [`canonical_json`].
pub fn digest(block: &Block) -> String {
    sha256_hex(&canonical_json(block))
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(k, v)| (k, sorted(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::HASH_HEX_SIZE, Transaction};

    fn block() -> Block {
        Block {
            index: 2,
            timestamp: 1_600_000_000,
            transactions: vec![Transaction::new("A", "B")],
            proof: 35_293,
            session_key: "00112233445566778899aabbccddeeff".to_string(),
            previous_hash: "1".to_string(),
        }
    }

    #[test]
    fn canonical_json_sorts_keys() {
        let json = String::from_utf8(canonical_json(&block())).unwrap();
        let expected = concat!(
            r#"{"index":2,"previous_hash":"1","proof":35293,"#,
            r#""session_key":"00112233445566778899aabbccddeeff","timestamp":1600000000,"#,
            r#""transactions":[{"party_a":"A","party_b":"B","weight":1}]}"#
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn digest_is_sha256_of_canonical_form() {
        let b = block();
        let expected = hex::encode(Sha256::digest(canonical_json(&b)));
        assert_eq!(digest(&b), expected);
        assert_eq!(digest(&b).len(), HASH_HEX_SIZE);
        assert!(digest(&b).chars().all(|c| !c.is_ascii_uppercase()));
    }

    #[test]
    fn digest_is_deterministic() {
        let b = block();
        assert_eq!(digest(&b), digest(&b));
        assert_eq!(digest(&b), digest(&b.clone()));
    }

    #[test]
    fn digest_ignores_construction_order() {
        let shuffled = r#"{"transactions":[{"weight":1,"party_b":"B","party_a":"A"}],
            "timestamp":1600000000,"session_key":"00112233445566778899aabbccddeeff",
            "proof":35293,"previous_hash":"1","index":2}"#;
        let from_peer: Block = serde_json::from_str(shuffled).unwrap();
        assert_eq!(digest(&from_peer), digest(&block()));
    }

    #[test]
    fn digest_changes_with_any_field() {
        let base = digest(&block());

        let mut b = block();
        b.proof += 1;
        assert_ne!(digest(&b), base);

        let mut b = block();
        b.session_key = "ffeeddccbbaa99887766554433221100".to_string();
        assert_ne!(digest(&b), base);

        let mut b = block();
        b.transactions.push(Transaction::new("C", "D"));
        assert_ne!(digest(&b), base);
    }

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
