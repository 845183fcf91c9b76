pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const SESSION_KEY_SIZE: usize = 16;
pub const TRANSACTION_WEIGHT: u64 = 1;
pub const GENESIS_INDEX: u64 = 1;
pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str = "1";
pub const POW_TARGET_DIFFICULTY: usize = 4;
pub const POW_SEARCH_BATCH: u64 = 4096;
pub const PEER_TIMEOUT_MS: u64 = 5_000;
