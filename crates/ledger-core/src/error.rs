use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid peer address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("proof-of-work search was cancelled")]
    MiningCancelled,

    #[error("block {index} rejected: {reason}")]
    BlockRejected { index: u64, reason: String },
}

/// Failures talking to a single peer. Consensus resolution logs these and
/// moves on to the next peer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {peer} failed: {reason}")]
    Request { peer: String, reason: String },

    #[error("{peer} answered with status {status}")]
    Status { peer: String, status: u16 },

    #[error("malformed chain payload from {peer}: {reason}")]
    Decode { peer: String, reason: String },

    #[error("{peer} did not answer within {timeout_ms} ms")]
    Timeout { peer: String, timeout_ms: u64 },

    #[error("{peer} reported length {reported} but sent {actual} blocks")]
    LengthMismatch {
        peer: String,
        reported: u64,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
