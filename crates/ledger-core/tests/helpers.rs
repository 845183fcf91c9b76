use ledger_core::pow::{self, Difficulty};
use ledger_core::{
    Block, Ledger, LedgerError, Node, NodeConfig, PeerChain, PeerTransport, Transaction,
    TransportError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_DIFFICULTY: usize = 2;

pub fn test_config() -> NodeConfig {
    NodeConfig::default()
        .with_difficulty(TEST_DIFFICULTY)
        .with_peer_timeout(Duration::from_millis(300))
}

pub fn test_node() -> Arc<Node> {
    Arc::new(Node::new(test_config()))
}

/// Mines on the blocking pool, the way the HTTP surface does.
pub async fn mine(node: &Arc<Node>) -> Result<Block, LedgerError> {
    let node = Arc::clone(node);
    tokio::task::spawn_blocking(move || node.mine())
        .await
        .expect("mining task panicked")
}

/// A valid chain of `len` blocks with its own genesis.
pub fn mined_chain(len: usize) -> Vec<Block> {
    let difficulty = Difficulty::new(TEST_DIFFICULTY);
    let mut ledger = Ledger::new(difficulty);
    while ledger.len() < len {
        let proof = pow::search(ledger.last_block().proof, difficulty);
        let tx = Transaction::new(format!("VOID{:03}", ledger.len()), "nominee");
        ledger
            .append(ledger.next_block(proof, vec![tx]))
            .expect("block extends the tip");
    }
    ledger.snapshot()
}

pub fn peer_chain(chain: Vec<Block>) -> PeerChain {
    PeerChain {
        length: chain.len() as u64,
        chain,
    }
}

pub enum Reply {
    Chain(PeerChain),
    Delayed(Duration, PeerChain),
    Status(u16),
    /// A body that is not a chain payload.
    Garbage,
}

/// In-memory transport; unknown peers behave as unreachable.
#[derive(Default)]
pub struct FakeTransport {
    replies: HashMap<String, Reply>,
    calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, peer: &str, reply: Reply) -> Self {
        self.replies.insert(peer.to_string(), reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PeerTransport for FakeTransport {
    async fn fetch_chain(&self, address: &str) -> Result<PeerChain, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(address) {
            Some(Reply::Chain(chain)) => Ok(chain.clone()),
            Some(Reply::Delayed(delay, chain)) => {
                tokio::time::sleep(*delay).await;
                Ok(chain.clone())
            }
            Some(Reply::Status(status)) => Err(TransportError::Status {
                peer: address.to_string(),
                status: *status,
            }),
            Some(Reply::Garbage) => Err(TransportError::Decode {
                peer: address.to_string(),
                reason: "missing field `chain`".to_string(),
            }),
            None => Err(TransportError::Request {
                peer: address.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}
