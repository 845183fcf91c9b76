//! The node: one ledger, one transaction pool and the peer registry.
//!
//! The ledger and the pool share a single async mutex. Mining holds it for the
//! whole proof search so that a consensus swap can never interleave with a
//! block being appended. A resolver waiting to swap raises `pending_swaps`,
//! which makes an in-flight search give up at its next batch boundary.
//!
//! Every change to the ledger is published as an immutable snapshot while the
//! lock is still held. Chain reads go through that snapshot, so they never
//! wait on a running search.
use crate::chain::Ledger;
use crate::config::NodeConfig;
use crate::consensus::{self, PeerTransport};
use crate::error::{LedgerError, Result};
use crate::pool::TransactionPool;
use crate::pow::{self, Difficulty};
use crate::registry::NodeRegistry;
use crate::{Block, Transaction};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

/// Chain export served to collaborators and peers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainView {
    pub chain: Vec<Block>,
    pub length: u64,
}

struct ChainState {
    ledger: Ledger,
    pool: TransactionPool,
}

/// Raised while a resolver waits for the chain lock. Dropping it lowers the
/// count again, also when the waiting future is abandoned.
struct SwapIntent<'a>(&'a AtomicUsize);

impl<'a> SwapIntent<'a> {
    fn raise(pending: &'a AtomicUsize) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self(pending)
    }
}

impl Drop for SwapIntent<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct Node {
    config: NodeConfig,
    state: Mutex<ChainState>,
    published: watch::Sender<Arc<Vec<Block>>>,
    registry: RwLock<NodeRegistry>,
    shutdown: AtomicBool,
    pending_swaps: AtomicUsize,
}

impl Node {
    pub fn new(config: NodeConfig) -> Self {
        let ledger = Ledger::new(config.difficulty);
        let (published, _) = watch::channel(Arc::new(ledger.snapshot()));
        Self {
            config,
            state: Mutex::new(ChainState {
                ledger,
                pool: TransactionPool::new(),
            }),
            published,
            registry: RwLock::new(NodeRegistry::new()),
            shutdown: AtomicBool::new(false),
            pending_swaps: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Queues a transaction and returns the index of the block it will land in.
    pub async fn submit_transaction(
        &self,
        party_a: impl Into<String>,
        party_b: impl Into<String>,
    ) -> u64 {
        let mut state = self.state.lock().await;
        state.pool.submit(party_a, party_b);
        let index = state.ledger.len() as u64 + 1;
        debug!(index, pending = state.pool.len(), "transaction queued");
        index
    }

    pub async fn pending_transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.pool.pending()
    }

    /// Solves the puzzle against the tip, then seals every pending transaction
    /// into the next block.
    ///
    /// Runs the search on the calling thread with the chain lock held, so call
    /// it from a blocking context (`spawn_blocking` or a plain thread).
    ///
    /// Fails with [`LedgerError::MiningCancelled`] when the node shuts down or a
    /// longer chain is being adopted; the ledger and the pool are left as they were.
    pub fn mine(&self) -> Result<Block> {
        self.mine_at(self.config.difficulty)
    }

    fn mine_at(&self, difficulty: Difficulty) -> Result<Block> {
        let mut state = self.state.blocking_lock();
        let last_proof = state.ledger.last_block().proof;
        let proof = pow::search_until(last_proof, difficulty, || self.should_stop())
            .ok_or(LedgerError::MiningCancelled)?;

        let transactions = state.pool.drain();
        let block = state.ledger.next_block(proof, transactions);
        if let Err(err) = state.ledger.append(block.clone()) {
            state.pool.requeue(block.transactions);
            return Err(err);
        }
        self.publish(&state.ledger);
        info!(
            index = block.index,
            proof = block.proof,
            transactions = block.transactions.len(),
            "new block mined"
        );
        Ok(block)
    }

    /// Must be called with the chain lock held.
    fn publish(&self, ledger: &Ledger) {
        self.published.send_replace(Arc::new(ledger.snapshot()));
    }

    pub fn last_block(&self) -> Block {
        let chain = self.published.borrow();
        // Published snapshots always start at genesis.
        chain[chain.len() - 1].clone()
    }

    pub fn chain_len(&self) -> usize {
        self.published.borrow().len()
    }

    pub fn get_chain(&self) -> ChainView {
        let chain = self.published.borrow().to_vec();
        ChainView {
            length: chain.len() as u64,
            chain,
        }
    }

    pub fn register_node(&self, address: &str) -> Result<String> {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let address = registry.register(address)?;
        debug!(%address, total = registry.len(), "peer registered");
        Ok(address)
    }

    /// Registers all of `addresses` or, if any of them is malformed, none.
    pub fn register_nodes<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Vec<String>> {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let added = registry.register_all(addresses)?;
        debug!(added = added.len(), total = registry.len(), "peers registered");
        Ok(added)
    }

    pub fn peers(&self) -> Vec<String> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .list()
    }

    /// Adopts the longest valid peer chain that is strictly longer than ours.
    /// Returns true when the local chain was replaced.
    pub async fn resolve_conflicts<T: PeerTransport>(&self, transport: &T) -> bool {
        consensus::resolve(self, transport).await
    }

    /// Cancels any running and future proof search.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn should_stop(&self) -> bool {
        self.is_shut_down() || self.pending_swaps.load(Ordering::SeqCst) > 0
    }

    /// Swaps in `chain` if it is still longer than the local one once the lock
    /// is held. `chain` must already be validated.
    pub(crate) async fn adopt(&self, chain: Vec<Block>) -> bool {
        let intent = SwapIntent::raise(&self.pending_swaps);
        let mut state = self.state.lock().await;
        drop(intent);

        let (local, incoming) = (state.ledger.len(), chain.len());
        if incoming <= local {
            debug!(local, incoming, "local chain grew while resolving, keeping it");
            return false;
        }
        state.ledger.replace(chain);
        self.publish(&state.ledger);
        info!(previous = local, length = incoming, "local chain replaced by longer peer chain");
        true
    }
}
