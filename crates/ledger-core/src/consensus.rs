//! Longest-valid-chain conflict resolution.
//!
//! Every registered peer is asked for its chain concurrently, each fetch bounded
//! by the configured peer timeout. Peers that fail, time out or send an invalid
//! chain are skipped. The longest valid chain that is strictly longer than the
//! local one replaces the local ledger in a single step.
use crate::error::TransportError;
use crate::node::Node;
use crate::pow::Difficulty;
use crate::validation;
use crate::Block;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Payload a peer serves for its chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerChain {
    pub length: u64,
    pub chain: Vec<Block>,
}

/// Fetches a peer's chain. Implemented over HTTP by the node binary and by
/// in-memory fakes in tests.
pub trait PeerTransport: Send + Sync {
    fn fetch_chain(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<PeerChain, TransportError>> + Send;
}

/// Returns true when the local ledger was replaced.
pub async fn resolve<T: PeerTransport>(node: &Node, transport: &T) -> bool {
    let peers = node.peers();
    if peers.is_empty() {
        debug!("no peers registered, keeping local chain");
        return false;
    }
    let local_length = node.chain_len() as u64;
    let timeout = node.config().peer_timeout();

    let responses = join_all(
        peers
            .iter()
            .map(|peer| fetch_with_timeout(transport, peer, timeout)),
    )
    .await;

    let winner = select_longest(
        local_length,
        peers.iter().map(String::as_str).zip(responses),
        node.config().difficulty,
    );
    match winner {
        Some(chain) => node.adopt(chain).await,
        None => {
            info!(local_length, peers = peers.len(), "local chain is authoritative");
            false
        }
    }
}

async fn fetch_with_timeout<T: PeerTransport>(
    transport: &T,
    peer: &str,
    timeout: Duration,
) -> Result<PeerChain, TransportError> {
    match tokio::time::timeout(timeout, transport.fetch_chain(peer)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout {
            peer: peer.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Picks the longest valid chain strictly longer than `local_length`.
///
/// Only a strictly longer chain displaces the current best, so among equally
/// long candidates the first one seen wins.
pub fn select_longest<'a, I>(
    local_length: u64,
    responses: I,
    difficulty: Difficulty,
) -> Option<Vec<Block>>
where
    I: IntoIterator<Item = (&'a str, Result<PeerChain, TransportError>)>,
{
    let mut max_length = local_length;
    let mut winner = None;

    for (peer, response) in responses {
        let candidate = match response {
            Ok(candidate) => candidate,
            Err(err) => {
                warn!(peer, error = %err, "skipping peer");
                continue;
            }
        };
        if candidate.length != candidate.chain.len() as u64 {
            let err = TransportError::LengthMismatch {
                peer: peer.to_string(),
                reported: candidate.length,
                actual: candidate.chain.len(),
            };
            warn!(peer, error = %err, "skipping peer");
            continue;
        }
        if candidate.length <= max_length {
            debug!(peer, length = candidate.length, max_length, "peer chain is not longer");
            continue;
        }
        match validation::check_chain(&candidate.chain, difficulty) {
            Ok(()) => {
                debug!(peer, length = candidate.length, "peer chain is the new candidate");
                max_length = candidate.length;
                winner = Some(candidate.chain);
            }
            Err(fault) => warn!(peer, %fault, "rejecting invalid peer chain"),
        }
    }
    winner
}
