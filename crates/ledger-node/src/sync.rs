//! Background conflict resolution on a fixed interval.
use crate::transport::HttpTransport;
use ledger_core::Node;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

pub async fn resolve_periodically(node: Arc<Node>, transport: HttpTransport, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;
    info!(every_secs = every.as_secs(), "periodic conflict resolution enabled");

    while !node.is_shut_down() {
        ticker.tick().await;
        if node.peers().is_empty() {
            continue;
        }
        let replaced = node.resolve_conflicts(&transport).await;
        debug!(replaced, length = node.chain_len(), "periodic resolution finished");
    }
}
