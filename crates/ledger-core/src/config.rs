use crate::constants::PEER_TIMEOUT_MS;
use crate::pow::Difficulty;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Leading hex zeros required of every proof digest.
    pub difficulty: Difficulty,
    /// Upper bound on a single peer fetch during conflict resolution.
    pub peer_timeout_ms: u64,
}

impl NodeConfig {
    pub fn with_difficulty(mut self, zeros: usize) -> Self {
        self.difficulty = Difficulty::new(zeros);
        self
    }

    pub fn with_peer_timeout(mut self, timeout: Duration) -> Self {
        self.peer_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            peer_timeout_ms: PEER_TIMEOUT_MS,
        }
    }
}
