use crate::error::{LedgerError, Result};
use std::collections::BTreeSet;
use url::Url;

/// Known peers as `host[:port]`.
#[derive(Clone, Debug, Default)]
pub struct NodeRegistry {
    nodes: BTreeSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a peer given as a URL (`http://host:port/...`) or a bare
    /// `host:port`. Returns the normalized address that was stored.
    pub fn register(&mut self, raw: &str) -> Result<String> {
        let address = parse_address(raw)?;
        self.nodes.insert(address.clone());
        Ok(address)
    }

    /// Registers every address in `raw`, or none of them if any is malformed.
    pub fn register_all<S: AsRef<str>>(&mut self, raw: &[S]) -> Result<Vec<String>> {
        let addresses = raw
            .iter()
            .map(|address| parse_address(address.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.nodes.extend(addresses.iter().cloned());
        Ok(addresses)
    }

    pub fn list(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Extracts `host[:port]` from `raw`.
///
/// Peers are fetched over plain http, so only port 80 is implied; any other
/// scheme keeps its port, including its default one.
pub fn parse_address(raw: &str) -> Result<String> {
    let invalid = |reason: String| LedgerError::InvalidAddress {
        address: raw.to_string(),
        reason,
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty address".to_string()));
    }
    let url = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("http://{trimmed}"))
    }
    .map_err(|e| invalid(e.to_string()))?;

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(invalid("missing host".to_string())),
    };
    let port = match url.scheme() {
        "http" => url.port(),
        _ => url.port_or_known_default(),
    };
    Ok(match port {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
