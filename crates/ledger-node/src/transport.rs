use crate::constants::CHAIN_PATH;
use ledger_core::{PeerChain, PeerTransport, TransportError};
use reqwest::Client;

/// Fetches `GET http://{peer}/chain` with reqwest.
///
/// The per-peer deadline is enforced by the resolver, not by the client.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PeerTransport for HttpTransport {
    async fn fetch_chain(&self, address: &str) -> Result<PeerChain, TransportError> {
        let url = format!("http://{address}{CHAIN_PATH}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                peer: address.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                peer: address.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<PeerChain>()
            .await
            .map_err(|e| TransportError::Decode {
                peer: address.to_string(),
                reason: e.to_string(),
            })
    }
}
