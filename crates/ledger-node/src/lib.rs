//! HTTP node wrapping [`ledger_core::Node`].
pub mod api;
pub mod constants;
pub mod sync;
pub mod transport;

pub use api::{router, AppState};
pub use transport::HttpTransport;
