pub const DEFAULT_LISTEN: &str = "127.0.0.1:5500";
pub const CHAIN_PATH: &str = "/chain";
pub const MINED_MESSAGE: &str = "New Block Mined";
pub const REPLACED_MESSAGE: &str = "Our chain was replaced";
pub const AUTHORITATIVE_MESSAGE: &str = "Our chain is authoritative";
