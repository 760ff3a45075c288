//! On-chain target resolution for the chaingate forwarding gateway.
//!
//! The resolver queries a registry contract via JSON-RPC `eth_call` over an
//! ordered list of endpoints, decodes the ABI-encoded domain string it
//! returns, and caches the value for a bounded time window.

mod abi;
mod resolver;

pub use abi::*;
pub use resolver::*;
