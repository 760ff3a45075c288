//! The chaingate forwarding gateway service.
//!
//! Relays inbound HTTP exchanges to the upstream target resolved from the
//! on-chain registry, with permissive cross-origin headers on every response.

pub mod api;
pub mod config;
pub mod forward;
pub mod middleware;

pub use config::Config;

use chaingate::Resolver;
use forward::Forwarder;
use poem::{Endpoint, EndpointExt as _, Route};

/// Assembles the gateway application over the provided resolver and
/// forwarder.
pub fn gateway(resolver: Resolver, forwarder: Forwarder) -> impl Endpoint {
    Route::new()
        .at("/api/secureproxy", api::proxy)
        .data(resolver)
        .data(forwarder)
        .around(middleware::cors)
}
