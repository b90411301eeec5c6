//! Remote completion proxy: wire contract, client, and service
//!
//! The proxy sits between chat sessions and the external completion
//! provider. `wire` defines the shared request/response shapes, `client`
//! is the session-side HTTP client behind the [`CompletionClient`] seam,
//! and `server` is the axum service that injects the persona prompt and
//! forwards to the provider.

pub mod client;
pub mod server;
pub mod wire;

pub use client::{CompletionClient, HttpProxyClient};
pub use server::{router, ProxyState};
