//! HTTP transports for `sky-core`.
//!
//! # Overview
//! - `UreqTransport`: blocking; the calling thread waits for the response.
//! - `ReqwestTransport`: async; awaiting a request yields to the tokio
//!   scheduler so other tasks keep running.
//!
//! Both only move bytes. Status handling, JSON decoding and every Sky rule
//! live in `sky-core`, so the two behave identically behind the client API.
//! Neither applies timeouts or retries of its own.

pub mod blocking;
pub mod cooperative;

pub use blocking::UreqTransport;
pub use cooperative::ReqwestTransport;

use log::debug;
use sky_core::{AsyncClient, BlockingClient, ClientConfig};

/// Blocking client for `config`.
pub fn connect(config: &ClientConfig) -> BlockingClient<UreqTransport> {
    let endpoint = config.endpoint();
    debug!("blocking client for {}", endpoint.url(""));
    BlockingClient::new(endpoint, UreqTransport::new())
}

/// Async client for `config`. Must be used from within a tokio runtime.
pub fn connect_async(config: &ClientConfig) -> AsyncClient<ReqwestTransport> {
    let endpoint = config.endpoint();
    debug!("cooperative client for {}", endpoint.url(""));
    AsyncClient::new(endpoint, ReqwestTransport::new())
}
