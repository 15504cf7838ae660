//! The transport capability.
//!
//! A transport performs one HTTP round trip and nothing else: no status
//! interpretation, no retries, no timeouts of its own. It fails only when no
//! response was obtained (`SkyError::Connection`). Both traits describe the
//! same contract; `AsyncTransport` returns a future so the caller's task
//! yields while the request is in flight.

use std::future::Future;

use crate::config::Endpoint;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};

/// A transport that blocks the calling thread for the round trip.
pub trait Transport {
    fn execute(&self, endpoint: &Endpoint, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, endpoint: &Endpoint, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(endpoint, request)
    }
}

/// A transport driven by an async runtime.
pub trait AsyncTransport: Send + Sync {
    fn execute(
        &self,
        endpoint: &Endpoint,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl<T: AsyncTransport + ?Sized> AsyncTransport for &T {
    fn execute(
        &self,
        endpoint: &Endpoint,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse>> + Send {
        (**self).execute(endpoint, request)
    }
}
