//! Blocking transport backed by `ureq`.

use ureq::typestate::WithBody;
use ureq::{http, Body, RequestBuilder};

use sky_core::{Endpoint, HttpMethod, HttpRequest, HttpResponse, SkyError, Transport};

/// Executes each request on the calling thread.
///
/// Status codes are returned as data rather than errors (ureq's
/// status-as-error behavior is off), so `sky_core::decode_response` stays
/// the single place that decides what a failure is.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&str>,
) -> Result<http::Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn connection_error(err: ureq::Error) -> SkyError {
    SkyError::Connection(err.to_string())
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        endpoint: &Endpoint,
        request: &HttpRequest,
    ) -> Result<HttpResponse, SkyError> {
        let url = endpoint.url(&request.path);
        let body = request.body.as_deref();

        let mut response = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&url), request).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), request).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(&url), request), body),
            HttpMethod::Put => send(with_headers(self.agent.put(&url), request), body),
            HttpMethod::Patch => send(with_headers(self.agent.patch(&url), request), body),
        }
        .map_err(connection_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(connection_error)?;

        Ok(HttpResponse { status, headers, body })
    }
}
