//! Async transport backed by `reqwest`.

use reqwest::Method;
use sky_core::{AsyncTransport, Endpoint, HttpMethod, HttpRequest, HttpResponse, SkyError};

/// Sends requests as futures on the caller's tokio runtime. The underlying
/// `reqwest::Client` pools connections and is safe to share between tasks.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn connection_error(err: reqwest::Error) -> SkyError {
    SkyError::Connection(err.to_string())
}

impl AsyncTransport for ReqwestTransport {
    async fn execute(
        &self,
        endpoint: &Endpoint,
        request: &HttpRequest,
    ) -> Result<HttpResponse, SkyError> {
        let mut builder = self
            .client
            .request(method(request.method), endpoint.url(&request.path));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(connection_error)?;
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
        let body = response.text().await.map_err(connection_error)?;

        Ok(HttpResponse { status, headers, body })
    }
}
