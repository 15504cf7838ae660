//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `SkyClient` builds `HttpRequest`
//! values without touching the network; a `Transport` turns one into an
//! `HttpResponse`, and `decode_response` turns that into JSON or a
//! `SkyError::Server`. Keeping status interpretation here means the blocking
//! and the cooperative transports cannot disagree about what counts as a
//! failure.
//!
//! Paths are relative to the endpoint (`/tables/users`); the transport joins
//! them with host, port and scheme.

use std::fmt;

use serde_json::Value;

use crate::error::{Result, SkyError};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A request without a body. Sky expects the JSON content type on every
    /// request, bodies or not.
    pub fn new(method: HttpMethod, path: String) -> Self {
        Self {
            method,
            path,
            headers: vec![json_content_type()],
            body: None,
        }
    }

    /// A request whose body is `payload` encoded as JSON.
    pub fn with_json(method: HttpMethod, path: String, payload: &Value) -> Result<Self> {
        let body =
            serde_json::to_string(payload).map_err(|e| SkyError::Serialization(e.to_string()))?;
        Ok(Self {
            method,
            path,
            headers: vec![json_content_type()],
            body: Some(body),
        })
    }
}

fn json_content_type() -> (String, String) {
    ("content-type".to_string(), "application/json".to_string())
}

/// An HTTP response described as plain data, produced by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Map a raw response to its JSON body or a `SkyError::Server`.
///
/// A successful response with an empty body decodes to `Value::Null`. For a
/// failed response the `message` field is taken from the body when the body
/// is a JSON object carrying a string `message`; otherwise it is `None`.
pub fn decode_response(response: &HttpResponse) -> Result<Value> {
    check_status(response)?;
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| SkyError::Deserialization(e.to_string()))
}

/// Status half of `decode_response`: a 2xx passes whatever its body holds.
pub fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|json| json.get("message").and_then(Value::as_str).map(str::to_string));
    Err(SkyError::Server {
        status: response.status,
        message,
    })
}
