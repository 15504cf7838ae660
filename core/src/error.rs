//! Error types for the Sky client.
//!
//! # Design
//! Local precondition failures (`MissingArgument`, `InvalidInsertionMode`,
//! `InvalidTimestamp`) are raised while an operation is being built, so they
//! never reach a transport. `Server` carries the status of any non-2xx
//! response together with the `message` field of its JSON body, when the
//! body had one. `Connection` covers everything the transport could not
//! deliver at all.

use thiserror::Error;

/// Errors returned by every Sky client operation.
#[derive(Debug, Error)]
pub enum SkyError {
    /// A required identifier or entity was absent or empty.
    #[error("{0} required")]
    MissingArgument(&'static str),

    /// An event insertion mode other than `replace` or `merge`.
    #[error("invalid event insertion method: {0}")]
    InvalidInsertionMode(String),

    /// Timestamp text that is not RFC 3339.
    #[error("invalid timestamp '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },

    /// Aggregate rows or trees that do not match the declared dimensions.
    #[error("malformed aggregate data: {0}")]
    MalformedAggregateData(String),

    /// The server answered with a non-2xx status.
    #[error("server error {status}: {}", message.as_deref().unwrap_or("<no message>"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// The request never produced an HTTP response.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl SkyError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedAggregateData(message.into())
    }

    /// HTTP status of a server error, `None` for local and connection failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SkyError>;
