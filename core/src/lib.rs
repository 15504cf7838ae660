//! Client core for the Sky event store.
//!
//! # Overview
//! Builds Sky API requests and interprets responses without doing any I/O
//! itself. Actual round trips go through a pluggable transport, blocking
//! (`Transport`) or async (`AsyncTransport`), wrapped by `BlockingClient`
//! and `AsyncClient` respectively.
//!
//! # Design
//! - `SkyClient` is stateless: each operation becomes an `Operation` holding
//!   the request and its response parser. Local argument checks happen while
//!   building, so they never cost a request.
//! - Status handling lives in `http::decode_response`, shared by every
//!   transport.
//! - `codec` owns the canonical event timestamp and the insertion-mode verb.
//! - `reshape` converts grouped query results to rows and back; pure data.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod blocking;
pub mod client;
pub mod codec;
pub mod config;
pub mod cooperative;
pub mod error;
pub mod http;
pub mod reshape;
pub mod resources;
pub mod transport;
pub mod types;

pub use blocking::BlockingClient;
pub use client::{Operation, SkyClient};
pub use codec::{canonicalize_timestamp, parse_timestamp, resolve_method, InsertionMode};
pub use config::{ClientConfig, Endpoint, TransportKind};
pub use cooperative::AsyncClient;
pub use error::{Result, SkyError};
pub use http::{check_status, decode_response, HttpMethod, HttpRequest, HttpResponse};
pub use reshape::{denormalize, normalize, AggregateRow};
pub use transport::{AsyncTransport, Transport};
pub use types::{DataType, Event, FromLooseInput, Property, Query, Table};
