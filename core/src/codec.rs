//! Event timestamp encoding and insertion-mode resolution.
//!
//! # Design
//! Sky addresses an event by its object and its timestamp, so the textual
//! form of a timestamp is part of the resource path. Every timestamp the
//! client emits goes through `canonicalize_timestamp`: UTC, microsecond
//! precision, always six fractional digits, `Z` suffix. Because that form is
//! fixed-width, canonical strings sort in chronological order.
//!
//! The insertion mode travels as the HTTP verb: `PUT` overwrites the event at
//! a timestamp, `PATCH` merges the given fields into it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Timelike, Utc};

use crate::error::{Result, SkyError};
use crate::http::HttpMethod;

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Format an instant as `YYYY-MM-DDTHH:MM:SS.ssssssZ` in UTC.
///
/// Digits beyond the microsecond are dropped, not rounded.
pub fn canonicalize_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .format(CANONICAL_FORMAT)
        .to_string()
}

/// Parse RFC 3339 text (`Z` or a numeric offset) into a UTC instant truncated
/// to microseconds.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|instant| truncate_to_micros(instant.with_timezone(&Utc)))
        .map_err(|e| SkyError::InvalidTimestamp {
            input: text.to_string(),
            reason: e.to_string(),
        })
}

/// Drop sub-microsecond precision so two instants that share a canonical
/// string also compare equal.
pub fn truncate_to_micros(instant: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = instant.nanosecond() / 1_000 * 1_000;
    instant.with_nanosecond(nanos).unwrap_or(instant)
}

/// Serde adapter writing timestamps in canonical form.
pub mod canonical {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        instant: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::canonicalize_timestamp(instant))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_timestamp(&text).map_err(serde::de::Error::custom)
    }
}

/// How an event is written when one already exists at its timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertionMode {
    /// Overwrite the whole event.
    Replace,
    /// Combine field by field, keeping fields the new event does not mention.
    #[default]
    Merge,
}

impl FromStr for InsertionMode {
    type Err = SkyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(SkyError::InvalidInsertionMode(other.to_string())),
        }
    }
}

impl fmt::Display for InsertionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => f.write_str("replace"),
            Self::Merge => f.write_str("merge"),
        }
    }
}

/// The HTTP verb that carries `mode` to the server.
pub fn resolve_method(mode: InsertionMode) -> HttpMethod {
    match mode {
        InsertionMode::Replace => HttpMethod::Put,
        InsertionMode::Merge => HttpMethod::Patch,
    }
}

/// `resolve_method` for a mode given by name.
pub fn resolve_method_named(mode: &str) -> Result<HttpMethod> {
    mode.parse().map(resolve_method)
}
