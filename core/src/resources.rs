//! Resource paths, request payloads and entity decoding.
//!
//! Every path builder checks its identifiers first: an empty table name,
//! object id or property name fails with `SkyError::MissingArgument` before
//! a request exists.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::codec::canonicalize_timestamp;
use crate::error::{Result, SkyError};
use crate::types::{Property, Table};

pub const TABLES_PATH: &str = "/tables";
pub const PING_PATH: &str = "/ping";

fn require<'a>(value: &'a str, what: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(SkyError::MissingArgument(what));
    }
    Ok(value)
}

pub fn table_path(table: &str) -> Result<String> {
    let table = require(table, "table name")?;
    Ok(format!("{TABLES_PATH}/{table}"))
}

pub fn properties_path(table: &str) -> Result<String> {
    Ok(format!("{}/properties", table_path(table)?))
}

pub fn property_path(table: &str, property: &str) -> Result<String> {
    let property = require(property, "property name")?;
    Ok(format!("{}/{property}", properties_path(table)?))
}

fn object_path(table: &str, object_id: &str, what: &'static str) -> Result<String> {
    let object_id = require(object_id, what)?;
    Ok(format!("{}/objects/{object_id}", table_path(table)?))
}

pub fn events_path(table: &str, object_id: &str) -> Result<String> {
    Ok(format!("{}/events", object_path(table, object_id, "object identifier")?))
}

pub fn event_path(table: &str, object_id: &str, timestamp: &DateTime<Utc>) -> Result<String> {
    Ok(format!(
        "{}/{}",
        events_path(table, object_id)?,
        canonicalize_timestamp(timestamp)
    ))
}

pub fn merge_path(table: &str, dest_object_id: &str) -> Result<String> {
    Ok(format!(
        "{}/merge",
        object_path(table, dest_object_id, "destination object identifier")?
    ))
}

pub fn query_path(table: &str) -> Result<String> {
    Ok(format!("{}/query", table_path(table)?))
}

pub fn stats_path(table: &str) -> Result<String> {
    Ok(format!("{}/stats", table_path(table)?))
}

/// Body for table creation. Server-assigned metadata is never sent back.
pub fn table_payload(table: &Table) -> Result<Value> {
    let name = require(&table.name, "table name")?;
    Ok(json!({ "name": name }))
}

pub fn property_payload(property: &Property) -> Result<Value> {
    require(&property.name, "property name")?;
    to_payload(property)
}

pub fn merge_payload(src_object_id: &str) -> Result<Value> {
    let src = require(src_object_id, "source object identifier")?;
    Ok(json!({ "id": src }))
}

pub fn to_payload<T: Serialize>(entity: &T) -> Result<Value> {
    serde_json::to_value(entity).map_err(|e| SkyError::Serialization(e.to_string()))
}

/// Decode a response body into one entity.
pub fn parse_entity<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| SkyError::Deserialization(e.to_string()))
}

/// Decode a response body holding an array of entities.
pub fn parse_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>> {
    parse_entity(body)
}

/// Parser for responses whose body carries nothing the caller needs.
pub fn parse_nothing(_body: Value) -> Result<()> {
    Ok(())
}
