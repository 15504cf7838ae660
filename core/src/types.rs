//! Domain entities for the Sky API.
//!
//! # Design
//! Entities are strictly typed inside the crate. Loose JSON (a bare table
//! name, a hand-written event object) is converted once at the boundary
//! through `FromLooseInput`, which also applies the "required field" checks
//! that raise `SkyError::MissingArgument`.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::{self, truncate_to_micros};
use crate::error::{Result, SkyError};

/// A named collection of objects, their events and a property schema.
///
/// Any field the server adds beyond `name` is kept in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Map::new(),
        }
    }
}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Table::new(name)
    }
}

/// Value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Factor,
    String,
    Integer,
    Float,
    Boolean,
}

/// A typed field usable in event data. Transient properties are not
/// persisted across events by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub transient: bool,
    pub data_type: DataType,
}

impl Property {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            transient: false,
            data_type,
        }
    }

    pub fn transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }
}

/// A timestamped set of property values for one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(with = "codec::canonical")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Event {
    /// An event with no data. The timestamp is converted to UTC and
    /// truncated to microseconds.
    pub fn new<Tz: TimeZone>(timestamp: DateTime<Tz>) -> Self {
        Self {
            timestamp: truncate_to_micros(timestamp.with_timezone(&Utc)),
            data: Map::new(),
        }
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(property.into(), value.into());
        self
    }

    /// Canonical timestamp string used in the event's resource path.
    pub fn canonical_timestamp(&self) -> String {
        codec::canonicalize_timestamp(&self.timestamp)
    }
}

/// A query submitted to a table, sent as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Query-language text.
    Text(String),
    /// A bare sequence of steps, sent as `{"steps": [...]}`.
    Steps(Vec<Value>),
    /// A complete query definition object.
    Definition(Map<String, Value>),
}

impl Query {
    /// JSON body for `POST /tables/{name}/query`.
    pub fn payload(&self) -> Value {
        match self {
            Query::Text(text) => Value::String(text.clone()),
            Query::Steps(steps) => {
                let mut wrapper = Map::new();
                wrapper.insert("steps".to_string(), Value::Array(steps.clone()));
                Value::Object(wrapper)
            }
            Query::Definition(definition) => Value::Object(definition.clone()),
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Text(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Text(text)
    }
}

impl From<Vec<Value>> for Query {
    fn from(steps: Vec<Value>) -> Self {
        Query::Steps(steps)
    }
}

/// Conversion from loosely shaped JSON into a typed entity.
pub trait FromLooseInput: Sized {
    fn from_loose_input(value: Value) -> Result<Self>;
}

fn deserialize<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| SkyError::Deserialization(e.to_string()))
}

impl FromLooseInput for Table {
    /// Accepts a table name or a table object.
    fn from_loose_input(value: Value) -> Result<Self> {
        let table: Table = match value {
            Value::Null => return Err(SkyError::MissingArgument("table")),
            Value::String(name) => Table::new(name),
            other => deserialize(other)?,
        };
        if table.name.is_empty() {
            return Err(SkyError::MissingArgument("table name"));
        }
        Ok(table)
    }
}

impl FromLooseInput for Property {
    fn from_loose_input(value: Value) -> Result<Self> {
        if value.is_null() {
            return Err(SkyError::MissingArgument("property"));
        }
        let property: Property = deserialize(value)?;
        if property.name.is_empty() {
            return Err(SkyError::MissingArgument("property name"));
        }
        Ok(property)
    }
}

impl FromLooseInput for Event {
    fn from_loose_input(value: Value) -> Result<Self> {
        if value.is_null() {
            return Err(SkyError::MissingArgument("event"));
        }
        match value.get("timestamp") {
            None | Some(Value::Null) => return Err(SkyError::MissingArgument("event timestamp")),
            Some(Value::String(text)) => {
                codec::parse_timestamp(text)?;
            }
            Some(_) => {}
        }
        deserialize(value)
    }
}

impl FromLooseInput for Query {
    /// Strings are query-language text, arrays are step sequences, objects
    /// are full definitions.
    fn from_loose_input(value: Value) -> Result<Self> {
        match value {
            Value::Null => Err(SkyError::MissingArgument("query definition")),
            Value::String(text) => Ok(Query::Text(text)),
            Value::Array(steps) => Ok(Query::Steps(steps)),
            Value::Object(definition) => Ok(Query::Definition(definition)),
            other => Err(SkyError::Deserialization(format!(
                "unsupported query definition: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_keeps_server_metadata() {
        let table: Table = serde_json::from_value(json!({"name": "users", "shards": 4})).unwrap();
        assert_eq!(table.name, "users");
        assert_eq!(table.metadata.get("shards"), Some(&json!(4)));
        assert_eq!(serde_json::to_value(&table).unwrap(), json!({"name": "users", "shards": 4}));
    }

    #[test]
    fn property_defaults_transient_to_false() {
        let property: Property =
            serde_json::from_value(json!({"name": "age", "data_type": "integer"})).unwrap();
        assert_eq!(property, Property::new("age", DataType::Integer));
    }

    #[test]
    fn property_serializes_wire_shape() {
        let property = Property::new("action", DataType::Factor).transient(true);
        assert_eq!(
            serde_json::to_value(&property).unwrap(),
            json!({"name": "action", "transient": true, "data_type": "factor"})
        );
    }

    #[test]
    fn event_serializes_canonical_timestamp() {
        let event = Event::from_loose_input(json!({
            "timestamp": "2013-01-01T01:00:00+01:00",
            "data": {"age": 50}
        }))
        .unwrap();
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"timestamp": "2013-01-01T00:00:00.000000Z", "data": {"age": 50}})
        );
    }

    #[test]
    fn event_without_timestamp_is_missing_argument() {
        let err = Event::from_loose_input(json!({"data": {"action": "A0"}})).unwrap_err();
        assert!(matches!(err, SkyError::MissingArgument("event timestamp")));
        let err = Event::from_loose_input(Value::Null).unwrap_err();
        assert!(matches!(err, SkyError::MissingArgument("event")));
    }

    #[test]
    fn table_from_name_or_object() {
        assert_eq!(Table::from_loose_input(json!("users")).unwrap(), Table::new("users"));
        assert_eq!(
            Table::from_loose_input(json!({"name": "users"})).unwrap(),
            Table::new("users")
        );
        assert!(matches!(
            Table::from_loose_input(json!("")).unwrap_err(),
            SkyError::MissingArgument("table name")
        ));
        assert!(matches!(
            Table::from_loose_input(Value::Null).unwrap_err(),
            SkyError::MissingArgument("table")
        ));
    }

    #[test]
    fn event_with_unparseable_timestamp_is_invalid_timestamp() {
        let err =
            Event::from_loose_input(json!({"timestamp": "yesterday", "data": {}})).unwrap_err();
        match err {
            SkyError::InvalidTimestamp { input, .. } => assert_eq!(input, "yesterday"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn property_with_empty_name_is_missing_argument() {
        let err =
            Property::from_loose_input(json!({"name": "", "data_type": "string"})).unwrap_err();
        assert!(matches!(err, SkyError::MissingArgument("property name")));
    }

    #[test]
    fn step_sequences_are_wrapped() {
        let query = Query::from_loose_input(json!([{"type": "selection"}])).unwrap();
        assert_eq!(query.payload(), json!({"steps": [{"type": "selection"}]}));
    }

    #[test]
    fn text_and_definitions_are_sent_verbatim() {
        let text = Query::from("SELECT count() AS count GROUP BY action");
        assert_eq!(text.payload(), json!("SELECT count() AS count GROUP BY action"));

        let definition = Query::from_loose_input(json!({"statements": "SELECT count()"})).unwrap();
        assert_eq!(definition.payload(), json!({"statements": "SELECT count()"}));
    }

    #[test]
    fn null_query_is_missing_argument() {
        let err = Query::from_loose_input(Value::Null).unwrap_err();
        assert!(matches!(err, SkyError::MissingArgument("query definition")));
    }
}
