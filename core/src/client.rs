//! Stateless request builder and response parser for the Sky API.
//!
//! # Design
//! `SkyClient` holds only the endpoint and carries no mutable state between
//! calls. Each public operation is turned into an `Operation<T>`: the
//! `HttpRequest` to send plus the parser for its response. Building an
//! operation performs every local check (`MissingArgument`), so a failing
//! precondition never reaches a transport. `BlockingClient` and
//! `AsyncClient` only differ in how they execute the request between
//! `build` and `finish`.

use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;

use crate::codec::{resolve_method, InsertionMode};
use crate::config::Endpoint;
use crate::error::Result;
use crate::http::{check_status, decode_response, HttpMethod, HttpRequest, HttpResponse};
use crate::resources::{self, parse_entity, parse_list, parse_nothing};
use crate::types::{Event, Property, Query, Table};

/// How much of a successful response an operation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    Json,
    /// Only the status matters; any 2xx body is accepted unread.
    Ignored,
}

/// A request together with the parser for its response.
#[derive(Debug)]
pub struct Operation<T> {
    request: HttpRequest,
    body: Body,
    parse: fn(Value) -> Result<T>,
}

impl<T> Operation<T> {
    fn new(request: HttpRequest, parse: fn(Value) -> Result<T>) -> Self {
        Self {
            request,
            body: Body::Json,
            parse,
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Interpret the response to this operation's request.
    pub fn finish(self, response: &HttpResponse) -> Result<T> {
        debug!(
            "{} {}: {} -> {} {}",
            self.request.method,
            self.request.path,
            self.request.body.as_deref().unwrap_or(""),
            response.status,
            response.body
        );
        let body = match self.body {
            Body::Json => decode_response(response)?,
            Body::Ignored => {
                check_status(response)?;
                Value::Null
            }
        };
        (self.parse)(body)
    }
}

impl Operation<()> {
    fn status_only(request: HttpRequest) -> Self {
        Self {
            request,
            body: Body::Ignored,
            parse: parse_nothing,
        }
    }
}

/// Synchronous, stateless builder for Sky operations.
///
/// Builds `Operation` values without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkyClient {
    endpoint: Endpoint,
}

impl SkyClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    // Tables

    pub fn get_tables(&self) -> Operation<Vec<Table>> {
        let request = HttpRequest::new(HttpMethod::Get, resources::TABLES_PATH.to_string());
        Operation::new(request, parse_list)
    }

    pub fn get_table(&self, name: &str) -> Result<Operation<Table>> {
        let request = HttpRequest::new(HttpMethod::Get, resources::table_path(name)?);
        Ok(Operation::new(request, parse_entity))
    }

    pub fn create_table(&self, table: &Table) -> Result<Operation<Table>> {
        let payload = resources::table_payload(table)?;
        let request =
            HttpRequest::with_json(HttpMethod::Post, resources::TABLES_PATH.to_string(), &payload)?;
        Ok(Operation::new(request, parse_entity))
    }

    pub fn delete_table(&self, table: &Table) -> Result<Operation<()>> {
        let request = HttpRequest::new(HttpMethod::Delete, resources::table_path(&table.name)?);
        Ok(Operation::status_only(request))
    }

    // Properties

    pub fn get_properties(&self, table: &Table) -> Result<Operation<Vec<Property>>> {
        let request = HttpRequest::new(HttpMethod::Get, resources::properties_path(&table.name)?);
        Ok(Operation::new(request, parse_list))
    }

    pub fn get_property(&self, table: &Table, name: &str) -> Result<Operation<Property>> {
        let path = resources::property_path(&table.name, name)?;
        let request = HttpRequest::new(HttpMethod::Get, path);
        Ok(Operation::new(request, parse_entity))
    }

    pub fn create_property(
        &self,
        table: &Table,
        property: &Property,
    ) -> Result<Operation<Property>> {
        let path = resources::properties_path(&table.name)?;
        let payload = resources::property_payload(property)?;
        let request = HttpRequest::with_json(HttpMethod::Post, path, &payload)?;
        Ok(Operation::new(request, parse_entity))
    }

    pub fn update_property(
        &self,
        table: &Table,
        property: &Property,
    ) -> Result<Operation<Property>> {
        let path = resources::property_path(&table.name, &property.name)?;
        let payload = resources::property_payload(property)?;
        let request = HttpRequest::with_json(HttpMethod::Patch, path, &payload)?;
        Ok(Operation::new(request, parse_entity))
    }

    pub fn delete_property(&self, table: &Table, property: &Property) -> Result<Operation<()>> {
        let path = resources::property_path(&table.name, &property.name)?;
        Ok(Operation::status_only(HttpRequest::new(HttpMethod::Delete, path)))
    }

    // Objects and events

    /// Fold every event of `src_object_id` into `dest_object_id`. The server
    /// deletes the source object afterwards.
    pub fn merge_objects(
        &self,
        table: &Table,
        dest_object_id: &str,
        src_object_id: &str,
    ) -> Result<Operation<()>> {
        let path = resources::merge_path(&table.name, dest_object_id)?;
        let payload = resources::merge_payload(src_object_id)?;
        let request = HttpRequest::with_json(HttpMethod::Post, path, &payload)?;
        Ok(Operation::status_only(request))
    }

    pub fn get_events(&self, table: &Table, object_id: &str) -> Result<Operation<Vec<Event>>> {
        let path = resources::events_path(&table.name, object_id)?;
        let request = HttpRequest::new(HttpMethod::Get, path);
        Ok(Operation::new(request, parse_list))
    }

    pub fn get_event(
        &self,
        table: &Table,
        object_id: &str,
        timestamp: &DateTime<Utc>,
    ) -> Result<Operation<Event>> {
        let path = resources::event_path(&table.name, object_id, timestamp)?;
        Ok(Operation::new(HttpRequest::new(HttpMethod::Get, path), parse_entity))
    }

    /// Write `event` at its timestamp. The mode decides the verb: `Replace`
    /// sends `PUT`, `Merge` sends `PATCH`. The server's copy of the event is
    /// returned since a merge may have combined it with existing fields.
    pub fn add_event(
        &self,
        table: &Table,
        object_id: &str,
        event: &Event,
        mode: InsertionMode,
    ) -> Result<Operation<Event>> {
        let path = resources::event_path(&table.name, object_id, &event.timestamp)?;
        let payload = resources::to_payload(event)?;
        let request = HttpRequest::with_json(resolve_method(mode), path, &payload)?;
        Ok(Operation::new(request, parse_entity))
    }

    pub fn delete_event(
        &self,
        table: &Table,
        object_id: &str,
        event: &Event,
    ) -> Result<Operation<()>> {
        let path = resources::event_path(&table.name, object_id, &event.timestamp)?;
        Ok(Operation::status_only(HttpRequest::new(HttpMethod::Delete, path)))
    }

    // Queries

    /// Submit a query. The result is returned as the server sent it; use
    /// `reshape::denormalize` to flatten grouped results.
    pub fn query(&self, table: &Table, query: &Query) -> Result<Operation<Value>> {
        let path = resources::query_path(&table.name)?;
        let request = HttpRequest::with_json(HttpMethod::Post, path, &query.payload())?;
        Ok(Operation::new(request, Ok))
    }

    pub fn stats(&self, table: &Table) -> Result<Operation<Value>> {
        let request = HttpRequest::new(HttpMethod::Get, resources::stats_path(&table.name)?);
        Ok(Operation::new(request, Ok))
    }

    // Utility

    pub fn ping(&self) -> Operation<()> {
        let request = HttpRequest::new(HttpMethod::Get, resources::PING_PATH.to_string());
        Operation::status_only(request)
    }
}

impl Default for SkyClient {
    fn default() -> Self {
        Self::new(Endpoint::default())
    }
}

/// Adapter used by both client façades: any failure becomes `false`.
pub(crate) fn ping_outcome(outcome: Result<()>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(err) => {
            debug!("ping failed: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_timestamp;
    use crate::error::SkyError;
    use crate::types::DataType;
    use serde_json::json;

    fn client() -> SkyClient {
        SkyClient::default()
    }

    fn users() -> Table {
        Table::new("users")
    }

    fn body(request: &HttpRequest) -> Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn get_tables_produces_correct_request() {
        let op = client().get_tables();
        assert_eq!(op.request().method, HttpMethod::Get);
        assert_eq!(op.request().path, "/tables");
        assert!(op.request().body.is_none());
    }

    #[test]
    fn create_table_sends_name_only() {
        let op = client().create_table(&users()).unwrap();
        assert_eq!(op.request().method, HttpMethod::Post);
        assert_eq!(op.request().path, "/tables");
        assert_eq!(body(op.request()), json!({"name": "users"}));
    }

    #[test]
    fn update_property_patches_named_property() {
        let property = Property::new("age", DataType::Integer);
        let op = client().update_property(&users(), &property).unwrap();
        assert_eq!(op.request().method, HttpMethod::Patch);
        assert_eq!(op.request().path, "/tables/users/properties/age");
        assert_eq!(
            body(op.request()),
            json!({"name": "age", "transient": false, "data_type": "integer"})
        );
    }

    #[test]
    fn add_event_verb_follows_mode() {
        let event =
            Event::new(parse_timestamp("2013-01-01T00:00:00Z").unwrap()).with("action", "A0");
        let replace = client()
            .add_event(&users(), "obj0", &event, InsertionMode::Replace)
            .unwrap();
        assert_eq!(replace.request().method, HttpMethod::Put);
        let merge = client()
            .add_event(&users(), "obj0", &event, InsertionMode::default())
            .unwrap();
        assert_eq!(merge.request().method, HttpMethod::Patch);
        assert_eq!(
            merge.request().path,
            "/tables/users/objects/obj0/events/2013-01-01T00:00:00.000000Z"
        );
        assert_eq!(
            body(merge.request()),
            json!({"timestamp": "2013-01-01T00:00:00.000000Z", "data": {"action": "A0"}})
        );
    }

    #[test]
    fn merge_objects_posts_source_id() {
        let op = client().merge_objects(&users(), "a", "b").unwrap();
        assert_eq!(op.request().method, HttpMethod::Post);
        assert_eq!(op.request().path, "/tables/users/objects/a/merge");
        assert_eq!(body(op.request()), json!({"id": "b"}));
    }

    #[test]
    fn merge_objects_requires_both_ids() {
        assert!(matches!(
            client().merge_objects(&users(), "", "b").unwrap_err(),
            SkyError::MissingArgument("destination object identifier")
        ));
        assert!(matches!(
            client().merge_objects(&users(), "a", "").unwrap_err(),
            SkyError::MissingArgument("source object identifier")
        ));
    }

    #[test]
    fn query_steps_are_wrapped() {
        let steps = Query::Steps(vec![json!({"type": "selection"})]);
        let op = client().query(&users(), &steps).unwrap();
        assert_eq!(op.request().path, "/tables/users/query");
        assert_eq!(body(op.request()), json!({"steps": [{"type": "selection"}]}));
    }

    #[test]
    fn query_text_is_sent_as_json_string() {
        let op = client().query(&users(), &Query::from("SELECT count()")).unwrap();
        assert_eq!(op.request().body.as_deref(), Some(r#""SELECT count()""#));
    }

    #[test]
    fn finish_parses_entities() {
        let op = client().get_table("users").unwrap();
        let table = op.finish(&ok(r#"{"name":"users"}"#)).unwrap();
        assert_eq!(table, users());
    }

    #[test]
    fn finish_passes_query_results_through() {
        let op = client().stats(&users()).unwrap();
        assert_eq!(op.finish(&ok(r#"{"count":5}"#)).unwrap(), json!({"count": 5}));
    }

    #[test]
    fn finish_surfaces_server_errors() {
        let op = client().get_table("missing").unwrap();
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: r#"{"message":"table not found"}"#.to_string(),
        };
        let err = op.finish(&response).unwrap_err();
        assert!(matches!(err, SkyError::Server { status: 404, .. }));
    }

    #[test]
    fn ping_outcome_swallows_errors() {
        assert!(ping_outcome(Ok(())));
        assert!(!ping_outcome(Err(SkyError::Connection("refused".to_string()))));
    }
}
