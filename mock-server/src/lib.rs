//! In-memory stand-in for the Sky HTTP API.
//!
//! Implements tables, properties, per-object events with replace (`PUT`) and
//! merge (`PATCH`) semantics, object merging, stats and `/ping`. The query
//! endpoint does not evaluate anything: it answers every query with the
//! table's event count. Errors are JSON bodies of the form
//! `{"message": "..."}`, like the real server.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

const DATA_TYPES: [&str; 5] = ["factor", "string", "integer", "float", "boolean"];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub transient: bool,
    pub data_type: String,
}

#[derive(Deserialize)]
pub struct PropertyPatch {
    pub name: Option<String>,
    pub transient: Option<bool>,
    pub data_type: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub timestamp: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct MergeRequest {
    pub id: String,
}

/// Events of one object keyed by canonical timestamp. Canonical timestamps
/// are fixed-width, so key order is time order.
type Timeline = BTreeMap<String, Map<String, Value>>;

#[derive(Default)]
pub struct TableState {
    properties: Vec<Property>,
    objects: HashMap<String, Timeline>,
}

impl TableState {
    fn event_count(&self) -> usize {
        self.objects.values().map(BTreeMap::len).sum()
    }

    fn check_data(&self, data: &Map<String, Value>) -> Result<(), ApiError> {
        for key in data.keys() {
            if !self.properties.iter().any(|p| &p.name == key) {
                return Err(ApiError::bad_request(format!("property not found: {key}")));
            }
        }
        Ok(())
    }
}

pub type Db = Arc<RwLock<BTreeMap<String, TableState>>>;

/// Error response carrying a JSON `message`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(BTreeMap::new()));
    Router::new()
        .route("/ping", get(ping))
        .route("/tables", get(list_tables).post(create_table))
        .route("/tables/{table}", get(get_table).delete(delete_table))
        .route(
            "/tables/{table}/properties",
            get(list_properties).post(create_property),
        )
        .route(
            "/tables/{table}/properties/{property}",
            get(get_property).patch(update_property).delete(delete_property),
        )
        .route("/tables/{table}/objects/{id}/events", get(list_events))
        .route(
            "/tables/{table}/objects/{id}/events/{timestamp}",
            get(get_event)
                .put(replace_event)
                .patch(merge_event)
                .delete(delete_event),
        )
        .route("/tables/{table}/objects/{id}/merge", post(merge_objects))
        .route("/tables/{table}/query", post(query))
        .route("/tables/{table}/stats", get(stats))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `2013-01-01T00:00:00Z` and `2013-01-01T00:00:00.000000+00:00` both map to
/// `2013-01-01T00:00:00.000000Z`.
pub fn canonical_timestamp(text: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(text).ok().map(|ts| {
        ts.with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%S%.6fZ")
            .to_string()
    })
}

fn timestamp_param(text: &str) -> Result<String, ApiError> {
    canonical_timestamp(text)
        .ok_or_else(|| ApiError::bad_request(format!("invalid timestamp: {text}")))
}

fn table_ref<'a>(
    tables: &'a BTreeMap<String, TableState>,
    name: &str,
) -> Result<&'a TableState, ApiError> {
    tables
        .get(name)
        .ok_or_else(|| ApiError::not_found(format!("table not found: {name}")))
}

fn table_mut<'a>(
    tables: &'a mut BTreeMap<String, TableState>,
    name: &str,
) -> Result<&'a mut TableState, ApiError> {
    tables
        .get_mut(name)
        .ok_or_else(|| ApiError::not_found(format!("table not found: {name}")))
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "ok" }))
}

// --- tables ---

async fn list_tables(State(db): State<Db>) -> Json<Vec<Table>> {
    let tables = db.read().await;
    Json(tables.keys().map(|name| Table { name: name.clone() }).collect())
}

async fn create_table(
    State(db): State<Db>,
    Json(input): Json<Table>,
) -> Result<Json<Table>, ApiError> {
    if input.name.is_empty() {
        return Err(ApiError::bad_request("table name required"));
    }
    let mut tables = db.write().await;
    if tables.contains_key(&input.name) {
        return Err(ApiError::conflict(format!("table already exists: {}", input.name)));
    }
    tables.insert(input.name.clone(), TableState::default());
    Ok(Json(input))
}

async fn get_table(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<Json<Table>, ApiError> {
    let tables = db.read().await;
    table_ref(&tables, &name)?;
    Ok(Json(Table { name }))
}

async fn delete_table(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut tables = db.write().await;
    tables
        .remove(&name)
        .map(|_| StatusCode::OK)
        .ok_or_else(|| ApiError::not_found(format!("table not found: {name}")))
}

// --- properties ---

async fn list_properties(
    State(db): State<Db>,
    Path(table): Path<String>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let tables = db.read().await;
    Ok(Json(table_ref(&tables, &table)?.properties.clone()))
}

async fn create_property(
    State(db): State<Db>,
    Path(table): Path<String>,
    Json(input): Json<Property>,
) -> Result<Json<Property>, ApiError> {
    if input.name.is_empty() {
        return Err(ApiError::bad_request("property name required"));
    }
    if !DATA_TYPES.contains(&input.data_type.as_str()) {
        return Err(ApiError::bad_request(format!("invalid data type: {}", input.data_type)));
    }
    let mut tables = db.write().await;
    let state = table_mut(&mut tables, &table)?;
    if state.properties.iter().any(|p| p.name == input.name) {
        return Err(ApiError::conflict(format!("property already exists: {}", input.name)));
    }
    state.properties.push(input.clone());
    Ok(Json(input))
}

async fn get_property(
    State(db): State<Db>,
    Path((table, property)): Path<(String, String)>,
) -> Result<Json<Property>, ApiError> {
    let tables = db.read().await;
    table_ref(&tables, &table)?
        .properties
        .iter()
        .find(|p| p.name == property)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("property not found: {property}")))
}

async fn update_property(
    State(db): State<Db>,
    Path((table, property)): Path<(String, String)>,
    Json(input): Json<PropertyPatch>,
) -> Result<Json<Property>, ApiError> {
    let mut tables = db.write().await;
    let state = table_mut(&mut tables, &table)?;
    if let Some(name) = &input.name {
        if name != &property && state.properties.iter().any(|p| &p.name == name) {
            return Err(ApiError::conflict(format!("property already exists: {name}")));
        }
    }
    let existing = state
        .properties
        .iter_mut()
        .find(|p| p.name == property)
        .ok_or_else(|| ApiError::not_found(format!("property not found: {property}")))?;
    if let Some(name) = input.name {
        existing.name = name;
    }
    if let Some(transient) = input.transient {
        existing.transient = transient;
    }
    if let Some(data_type) = input.data_type {
        existing.data_type = data_type;
    }
    Ok(Json(existing.clone()))
}

async fn delete_property(
    State(db): State<Db>,
    Path((table, property)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let mut tables = db.write().await;
    let state = table_mut(&mut tables, &table)?;
    let before = state.properties.len();
    state.properties.retain(|p| p.name != property);
    if state.properties.len() == before {
        return Err(ApiError::not_found(format!("property not found: {property}")));
    }
    Ok(StatusCode::OK)
}

// --- events ---

async fn list_events(
    State(db): State<Db>,
    Path((table, id)): Path<(String, String)>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let tables = db.read().await;
    let state = table_ref(&tables, &table)?;
    let events = state
        .objects
        .get(&id)
        .map(|timeline| {
            timeline
                .iter()
                .map(|(timestamp, data)| Event {
                    timestamp: timestamp.clone(),
                    data: data.clone(),
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(Json(events))
}

async fn get_event(
    State(db): State<Db>,
    Path((table, id, timestamp)): Path<(String, String, String)>,
) -> Result<Json<Event>, ApiError> {
    let timestamp = timestamp_param(&timestamp)?;
    let tables = db.read().await;
    let data = table_ref(&tables, &table)?
        .objects
        .get(&id)
        .and_then(|timeline| timeline.get(&timestamp))
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("event not found: {id} @ {timestamp}")))?;
    Ok(Json(Event { timestamp, data }))
}

async fn replace_event(
    State(db): State<Db>,
    Path((table, id, timestamp)): Path<(String, String, String)>,
    Json(input): Json<Event>,
) -> Result<Json<Event>, ApiError> {
    write_event(db, table, id, timestamp, input, false).await
}

async fn merge_event(
    State(db): State<Db>,
    Path((table, id, timestamp)): Path<(String, String, String)>,
    Json(input): Json<Event>,
) -> Result<Json<Event>, ApiError> {
    write_event(db, table, id, timestamp, input, true).await
}

async fn write_event(
    db: Db,
    table: String,
    id: String,
    timestamp: String,
    input: Event,
    merge: bool,
) -> Result<Json<Event>, ApiError> {
    let timestamp = timestamp_param(&timestamp)?;
    let mut tables = db.write().await;
    let state = table_mut(&mut tables, &table)?;
    state.check_data(&input.data)?;

    let slot = state
        .objects
        .entry(id)
        .or_default()
        .entry(timestamp.clone())
        .or_default();
    if merge {
        slot.extend(input.data);
    } else {
        *slot = input.data;
    }
    Ok(Json(Event {
        timestamp,
        data: slot.clone(),
    }))
}

async fn delete_event(
    State(db): State<Db>,
    Path((table, id, timestamp)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiError> {
    let timestamp = timestamp_param(&timestamp)?;
    let mut tables = db.write().await;
    table_mut(&mut tables, &table)?
        .objects
        .get_mut(&id)
        .and_then(|timeline| timeline.remove(&timestamp))
        .map(|_| StatusCode::OK)
        .ok_or_else(|| ApiError::not_found(format!("event not found: {id} @ {timestamp}")))
}

/// Folds the source object's events into the destination and deletes the
/// source. The destination keeps its own event on a timestamp collision.
async fn merge_objects(
    State(db): State<Db>,
    Path((table, dest)): Path<(String, String)>,
    Json(input): Json<MergeRequest>,
) -> Result<StatusCode, ApiError> {
    let mut tables = db.write().await;
    let state = table_mut(&mut tables, &table)?;
    if input.id == dest {
        return Ok(StatusCode::OK);
    }
    let source = state.objects.remove(&input.id).unwrap_or_default();
    let timeline = state.objects.entry(dest).or_default();
    for (timestamp, data) in source {
        timeline.entry(timestamp).or_insert(data);
    }
    Ok(StatusCode::OK)
}

// --- queries ---

async fn query(
    State(db): State<Db>,
    Path(table): Path<String>,
    Json(_query): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let tables = db.read().await;
    let count = table_ref(&tables, &table)?.event_count();
    Ok(Json(json!({ "count": count })))
}

async fn stats(State(db): State<Db>, Path(table): Path<String>) -> Result<Json<Value>, ApiError> {
    let tables = db.read().await;
    let count = table_ref(&tables, &table)?.event_count();
    Ok(Json(json!({ "count": count })))
}
