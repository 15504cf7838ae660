//! Client façade over an async transport.
//!
//! Same operations and semantics as `BlockingClient`; awaiting a call yields
//! to the runtime until the response arrives, so other tasks keep running.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::client::{ping_outcome, Operation, SkyClient};
use crate::codec::InsertionMode;
use crate::config::Endpoint;
use crate::error::Result;
use crate::transport::AsyncTransport;
use crate::types::{Event, Property, Query, Table};

/// Sky client for async callers.
#[derive(Debug, Clone)]
pub struct AsyncClient<T> {
    client: SkyClient,
    transport: T,
}

impl<T: AsyncTransport> AsyncClient<T> {
    pub fn new(endpoint: Endpoint, transport: T) -> Self {
        Self {
            client: SkyClient::new(endpoint),
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.client.endpoint()
    }

    async fn run<R>(&self, operation: Operation<R>) -> Result<R> {
        let response = self
            .transport
            .execute(self.client.endpoint(), operation.request())
            .await?;
        operation.finish(&response)
    }

    pub async fn get_tables(&self) -> Result<Vec<Table>> {
        self.run(self.client.get_tables()).await
    }

    pub async fn get_table(&self, name: &str) -> Result<Table> {
        self.run(self.client.get_table(name)?).await
    }

    pub async fn create_table(&self, table: &Table) -> Result<Table> {
        self.run(self.client.create_table(table)?).await
    }

    pub async fn delete_table(&self, table: &Table) -> Result<()> {
        self.run(self.client.delete_table(table)?).await
    }

    pub async fn get_properties(&self, table: &Table) -> Result<Vec<Property>> {
        self.run(self.client.get_properties(table)?).await
    }

    pub async fn get_property(&self, table: &Table, name: &str) -> Result<Property> {
        self.run(self.client.get_property(table, name)?).await
    }

    pub async fn create_property(&self, table: &Table, property: &Property) -> Result<Property> {
        self.run(self.client.create_property(table, property)?).await
    }

    pub async fn update_property(&self, table: &Table, property: &Property) -> Result<Property> {
        self.run(self.client.update_property(table, property)?).await
    }

    pub async fn delete_property(&self, table: &Table, property: &Property) -> Result<()> {
        self.run(self.client.delete_property(table, property)?).await
    }

    pub async fn merge_objects(
        &self,
        table: &Table,
        dest_object_id: &str,
        src_object_id: &str,
    ) -> Result<()> {
        self.run(self.client.merge_objects(table, dest_object_id, src_object_id)?)
            .await
    }

    pub async fn get_events(&self, table: &Table, object_id: &str) -> Result<Vec<Event>> {
        self.run(self.client.get_events(table, object_id)?).await
    }

    pub async fn get_event(
        &self,
        table: &Table,
        object_id: &str,
        timestamp: &DateTime<Utc>,
    ) -> Result<Event> {
        self.run(self.client.get_event(table, object_id, timestamp)?).await
    }

    pub async fn add_event(
        &self,
        table: &Table,
        object_id: &str,
        event: &Event,
        mode: InsertionMode,
    ) -> Result<Event> {
        self.run(self.client.add_event(table, object_id, event, mode)?)
            .await
    }

    pub async fn delete_event(&self, table: &Table, object_id: &str, event: &Event) -> Result<()> {
        self.run(self.client.delete_event(table, object_id, event)?).await
    }

    pub async fn query(&self, table: &Table, query: &Query) -> Result<Value> {
        self.run(self.client.query(table, query)?).await
    }

    pub async fn stats(&self, table: &Table) -> Result<Value> {
        self.run(self.client.stats(table)?).await
    }

    /// `true` only when `/ping` answered with a 2xx status.
    pub async fn ping(&self) -> bool {
        ping_outcome(self.run(self.client.ping()).await)
    }
}
