//! Client façade over a blocking transport.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::client::{ping_outcome, Operation, SkyClient};
use crate::codec::InsertionMode;
use crate::config::Endpoint;
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{Event, Property, Query, Table};

/// Sky client whose calls return once the server has answered.
///
/// Each call issues at most one request. The client holds no state besides
/// the endpoint and the transport, so it can be shared between threads
/// whenever the transport can.
#[derive(Debug, Clone)]
pub struct BlockingClient<T> {
    client: SkyClient,
    transport: T,
}

impl<T: Transport> BlockingClient<T> {
    pub fn new(endpoint: Endpoint, transport: T) -> Self {
        Self {
            client: SkyClient::new(endpoint),
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.client.endpoint()
    }

    fn run<R>(&self, operation: Operation<R>) -> Result<R> {
        let response = self.transport.execute(self.client.endpoint(), operation.request())?;
        operation.finish(&response)
    }

    pub fn get_tables(&self) -> Result<Vec<Table>> {
        self.run(self.client.get_tables())
    }

    pub fn get_table(&self, name: &str) -> Result<Table> {
        self.run(self.client.get_table(name)?)
    }

    pub fn create_table(&self, table: &Table) -> Result<Table> {
        self.run(self.client.create_table(table)?)
    }

    pub fn delete_table(&self, table: &Table) -> Result<()> {
        self.run(self.client.delete_table(table)?)
    }

    pub fn get_properties(&self, table: &Table) -> Result<Vec<Property>> {
        self.run(self.client.get_properties(table)?)
    }

    pub fn get_property(&self, table: &Table, name: &str) -> Result<Property> {
        self.run(self.client.get_property(table, name)?)
    }

    pub fn create_property(&self, table: &Table, property: &Property) -> Result<Property> {
        self.run(self.client.create_property(table, property)?)
    }

    pub fn update_property(&self, table: &Table, property: &Property) -> Result<Property> {
        self.run(self.client.update_property(table, property)?)
    }

    pub fn delete_property(&self, table: &Table, property: &Property) -> Result<()> {
        self.run(self.client.delete_property(table, property)?)
    }

    pub fn merge_objects(
        &self,
        table: &Table,
        dest_object_id: &str,
        src_object_id: &str,
    ) -> Result<()> {
        self.run(self.client.merge_objects(table, dest_object_id, src_object_id)?)
    }

    pub fn get_events(&self, table: &Table, object_id: &str) -> Result<Vec<Event>> {
        self.run(self.client.get_events(table, object_id)?)
    }

    pub fn get_event(
        &self,
        table: &Table,
        object_id: &str,
        timestamp: &DateTime<Utc>,
    ) -> Result<Event> {
        self.run(self.client.get_event(table, object_id, timestamp)?)
    }

    pub fn add_event(
        &self,
        table: &Table,
        object_id: &str,
        event: &Event,
        mode: InsertionMode,
    ) -> Result<Event> {
        self.run(self.client.add_event(table, object_id, event, mode)?)
    }

    pub fn delete_event(&self, table: &Table, object_id: &str, event: &Event) -> Result<()> {
        self.run(self.client.delete_event(table, object_id, event)?)
    }

    pub fn query(&self, table: &Table, query: &Query) -> Result<Value> {
        self.run(self.client.query(table, query)?)
    }

    pub fn stats(&self, table: &Table) -> Result<Value> {
        self.run(self.client.stats(table)?)
    }

    /// `true` only when `/ping` answered with a 2xx status.
    pub fn ping(&self) -> bool {
        ping_outcome(self.run(self.client.ping()))
    }
}
