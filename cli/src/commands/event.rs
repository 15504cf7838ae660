use clap::Subcommand;
use serde_json::json;
use sky_core::{parse_timestamp, Event, FromLooseInput, InsertionMode};

use super::{parse_json, print_json, table};
use crate::error::Result;
use crate::session::{call, Session};

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    /// List an object's events in time order
    List { table: String, object_id: String },
    /// Show the event at a timestamp
    Get {
        table: String,
        object_id: String,
        timestamp: String,
    },
    /// Write an event
    Add {
        table: String,
        object_id: String,
        timestamp: String,
        /// Event data as a JSON object
        #[arg(long, default_value = "{}")]
        data: String,
        /// replace or merge
        #[arg(long, default_value = "merge")]
        mode: String,
    },
    /// Delete the event at a timestamp
    Delete {
        table: String,
        object_id: String,
        timestamp: String,
    },
}

/// Build the event written by `event add`.
pub fn event(timestamp: &str, data: &str) -> Result<Event> {
    let data = parse_json("--data", data)?;
    Ok(Event::from_loose_input(json!({ "timestamp": timestamp, "data": data }))?)
}

pub fn run(session: &Session, command: EventCommand) -> Result<()> {
    match command {
        EventCommand::List { table: name, object_id } => {
            let table = table(name)?;
            print_json(&call!(session, get_events(&table, &object_id))?)
        }
        EventCommand::Get {
            table: name,
            object_id,
            timestamp,
        } => {
            let table = table(name)?;
            let timestamp = parse_timestamp(&timestamp)?;
            print_json(&call!(session, get_event(&table, &object_id, &timestamp))?)
        }
        EventCommand::Add {
            table: name,
            object_id,
            timestamp,
            data,
            mode,
        } => {
            let table = table(name)?;
            let mode: InsertionMode = mode.parse()?;
            let event = event(&timestamp, &data)?;
            print_json(&call!(session, add_event(&table, &object_id, &event, mode))?)
        }
        EventCommand::Delete {
            table: name,
            object_id,
            timestamp,
        } => {
            let table = table(name)?;
            let event = Event::new(parse_timestamp(&timestamp)?);
            call!(session, delete_event(&table, &object_id, &event))?;
            Ok(())
        }
    }
}
