use clap::Subcommand;
use serde_json::json;
use sky_core::{DataType, FromLooseInput, Property, SkyError};

use super::{print_json, table};
use crate::error::Result;
use crate::session::{call, Session};

#[derive(Debug, Subcommand)]
pub enum PropertyCommand {
    /// List a table's properties
    List { table: String },
    /// Show one property
    Get { table: String, name: String },
    /// Add a property to a table
    Create {
        table: String,
        name: String,
        /// factor, string, integer, float or boolean
        #[arg(long = "type")]
        data_type: String,
        /// Value is not carried over to later events
        #[arg(long)]
        transient: bool,
    },
    /// Change a property's type or transience
    Update {
        table: String,
        name: String,
        #[arg(long = "type")]
        data_type: Option<String>,
        #[arg(long)]
        transient: Option<bool>,
    },
    /// Remove a property
    Delete { table: String, name: String },
}

fn data_type(name: &str) -> Result<DataType> {
    let data_type: DataType = serde_json::from_value(json!(name))
        .map_err(|e| SkyError::Deserialization(e.to_string()))?;
    Ok(data_type)
}

pub fn run(session: &Session, command: PropertyCommand) -> Result<()> {
    match command {
        PropertyCommand::List { table: name } => {
            let table = table(name)?;
            print_json(&call!(session, get_properties(&table))?)
        }
        PropertyCommand::Get { table: name, name: property } => {
            let table = table(name)?;
            print_json(&call!(session, get_property(&table, &property))?)
        }
        PropertyCommand::Create {
            table: name,
            name: property,
            data_type,
            transient,
        } => {
            let table = table(name)?;
            let property = Property::from_loose_input(json!({
                "name": property,
                "transient": transient,
                "data_type": data_type,
            }))?;
            print_json(&call!(session, create_property(&table, &property))?)
        }
        PropertyCommand::Update {
            table: name,
            name: property,
            data_type: new_type,
            transient,
        } => {
            let table = table(name)?;
            let mut existing = call!(session, get_property(&table, &property))?;
            if let Some(new_type) = new_type {
                existing.data_type = data_type(&new_type)?;
            }
            if let Some(transient) = transient {
                existing.transient = transient;
            }
            print_json(&call!(session, update_property(&table, &existing))?)
        }
        PropertyCommand::Delete { table: name, name: property } => {
            let table = table(name)?;
            let existing = call!(session, get_property(&table, &property))?;
            call!(session, delete_property(&table, &existing))?;
            Ok(())
        }
    }
}
