//! Subcommand implementations.

pub mod event;
pub mod property;
pub mod reshape;
pub mod table;

use serde::Serialize;
use serde_json::Value;
use sky_core::{FromLooseInput, Query, SkyError, Table};

use crate::error::{Error, Result};
use crate::session::{call, Session};

/// Pretty-print a result to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| SkyError::Serialization(e.to_string()))?;
    println!("{text}");
    Ok(())
}

pub fn parse_json(what: &str, text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| Error::json(what, e))
}

pub fn table(name: String) -> Result<Table> {
    Ok(Table::from_loose_input(Value::String(name))?)
}

/// JSON arguments are step arrays or definitions; anything else is
/// query-language text.
pub fn query(text: String) -> Result<Query> {
    match serde_json::from_str::<Value>(&text) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) => Ok(Query::from_loose_input(value)?),
        _ => Ok(Query::Text(text)),
    }
}

pub fn ping(session: &Session) -> Result<()> {
    if call!(session, ping()) {
        println!("ok");
        Ok(())
    } else {
        Err(Error::Unreachable(session.url()))
    }
}

pub fn merge(session: &Session, table_name: String, dest: String, src: String) -> Result<()> {
    let table = table(table_name)?;
    call!(session, merge_objects(&table, &dest, &src))?;
    Ok(())
}

pub fn run_query(session: &Session, table_name: String, text: String) -> Result<()> {
    let table = table(table_name)?;
    let query = query(text)?;
    print_json(&call!(session, query(&table, &query))?)
}

pub fn stats(session: &Session, table_name: String) -> Result<()> {
    let table = table(table_name)?;
    print_json(&call!(session, stats(&table))?)
}
