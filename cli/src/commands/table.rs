use clap::Subcommand;

use super::{print_json, table};
use crate::error::Result;
use crate::session::{call, Session};

#[derive(Debug, Subcommand)]
pub enum TableCommand {
    /// List all tables
    List,
    /// Show one table
    Get { name: String },
    /// Create a table
    Create { name: String },
    /// Delete a table and all of its data
    Delete { name: String },
}

pub fn run(session: &Session, command: TableCommand) -> Result<()> {
    match command {
        TableCommand::List => print_json(&call!(session, get_tables())?),
        TableCommand::Get { name } => print_json(&call!(session, get_table(&name))?),
        TableCommand::Create { name } => {
            let table = table(name)?;
            print_json(&call!(session, create_table(&table))?)
        }
        TableCommand::Delete { name } => {
            let table = table(name)?;
            call!(session, delete_table(&table))?;
            Ok(())
        }
    }
}
