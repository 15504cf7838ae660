//! Offline conversion between nested aggregate results and flat rows.

use std::io::{self, Read};
use std::path::PathBuf;

use clap::Subcommand;
use serde_json::Value;
use sky_core::{denormalize, normalize, AggregateRow};

use super::{parse_json, print_json};
use crate::error::{Error, Result};

#[derive(Debug, Subcommand)]
pub enum ReshapeCommand {
    /// Flatten a nested query result into one row per group
    Denormalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<PathBuf>,
        /// Dimension names, outermost first
        #[arg(short, long = "dimension")]
        dimensions: Vec<String>,
    },
    /// Nest flat rows back into a query result tree
    Normalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<PathBuf>,
        /// Dimension names, outermost first
        #[arg(short, long = "dimension")]
        dimensions: Vec<String>,
        /// Metric names to keep in each group
        #[arg(short, long = "metric")]
        metrics: Vec<String>,
    },
}

fn read_input(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Reshape `text` as `command` describes, ignoring its input source.
pub fn reshape(command: &ReshapeCommand, text: &str) -> Result<Value> {
    match command {
        ReshapeCommand::Denormalize { dimensions, .. } => {
            let tree = parse_json("input", text)?;
            let rows = denormalize(&tree, dimensions.as_slice())?;
            Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
        }
        ReshapeCommand::Normalize {
            dimensions, metrics, ..
        } => {
            let rows: Vec<AggregateRow> =
                serde_json::from_str(text).map_err(|e| Error::json("input", e))?;
            Ok(normalize(&rows, dimensions.as_slice(), metrics.as_slice())?)
        }
    }
}

pub fn run(command: ReshapeCommand) -> Result<()> {
    let input = match &command {
        ReshapeCommand::Denormalize { input, .. } | ReshapeCommand::Normalize { input, .. } => {
            input.clone()
        }
    };
    let text = read_input(input)?;
    print_json(&reshape(&command, &text)?)
}
