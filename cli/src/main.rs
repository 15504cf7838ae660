//! Sky CLI - command-line client for the Sky event store.

mod commands;
mod config;
mod error;
mod logger;
mod session;

use clap::{Parser, Subcommand};

use commands::event::EventCommand;
use commands::property::PropertyCommand;
use commands::reshape::ReshapeCommand;
use commands::table::TableCommand;
use config::ConnectionArgs;
use error::Result;
use session::Session;

#[derive(Parser)]
#[command(name = "sky")]
#[command(about = "Command-line client for the Sky event store", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log every request and response to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server is responding
    Ping,
    /// Manage tables
    #[command(subcommand)]
    Table(TableCommand),
    /// Manage table properties
    #[command(subcommand)]
    Property(PropertyCommand),
    /// Read and write object events
    #[command(subcommand)]
    Event(EventCommand),
    /// Move every event of SRC into DEST
    Merge {
        table: String,
        dest: String,
        src: String,
    },
    /// Run a query: JSON steps or definition, otherwise query text
    Query { table: String, query: String },
    /// Show table statistics
    Stats { table: String },
    /// Convert aggregate results without contacting a server
    #[command(subcommand)]
    Reshape(ReshapeCommand),
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let open = || Session::open(&cli.connection.resolve()?);

    match cli.command {
        Commands::Ping => commands::ping(&open()?),
        Commands::Table(command) => commands::table::run(&open()?, command),
        Commands::Property(command) => commands::property::run(&open()?, command),
        Commands::Event(command) => commands::event::run(&open()?, command),
        Commands::Merge { table, dest, src } => commands::merge(&open()?, table, dest, src),
        Commands::Query { table, query } => commands::run_query(&open()?, table, query),
        Commands::Stats { table } => commands::stats(&open()?, table),
        Commands::Reshape(command) => commands::reshape::run(command),
    }
}
