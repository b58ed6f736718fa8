//! Command-line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "snmp-testenv",
    version,
    about = "Isolated net-snmp agent for integration tests"
)]
pub struct Cli {
    /// Configuration file layered over the global one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an agent, wait until it is ready and keep it up until SIGINT/SIGTERM
    Up,
    /// Read one object
    Get { oid: String },
    /// Write one object (TYPE is a net-snmp letter such as `i`/`s` or a type name)
    Set {
        oid: String,
        #[arg(value_name = "TYPE")]
        value_type: String,
        value: String,
    },
    /// Walk a subtree
    Walk { oid: String },
    /// Print a conceptual table
    Table { oid: String },
    /// Report which net-snmp programs are installed
    Check,
    /// Print the effective configuration
    Config,
}
