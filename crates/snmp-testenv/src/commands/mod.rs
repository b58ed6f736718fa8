//! Subcommand implementations

mod check;
mod config;
mod snmp;
mod up;

use anyhow::{Context, Result};
use snmp_testenv_core::load_config;

use crate::cli::{Cli, Command};

/// Load configuration and dispatch the chosen subcommand.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "effective configuration");

    match cli.command {
        Command::Up => up::run(config, cli.json).await,
        Command::Get { oid } => snmp::get(config, oid, cli.json).await,
        Command::Set {
            oid,
            value_type,
            value,
        } => snmp::set(config, oid, value_type, value, cli.json).await,
        Command::Walk { oid } => snmp::walk(config, oid, cli.json).await,
        Command::Table { oid } => snmp::table(config, oid, cli.json).await,
        Command::Check => check::run(&config, cli.json),
        Command::Config => config::run(&config, cli.json),
    }
}

/// Run a blocking library call off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> snmp_testenv_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .context("Blocking task failed")?;
    Ok(result?)
}
