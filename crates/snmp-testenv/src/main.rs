//! snmp-testenv CLI - isolated net-snmp agent for integration tests
//!
//! Binary name: `snmp-testenv`

#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::process;

use clap::Parser;
use snmp_testenv_core::{cleanup, Error};

mod cli;
mod commands;

use cli::{setup::init_tracing, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Warning: {e}");
        }
    }

    let result = commands::run(cli).await;

    // Destructors do not run across process::exit
    for failure in cleanup::run_pending() {
        tracing::error!(error = %failure, "cleanup of leftover environment failed");
    }

    if let Err(err) = result {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {err:#}");
        }

        let code = err
            .downcast_ref::<Error>()
            .map_or(1, Error::exit_code);

        #[allow(clippy::exit)]
        process::exit(code);
    }
}
