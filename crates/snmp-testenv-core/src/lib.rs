//! # snmp-testenv core
//!
//! Ephemeral, isolated net-snmp agents for integration tests, plus typed
//! classification of net-snmp client output.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - signals go through `kill(1)`
//!
//! ## Usage
//!
//! ```no_run
//! use snmp_testenv_core::{Config, TestEnvironment};
//!
//! # fn main() -> snmp_testenv_core::Result<()> {
//! let mut env = TestEnvironment::start(Config::default())?;
//! let serial = env.get("SNMPv2-MIB::snmpSetSerialNo.0")?;
//! assert_eq!(serial.value_type, "INTEGER");
//! env.shutdown()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod agent_config;
pub mod classify;
pub mod cleanup;
pub mod client;
pub mod command;
pub mod config;
pub mod env;
mod error;
pub mod lifecycle;
pub mod process;
pub mod runner;
pub mod tools;

pub use classify::{classify, parse_get_value, parse_varbinds, SnmpValue, VarBind};
pub use client::SnmpClient;
pub use command::{ClientCommand, ClientSettings, Operation, SetType};
pub use config::{load_config, Config};
pub use env::TestEnvironment;
pub use error::{Error, IoErrorKind, Result};
pub use lifecycle::{EnvState, LifecycleState};
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
pub use tools::{check_tools, ToolReport, ToolStatus};
