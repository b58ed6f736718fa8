//! SNMP operations against a fixed endpoint.
//!
//! The client needs no environment instance: it targets the well-known
//! agent port from its settings. `TestEnvironment` hands out a client built
//! from its own configuration as a convenience.

use crate::{
    classify::{classify, parse_get_value, Invocation, SnmpValue},
    command::{ClientCommand, ClientSettings, Operation, SetType},
    config::Config,
    runner::{CommandRunner, ShellRunner},
    Result,
};

/// Formats, executes and classifies net-snmp client commands.
#[derive(Debug, Clone)]
pub struct SnmpClient<R = ShellRunner> {
    settings: ClientSettings,
    runner: R,
}

impl SnmpClient<ShellRunner> {
    /// Client for the endpoint described by `config`, running real commands.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ClientSettings::from(config), ShellRunner::new())
    }
}

impl<R: CommandRunner> SnmpClient<R> {
    pub const fn new(settings: ClientSettings, runner: R) -> Self {
        Self { settings, runner }
    }

    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// `snmpget`: returns the value and its declared type.
    ///
    /// # Errors
    ///
    /// Any classified SNMP outcome, or `UnexpectedOutput` when the agent's
    /// answer has no `=`.
    pub fn get(&self, oid: &str) -> Result<SnmpValue> {
        let command = ClientCommand::read(&self.settings, Operation::Get, oid);
        self.execute(&command, oid).and_then(|payload| parse_get_value(&payload))
    }

    /// `snmpset`: returns the client's raw output.
    pub fn set(&self, oid: &str, value: &str, value_type: &SetType) -> Result<String> {
        let command = ClientCommand::set(&self.settings, oid, value, value_type);
        self.execute(&command, oid)
    }

    /// `snmpwalk`: returns the client's raw output.
    pub fn walk(&self, oid: &str) -> Result<String> {
        let command = ClientCommand::read(&self.settings, Operation::Walk, oid);
        self.execute(&command, oid)
    }

    /// `snmptable`: returns the client's raw output.
    pub fn table(&self, oid: &str) -> Result<String> {
        let command = ClientCommand::read(&self.settings, Operation::Table, oid);
        self.execute(&command, oid)
    }

    fn execute(&self, command: &ClientCommand, oid: &str) -> Result<String> {
        let line = command.to_shell();
        tracing::debug!(operation = %command.operation, command = %line, "running snmp client");

        let output = self.runner.run(&line)?;
        tracing::debug!(
            operation = %command.operation,
            exit_code = ?output.exit_code,
            "snmp client finished"
        );

        let endpoint = self.settings.endpoint();
        classify(
            &output.output,
            output.exit_code,
            &Invocation {
                oid,
                endpoint: &endpoint,
                command: &line,
            },
        )
    }
}
