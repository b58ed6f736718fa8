//! Ephemeral snmpd instance owned by a test run.
//!
//! Construction writes the agent configuration into a fresh temp directory
//! and launches the agent. Readiness is a separate step: the agent is up
//! once its PID file holds a valid PID. Teardown stops the agent and
//! removes the temp directory exactly once, from `shutdown`, `Drop` or the
//! [`cleanup`](crate::cleanup) backstop, whichever comes first.

use std::{
    fs::{self, File},
    path::Path,
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use crate::{
    agent_config::{self, EnvPaths},
    classify::SnmpValue,
    cleanup::{self, CleanupTarget, Registration},
    client::SnmpClient,
    command::SetType,
    config::Config,
    lifecycle::{EnvState, LifecycleState},
    process::{self, duration_ms, TerminationPolicy},
    Error, Result,
};

const TEMP_PREFIX: &str = "snmp-testenv-";

/// A running (or launching) agent with its private temp directory.
#[derive(Debug)]
pub struct TestEnvironment {
    config: Config,
    paths: EnvPaths,
    state: EnvState,
    agent_pid: Option<u32>,
    /// Launcher still in the foreground when `new` returned
    launcher: Option<Child>,
    registration: Option<Registration>,
    client: SnmpClient,
}

impl TestEnvironment {
    /// Write the agent configuration and launch the agent.
    ///
    /// Returns once the launcher has detached (or is still running in the
    /// foreground after the PID file appeared or `launch_timeout_ms`
    /// elapsed). The agent is not necessarily ready yet.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `config` does not validate
    /// - `Io` if the temp directory or its files cannot be created
    /// - `CommandSpawn` if the agent binary cannot be executed
    /// - `AgentLaunchFailed` if the launcher exits unsuccessfully
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let root = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .map_err(|e| Error::io("failed to create temp directory", &e))?
            .keep();
        let paths = EnvPaths::new(&root);
        let registration = cleanup::register(cleanup_target(&config, &paths));

        match launch(&config, &paths) {
            Ok(launcher) => {
                tracing::info!(
                    temp_dir = %paths.root.display(),
                    port = config.ports.agent,
                    "agent launched"
                );
                let client = SnmpClient::from_config(&config);
                Ok(Self {
                    config,
                    paths,
                    state: EnvState::Launching,
                    agent_pid: None,
                    launcher,
                    registration: Some(registration),
                    client,
                })
            }
            Err(launch_error) => {
                if let Some(mut target) = cleanup::deregister(registration) {
                    // A launcher that failed leaves no agent to wait for
                    target.pid_wait = Duration::ZERO;
                    if let Err(e) = target.release() {
                        tracing::warn!(error = %e, "cleanup after failed launch was incomplete");
                    }
                }
                Err(launch_error)
            }
        }
    }

    /// `new` followed by `wait_ready`.
    pub fn start(config: Config) -> Result<Self> {
        let mut env = Self::new(config)?;
        env.wait_ready()?;
        Ok(env)
    }

    /// Wait up to `readiness_timeout_ms` for the agent to come up.
    pub fn wait_ready(&mut self) -> Result<u32> {
        let timeout = self.config.lifecycle.readiness_timeout();
        self.wait_ready_within(timeout)
    }

    /// Poll the PID file until it holds a valid PID or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// - `ReadinessTimeout` when the PID file did not appear in time
    /// - `AgentLaunchFailed` when a foreground launcher died meanwhile
    /// - `InvalidPid` when the PID file holds garbage
    /// - `EnvironmentStopped` after `shutdown`
    pub fn wait_ready_within(&mut self, timeout: Duration) -> Result<u32> {
        match (self.state, self.agent_pid) {
            (EnvState::Ready, Some(pid)) => return Ok(pid),
            (EnvState::Stopped, _) => return Err(Error::EnvironmentStopped),
            _ => {}
        }

        let poll = self.config.lifecycle.poll_interval();
        let start = Instant::now();
        loop {
            if let Some(pid) = process::read_pid_file(&self.paths.pid_file)? {
                self.agent_pid = Some(pid);
                self.transition(EnvState::Ready);
                tracing::info!(pid, waited_ms = duration_ms(start.elapsed()), "agent ready");
                return Ok(pid);
            }
            self.check_launcher()?;

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(Error::ReadinessTimeout {
                    pid_file: self.paths.pid_file.clone(),
                    waited_ms: duration_ms(elapsed),
                });
            }
            thread::sleep(poll.min(timeout - elapsed));
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self.state, EnvState::Ready)
    }

    pub const fn state(&self) -> EnvState {
        self.state
    }

    /// PID read from the PID file, once ready.
    pub const fn agent_pid(&self) -> Option<u32> {
        self.agent_pid
    }

    pub fn temp_dir(&self) -> &Path {
        &self.paths.root
    }

    pub const fn paths(&self) -> &EnvPaths {
        &self.paths
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn client(&self) -> &SnmpClient {
        &self.client
    }

    pub fn get(&self, oid: &str) -> Result<SnmpValue> {
        self.client.get(oid)
    }

    /// `value_type` is a net-snmp type letter (`i`, `s`, ...) or a type
    /// name such as `INTEGER`.
    pub fn set(&self, oid: &str, value: &str, value_type: &str) -> Result<String> {
        let value_type = value_type.parse::<SetType>().unwrap_or_else(|never| match never {});
        self.client.set(oid, value, &value_type)
    }

    pub fn walk(&self, oid: &str) -> Result<String> {
        self.client.walk(oid)
    }

    pub fn table(&self, oid: &str) -> Result<String> {
        self.client.table(oid)
    }

    /// Stop the agent and remove the temp directory.
    ///
    /// Idempotent. Resources that are already gone are skipped; directory
    /// removal is attempted even when termination failed. A still-launching
    /// agent gets up to `readiness_timeout_ms` to write its PID file so it
    /// can be stopped rather than orphaned.
    ///
    /// When the agent outlives termination the environment stays registered
    /// with its PID, so calling `shutdown` again (or the cleanup backstop)
    /// retries.
    ///
    /// # Errors
    ///
    /// The first failure among termination and directory removal.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }

        let mut target = self
            .registration
            .take()
            .and_then(cleanup::deregister)
            .unwrap_or_else(|| cleanup_target(&self.config, &self.paths));
        target.agent_pid = target.agent_pid.or(self.agent_pid);
        let released = target.release();
        self.reap_launcher();

        if target.agent_outstanding() {
            self.agent_pid = target.agent_pid;
            self.registration = Some(cleanup::register(target));
            tracing::warn!(pid = ?self.agent_pid, "agent survived shutdown, keeping it registered");
            return released;
        }

        self.transition(EnvState::Stopped);
        match &released {
            Ok(()) => tracing::info!(temp_dir = %self.paths.root.display(), "environment shut down"),
            Err(e) => tracing::warn!(error = %e, "environment shut down with errors"),
        }
        released
    }

    fn transition(&mut self, next: EnvState) {
        if self.state.can_transition_to(next) {
            tracing::debug!(from = %self.state, to = %next, "environment state change");
            self.state = next;
        } else {
            tracing::warn!(from = %self.state, to = %next, "ignoring invalid state change");
        }
    }

    /// Fail fast when a foreground launcher exited unsuccessfully.
    fn check_launcher(&mut self) -> Result<()> {
        let Some(child) = self.launcher.as_mut() else {
            return Ok(());
        };
        match child.try_wait() {
            Ok(Some(status)) if status.success() => {
                self.launcher = None;
                Ok(())
            }
            Ok(Some(status)) => {
                self.launcher = None;
                Err(launch_failure(&self.config, &self.paths, status.code()))
            }
            Ok(None) => Ok(()),
            Err(e) => Err(Error::io("failed to poll agent launcher", &e)),
        }
    }

    /// Kill and reap a launcher that never detached.
    fn reap_launcher(&mut self) {
        let Some(mut child) = self.launcher.take() else {
            return;
        };
        if matches!(child.try_wait(), Ok(None)) {
            if let Err(e) = child.kill() {
                tracing::warn!(pid = child.id(), error = %e, "failed to kill agent launcher");
            }
        }
        if let Err(e) = child.wait() {
            tracing::warn!(pid = child.id(), error = %e, "failed to reap agent launcher");
        }
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!(error = %e, "shutdown on drop failed");
        }
    }
}

/// Write the agent's files and start it. Returns the launcher if it is
/// still running in the foreground.
fn launch(config: &Config, paths: &EnvPaths) -> Result<Option<Child>> {
    fs::write(&paths.config_file, agent_config::render(config, paths))
        .map_err(|e| Error::io(format!("failed to write {}", paths.config_file.display()), &e))?;
    File::create(&paths.indexes_file)
        .map_err(|e| Error::io(format!("failed to create {}", paths.indexes_file.display()), &e))?;
    fs::create_dir_all(&paths.state_dir)
        .map_err(|e| Error::io(format!("failed to create {}", paths.state_dir.display()), &e))?;

    let log = File::create(&paths.log_file)
        .map_err(|e| Error::io(format!("failed to create {}", paths.log_file.display()), &e))?;
    let log_err = log
        .try_clone()
        .map_err(|e| Error::io("failed to duplicate log handle", &e))?;

    let args = agent_config::agent_args(config, paths);
    tracing::debug!(binary = %config.agent.binary.display(), ?args, "launching agent");
    let mut child = Command::new(&config.agent.binary)
        .args(&args)
        .env("LANG", "C")
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .stdout(log)
        .stderr(log_err)
        .spawn()
        .map_err(|e| Error::CommandSpawn {
            command: launch_command(config, paths),
            source: e.into(),
        })?;

    let timeout = config.lifecycle.launch_timeout();
    let poll = config.lifecycle.poll_interval();
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(None),
            Ok(Some(status)) => return Err(launch_failure(config, paths, status.code())),
            Ok(None) => {}
            Err(e) => return Err(Error::io("failed to poll agent launcher", &e)),
        }
        if paths.pid_file.exists() {
            tracing::debug!(pid = child.id(), "agent running in the foreground");
            return Ok(Some(child));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            tracing::warn!(
                pid = child.id(),
                waited_ms = duration_ms(elapsed),
                "agent launcher has not returned, keeping it attached"
            );
            return Ok(Some(child));
        }
        thread::sleep(poll.min(timeout - elapsed));
    }
}

fn cleanup_target(config: &Config, paths: &EnvPaths) -> CleanupTarget {
    CleanupTarget {
        pid_file: paths.pid_file.clone(),
        temp_dir: paths.root.clone(),
        policy: TerminationPolicy::from(&config.lifecycle),
        agent_pid: None,
        pid_wait: config.lifecycle.readiness_timeout(),
    }
}

fn launch_command(config: &Config, paths: &EnvPaths) -> String {
    std::iter::once(config.agent.binary.display().to_string())
        .chain(agent_config::agent_args(config, paths))
        .collect::<Vec<_>>()
        .join(" ")
}

fn launch_failure(config: &Config, paths: &EnvPaths, exit_code: Option<i32>) -> Error {
    let log = fs::read_to_string(&paths.log_file).unwrap_or_default();
    tracing::error!(?exit_code, "agent launcher failed");
    Error::AgentLaunchFailed {
        command: launch_command(config, paths),
        exit_code,
        log: log.trim().to_string(),
    }
}
