//! Process boundary: PID files, liveness checks and termination.
//!
//! Signals are delivered through the `kill` utility so the crate stays free
//! of `unsafe`. Every wait is a bounded poll.

use std::{
    path::Path,
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use crate::{Error, Result};

/// Signals the environment sends to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Terminate,
    Kill,
}

impl Signal {
    const fn flag(self) -> &'static str {
        match self {
            Self::Terminate => "-TERM",
            Self::Kill => "-KILL",
        }
    }
}

/// How hard and how long to try when stopping the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationPolicy {
    /// Wait after the first SIGTERM (and after SIGKILL)
    pub grace_period: Duration,
    /// Wait after the second SIGTERM
    pub termination_timeout: Duration,
    pub poll_interval: Duration,
    /// Escalate to SIGKILL when both SIGTERMs were ignored
    pub force_kill: bool,
}

impl From<&crate::config::LifecycleConfig> for TerminationPolicy {
    fn from(lifecycle: &crate::config::LifecycleConfig) -> Self {
        Self {
            grace_period: lifecycle.grace_period(),
            termination_timeout: lifecycle.termination_timeout(),
            poll_interval: lifecycle.poll_interval(),
            force_kill: lifecycle.force_kill,
        }
    }
}

/// How the agent went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// It was not running when we looked
    NotRunning,
    /// It exited after SIGTERM
    Exited,
    /// It needed SIGKILL
    Killed,
}

/// Parse PID file content.
pub fn parse_pid(content: &str) -> Result<u32> {
    content
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|pid| *pid > 0)
        .ok_or_else(|| Error::InvalidPid {
            raw: content.to_string(),
        })
}

/// Read a PID file.
///
/// Returns `Ok(None)` when the file is absent, unreadable or still empty
/// (the agent may not have finished writing it).
pub fn read_pid_file(path: &Path) -> Result<Option<u32>> {
    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => parse_pid(&content).map(Some),
        Err(_) => Ok(None),
    }
}

/// Check if a process is still alive.
///
/// Zombies count as dead: they no longer serve anything and only wait for
/// their parent to reap them.
#[cfg(target_os = "linux")]
pub fn is_process_alive(pid: u32) -> bool {
    std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .and_then(|stat| {
            // Format: "pid (comm) S ..."; comm may itself contain ')'
            stat.rfind(')')
                .and_then(|end| stat.get(end + 1..))
                .and_then(|rest| rest.split_whitespace().next())
                .map(|state| !matches!(state, "Z" | "X" | "x"))
        })
        .unwrap_or(false)
}

#[cfg(not(target_os = "linux"))]
pub fn is_process_alive(pid: u32) -> bool {
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Send `signal` to `pid`.
///
/// # Errors
///
/// `CommandSpawn` if `kill` cannot be executed. A process that is already
/// gone is not an error.
pub fn send_signal(pid: u32, signal: Signal) -> Result<()> {
    Command::new("kill")
        .args([signal.flag(), &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|_| ())
        .map_err(|e| Error::CommandSpawn {
            command: format!("kill {} {pid}", signal.flag()),
            source: e.into(),
        })
}

/// Poll until `pid` is gone or `timeout` elapses. Returns true if it exited.
pub fn wait_for_exit(pid: u32, timeout: Duration, poll_interval: Duration) -> bool {
    let start = Instant::now();
    loop {
        if !is_process_alive(pid) {
            return true;
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return false;
        }
        thread::sleep(poll_interval.min(timeout - elapsed));
    }
}

/// Stop `pid`: SIGTERM, then a second SIGTERM, then optionally SIGKILL.
///
/// # Errors
///
/// `TerminationTimeout` when the process outlives every attempt, or
/// `CommandSpawn` when signals cannot be sent.
pub fn terminate(pid: u32, policy: &TerminationPolicy) -> Result<Termination> {
    if !is_process_alive(pid) {
        return Ok(Termination::NotRunning);
    }

    send_signal(pid, Signal::Terminate)?;
    if wait_for_exit(pid, policy.grace_period, policy.poll_interval) {
        return Ok(Termination::Exited);
    }

    tracing::warn!(pid, "agent ignored SIGTERM, sending it again");
    send_signal(pid, Signal::Terminate)?;
    if wait_for_exit(pid, policy.termination_timeout, policy.poll_interval) {
        return Ok(Termination::Exited);
    }

    let waited = policy.grace_period + policy.termination_timeout;
    if !policy.force_kill {
        return Err(Error::TerminationTimeout {
            pid,
            waited_ms: duration_ms(waited),
        });
    }

    tracing::warn!(pid, "agent still running, sending SIGKILL");
    send_signal(pid, Signal::Kill)?;
    if wait_for_exit(pid, policy.grace_period, policy.poll_interval) {
        Ok(Termination::Killed)
    } else {
        Err(Error::TerminationTimeout {
            pid,
            waited_ms: duration_ms(waited + policy.grace_period),
        })
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
