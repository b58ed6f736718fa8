//! Process-wide cleanup backstop.
//!
//! `TestEnvironment` releases its agent and temp directory on `shutdown`
//! or `Drop`. Paths that skip destructors (`std::process::exit`, a signal
//! handler deciding to quit) call [`run_pending`] so nothing registered
//! here outlives the process.

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard, OnceLock, PoisonError,
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    process::{self, TerminationPolicy},
    Error, Result,
};

/// What to tear down for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupTarget {
    pub pid_file: PathBuf,
    pub temp_dir: PathBuf,
    pub policy: TerminationPolicy,
    /// Agent PID when already known; otherwise it is read from `pid_file`
    pub agent_pid: Option<u32>,
    /// How long a still-launching agent gets to write its PID file
    pub pid_wait: Duration,
}

impl CleanupTarget {
    /// Stop the agent and remove the temp directory (if still there). Both
    /// steps are attempted; the first failure is returned.
    pub fn release(&mut self) -> Result<()> {
        let stopped = self.stop_agent();
        let removed = self.remove_temp_dir();
        stopped.and(removed)
    }

    /// Terminate the agent, waiting up to `pid_wait` for a launching agent
    /// to name itself. When termination fails the PID is kept in
    /// `agent_pid` so a later call can retry without the PID file.
    pub fn stop_agent(&mut self) -> Result<()> {
        let pid = match self.agent_pid {
            Some(pid) => pid,
            None => match self.await_pid() {
                Ok(Some(pid)) => pid,
                Ok(None) => {
                    tracing::debug!(pid_file = %self.pid_file.display(), "no PID file, skipping termination");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(pid_file = %self.pid_file.display(), error = %e, "unusable PID file");
                    return Err(e);
                }
            },
        };

        match process::terminate(pid, &self.policy) {
            Ok(outcome) => {
                tracing::info!(pid, ?outcome, "agent process stopped");
                self.agent_pid = None;
                Ok(())
            }
            Err(e) => {
                self.agent_pid = Some(pid);
                Err(e)
            }
        }
    }

    /// Whether an agent survived the last `stop_agent`.
    pub const fn agent_outstanding(&self) -> bool {
        self.agent_pid.is_some()
    }

    fn await_pid(&self) -> Result<Option<u32>> {
        let start = Instant::now();
        loop {
            if let Some(pid) = process::read_pid_file(&self.pid_file)? {
                return Ok(Some(pid));
            }
            let elapsed = start.elapsed();
            if elapsed >= self.pid_wait || !self.temp_dir.exists() {
                return Ok(None);
            }
            thread::sleep(self.policy.poll_interval.min(self.pid_wait - elapsed));
        }
    }

    fn remove_temp_dir(&self) -> Result<()> {
        if self.temp_dir.exists() {
            std::fs::remove_dir_all(&self.temp_dir).map_err(|e| {
                Error::io(
                    format!("failed to remove {}", self.temp_dir.display()),
                    &e,
                )
            })
        } else {
            tracing::debug!(temp_dir = %self.temp_dir.display(), "temp dir already gone");
            Ok(())
        }
    }
}

/// Handle returned by [`register`]; pass it to [`deregister`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Registration(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn registry() -> MutexGuard<'static, BTreeMap<u64, CleanupTarget>> {
    static REGISTRY: OnceLock<Mutex<BTreeMap<u64, CleanupTarget>>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| Mutex::new(BTreeMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Remember `target` until it is deregistered or cleaned up.
pub fn register(target: CleanupTarget) -> Registration {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    registry().insert(id, target);
    Registration(id)
}

/// Forget a target whose owner released it itself.
pub fn deregister(registration: Registration) -> Option<CleanupTarget> {
    registry().remove(&registration.0)
}

/// Number of targets still registered.
pub fn pending() -> usize {
    registry().len()
}

/// Release every registered target. Returns the failures, if any.
pub fn run_pending() -> Vec<Error> {
    let targets: Vec<CleanupTarget> = std::mem::take(&mut *registry()).into_values().collect();
    if !targets.is_empty() {
        tracing::info!(count = targets.len(), "running pending environment cleanups");
    }
    targets
        .into_iter()
        .filter_map(|mut target| target.release().err())
        .collect()
}
