//! Configuration type definitions
//!
//! Pure data holders; behavior lives in the sibling modules.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// MAIN CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

/// Root configuration structure
///
/// Loaded from defaults → global → explicit file → env vars
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub ports: PortsConfig,
    pub community: CommunityConfig,
    pub agent: AgentConfig,
    pub client: ClientConfig,
    pub lifecycle: LifecycleConfig,
}

// ═══════════════════════════════════════════════════════════════════════════
// NESTED CONFIGURATION STRUCTURES
// ═══════════════════════════════════════════════════════════════════════════

/// Fixed ports the agent binds. One environment per host at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortsConfig {
    pub agent: u16,
    pub inform: u16,
    pub smux: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommunityConfig {
    pub read_only: String,
    pub read_write: String,
    /// Source address both communities are restricted to
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    pub binary: PathBuf,
    pub log_level: String,
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub bin_dir: PathBuf,
    pub version: String,
    pub timeout_secs: u32,
    pub retries: u32,
    pub mib_dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LifecycleConfig {
    pub readiness_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub launch_timeout_ms: u64,
    pub grace_period_ms: u64,
    pub termination_timeout_ms: u64,
    pub force_kill: bool,
}

impl LifecycleConfig {
    pub const fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    pub const fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub const fn termination_timeout(&self) -> Duration {
        Duration::from_millis(self.termination_timeout_ms)
    }
}
