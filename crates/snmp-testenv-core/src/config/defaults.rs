//! Default configuration values

use std::path::PathBuf;

use super::types::{AgentConfig, ClientConfig, CommunityConfig, LifecycleConfig, PortsConfig};

/// Agent listener port.
pub const DEFAULT_AGENT_PORT: u16 = 6555;
/// Trap/inform sink port.
pub const DEFAULT_INFORM_PORT: u16 = 6556;
/// SMUX sub-agent port.
pub const DEFAULT_SMUX_PORT: u16 = 6557;

// ═══════════════════════════════════════════════════════════════════════════
// DEFAULT IMPLEMENTATIONS
// ═══════════════════════════════════════════════════════════════════════════

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            agent: DEFAULT_AGENT_PORT,
            inform: DEFAULT_INFORM_PORT,
            smux: DEFAULT_SMUX_PORT,
        }
    }
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            read_only: "public".to_string(),
            read_write: "simple".to_string(),
            source: "127.0.0.1".to_string(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("/usr/sbin/snmpd"),
            log_level: "warning".to_string(),
            host: "localhost".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bin_dir: PathBuf::from("/usr/bin"),
            version: "2c".to_string(),
            timeout_secs: 1,
            retries: 0,
            mib_dirs: vec!["+.".to_string()],
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            readiness_timeout_ms: 5000,
            poll_interval_ms: 100,
            launch_timeout_ms: 5000,
            grace_period_ms: 250,
            termination_timeout_ms: 5000,
            force_kill: true,
        }
    }
}
