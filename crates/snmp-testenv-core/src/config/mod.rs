//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/snmp-testenv/config.toml
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `SNMP_TESTENV_*`
//!
//! # Example Config
//!
//! ```toml
//! [ports]
//! agent = 6555
//!
//! [client]
//! bin_dir = "/usr/local/bin"
//! timeout_secs = 1
//!
//! [lifecycle]
//! readiness_timeout_ms = 3000
//! force_kill = true
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files and environment
//! - `validate`: Validation of loaded values

mod defaults;
mod load;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use defaults::{DEFAULT_AGENT_PORT, DEFAULT_INFORM_PORT, DEFAULT_SMUX_PORT};
pub use load::{global_config_path, load_config, load_toml_file, ENV_PREFIX};
pub use types::{AgentConfig, ClientConfig, CommunityConfig, Config, LifecycleConfig, PortsConfig};
