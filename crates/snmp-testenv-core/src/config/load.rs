//! Configuration loading from files and environment (Immutable functional pattern)
//!
//! Files are merged key by key on top of the defaults, so a file only needs
//! to name the values it changes. All operations return new instances
//! rather than mutating in place.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use super::types::Config;
use crate::{Error, Result};

/// Prefix of every environment variable override.
pub const ENV_PREFIX: &str = "SNMP_TESTENV_";

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy
///
/// # Errors
///
/// Returns error if:
/// - A config file cannot be read or is malformed TOML
/// - An environment override cannot be parsed
/// - Config values fail validation
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let global = global_config_path().filter(|path| path.is_file());

    let merged = [global.as_deref(), explicit]
        .into_iter()
        .flatten()
        .try_fold(defaults_table()?, |base, path| {
            read_table(path).map(|overlay| merge_tables(base, overlay))
        })?;

    let config = table_to_config(merged)?.apply_env_vars()?;
    config.validate()?;
    Ok(config)
}

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "snmp-testenv")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Load a single TOML file on top of the defaults
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed or has values of the wrong type
pub fn load_toml_file(path: &Path) -> Result<Config> {
    read_table(path)
        .and_then(|overlay| defaults_table().map(|base| merge_tables(base, overlay)))
        .and_then(table_to_config)
}

// ═══════════════════════════════════════════════════════════════════════════
// TABLE HELPERS
// ═══════════════════════════════════════════════════════════════════════════

fn read_table(path: &Path) -> Result<toml::Table> {
    if path.is_dir() {
        return Err(Error::ConfigParse(format!(
            "config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read config file {}", path.display()), &e))?;

    content
        .parse::<toml::Table>()
        .map_err(|e| Error::ConfigParse(format!("{}: {e}", path.display())))
}

fn defaults_table() -> Result<toml::Table> {
    match toml::Value::try_from(Config::default()) {
        Ok(toml::Value::Table(table)) => Ok(table),
        Ok(other) => Err(Error::ConfigParse(format!(
            "defaults serialized to {}, expected a table",
            other.type_str()
        ))),
        Err(e) => Err(Error::ConfigParse(format!("failed to serialize defaults: {e}"))),
    }
}

fn table_to_config(table: toml::Table) -> Result<Config> {
    toml::Value::Table(table)
        .try_into::<Config>()
        .map_err(|e| Error::ConfigParse(e.to_string()))
}

/// Deep-merge `overlay` onto `base`; nested tables merge, everything else replaces.
pub(super) fn merge_tables(mut base: toml::Table, overlay: toml::Table) -> toml::Table {
    for (key, value) in overlay {
        let merged = match (base.remove(&key), value) {
            (Some(toml::Value::Table(inner)), toml::Value::Table(over)) => {
                toml::Value::Table(merge_tables(inner, over))
            }
            (_, value) => value,
        };
        base.insert(key, merged);
    }
    base
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply `SNMP_TESTENV_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if an environment variable value is invalid
    pub fn apply_env_vars(self) -> Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (keys without the prefix
    /// are never requested).
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed into its field's type
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(value) = var("AGENT_PORT") {
            self.ports.agent = parse_var("AGENT_PORT", &value)?;
        }
        if let Some(value) = var("INFORM_PORT") {
            self.ports.inform = parse_var("INFORM_PORT", &value)?;
        }
        if let Some(value) = var("SMUX_PORT") {
            self.ports.smux = parse_var("SMUX_PORT", &value)?;
        }
        if let Some(value) = var("AGENT_BINARY") {
            self.agent.binary = PathBuf::from(value);
        }
        if let Some(value) = var("AGENT_HOST") {
            self.agent.host = value;
        }
        if let Some(value) = var("RO_COMMUNITY") {
            self.community.read_only = value;
        }
        if let Some(value) = var("RW_COMMUNITY") {
            self.community.read_write = value;
        }
        if let Some(value) = var("CLIENT_BIN_DIR") {
            self.client.bin_dir = PathBuf::from(value);
        }
        if let Some(value) = var("CLIENT_TIMEOUT_SECS") {
            self.client.timeout_secs = parse_var("CLIENT_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = var("READINESS_TIMEOUT_MS") {
            self.lifecycle.readiness_timeout_ms = parse_var("READINESS_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("FORCE_KILL") {
            self.lifecycle.force_kill = parse_var("FORCE_KILL", &value)?;
        }

        Ok(self)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::InvalidConfig(format!("invalid {ENV_PREFIX}{name} value '{value}': {e}")))
}
