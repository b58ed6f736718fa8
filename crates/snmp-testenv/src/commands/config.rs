//! `config`: print the effective configuration

use anyhow::{Context, Result};
use snmp_testenv_core::Config;

use crate::cli::output::emit;

pub fn run(config: &Config, json: bool) -> Result<()> {
    let text = if json {
        String::new()
    } else {
        toml::to_string_pretty(config).context("Failed to render configuration as TOML")?
    };
    emit(json, config, || text.trim_end().to_string())
}
