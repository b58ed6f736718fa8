//! `up`: run an agent until interrupted

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use snmp_testenv_core::{Config, TestEnvironment};

use super::blocking;
use crate::cli::{output::emit, setup::signal_channels};

#[derive(Debug, Serialize)]
struct UpOutput {
    pid: u32,
    endpoint: String,
    temp_dir: PathBuf,
}

pub async fn run(config: Config, json: bool) -> Result<()> {
    // Handlers go in first so a signal during startup still reaches shutdown
    let (mut sigint, mut sigterm) = signal_channels()?;

    let mut env = blocking(move || TestEnvironment::start(config)).await?;
    let out = UpOutput {
        pid: env.agent_pid().unwrap_or_default(),
        endpoint: env.client().settings().endpoint(),
        temp_dir: env.temp_dir().to_path_buf(),
    };
    emit(json, &out, || {
        format!(
            "snmpd ready: pid {} on {} (temp dir {})",
            out.pid,
            out.endpoint,
            out.temp_dir.display()
        )
    })?;

    tokio::select! {
        _ = sigint.recv() => tracing::info!("SIGINT received, shutting down agent"),
        _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down agent"),
    }

    blocking(move || env.shutdown()).await
}
