//! Discovery of the net-snmp programs an environment needs.

use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{command::Operation, config::Config};

/// One program and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub const fn is_present(&self) -> bool {
        self.path.is_some()
    }
}

/// Result of [`check_tools`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolReport {
    pub agent: ToolStatus,
    pub clients: Vec<ToolStatus>,
}

impl ToolReport {
    pub fn all_present(&self) -> bool {
        self.agent.is_present() && self.clients.iter().all(ToolStatus::is_present)
    }

    /// Names of the programs that could not be found.
    pub fn missing(&self) -> Vec<&str> {
        std::iter::once(&self.agent)
            .chain(&self.clients)
            .filter(|tool| !tool.is_present())
            .map(|tool| tool.name.as_str())
            .collect()
    }
}

/// Locate the agent binary and every client program.
pub fn check_tools(config: &Config) -> ToolReport {
    let agent = locate(&config.agent.binary);
    let clients = Operation::iter()
        .map(|operation| locate(&config.client.bin_dir.join(operation.program())))
        .collect();
    let report = ToolReport { agent, clients };
    if !report.all_present() {
        tracing::warn!(missing = ?report.missing(), "net-snmp tools missing");
    }
    report
}

/// Paths with a directory part are checked as given, bare names are
/// looked up on `PATH`.
fn locate(program: &Path) -> ToolStatus {
    let name = program.display().to_string();
    let path = if program.components().count() > 1 {
        program.is_file().then(|| program.to_path_buf())
    } else {
        which::which(program).ok()
    };
    ToolStatus { name, path }
}
