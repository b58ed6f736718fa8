//! `check`: which net-snmp programs are installed

use anyhow::{bail, Result};
use snmp_testenv_core::{check_tools, Config, ToolReport, ToolStatus};

use crate::cli::output::emit;

pub fn run(config: &Config, json: bool) -> Result<()> {
    let report = check_tools(config);
    emit(json, &report, || render(&report))?;

    if report.all_present() {
        Ok(())
    } else {
        bail!("missing net-snmp tools: {}", report.missing().join(", "))
    }
}

fn render(report: &ToolReport) -> String {
    std::iter::once(&report.agent)
        .chain(&report.clients)
        .map(line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn line(tool: &ToolStatus) -> String {
    tool.path.as_ref().map_or_else(
        || format!("missing  {}", tool.name),
        |path| format!("ok       {} ({})", tool.name, path.display()),
    )
}
