//! Result printing, plain or JSON

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

/// Print `value` as pretty JSON when `json` is set, otherwise `human()`.
pub fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce() -> String) -> Result<()> {
    let text = if json {
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    } else {
        human()
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").context("Failed to write output")?;
    stdout.flush().context("Failed to flush output")
}
