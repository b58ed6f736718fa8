//! Pure classification of net-snmp client output (no I/O operations)
//!
//! All message patterns live in [`RULES`] so drift in the client's wording is
//! a one-place fix. Patterns are case-insensitive and tolerate extra
//! whitespace; localized client messages are not recognised.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::{Error, Result};

/// What the client invocation was about, for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation<'a> {
    /// OID the operation targeted
    pub oid: &'a str,
    /// `host:port` the client talked to
    pub endpoint: &'a str,
    /// Full command line that was executed
    pub command: &'a str,
}

/// A successful `get` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnmpValue {
    pub value: String,
    pub value_type: String,
}

/// Which exit status a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum When {
    Success,
    Failure,
}

/// Error kind a rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    MibUnavailable,
    UnknownOid,
    Timeout,
    NotWritable,
}

struct Rule {
    when: When,
    pattern: Regex,
    outcome: Outcome,
}

/// Pattern table, in priority order.
const RULES: &[(When, &str, Outcome)] = &[
    (
        When::Success,
        r"(?i)=\s*no\s+such\s+object\s+available",
        Outcome::MibUnavailable,
    ),
    (
        When::Success,
        r"(?i)=\s*no\s+such\s+instance\s+currently\s+exists",
        Outcome::UnknownOid,
    ),
    (
        When::Failure,
        r"(?i):\s*unknown\s+object\s+identifier",
        Outcome::UnknownOid,
    ),
    (
        When::Failure,
        r"(?i)timeout\s*:\s*no\s+response\s+from",
        Outcome::Timeout,
    ),
    (
        When::Failure,
        r"(?is)reason\s*:\s*notwritable\b.*does\s+not\s+support\s+modification",
        Outcome::NotWritable,
    ),
];

fn rules() -> &'static [Rule] {
    static COMPILED: OnceLock<Vec<Rule>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|&(when, source, outcome)| {
                Regex::new(source).ok().map(|pattern| Rule {
                    when,
                    pattern,
                    outcome,
                })
            })
            .collect()
    })
}

/// Classify one client invocation.
///
/// Returns the raw (trimmed) output when the invocation succeeded both at
/// the process level and semantically. A zero exit status is not taken as
/// success until the "No Such ..." advisories have been ruled out.
pub fn classify(output: &str, exit_code: Option<i32>, invocation: &Invocation<'_>) -> Result<String> {
    let output = output.trim();
    let when = if exit_code == Some(0) {
        When::Success
    } else {
        When::Failure
    };

    let matched = rules()
        .iter()
        .filter(|rule| rule.when == when)
        .find(|rule| rule.pattern.is_match(output))
        .map(|rule| rule.outcome);

    match (when, matched) {
        (When::Success, None) => Ok(output.to_string()),
        (_, Some(outcome)) => Err(outcome_error(outcome, invocation)),
        (When::Failure, None) => Err(Error::CommandExecution {
            exit_code,
            command: invocation.command.to_string(),
            output: output.to_string(),
        }),
    }
}

fn outcome_error(outcome: Outcome, invocation: &Invocation<'_>) -> Error {
    let oid = invocation.oid.to_string();
    match outcome {
        Outcome::MibUnavailable => Error::MibUnavailable { oid },
        Outcome::UnknownOid => Error::UnknownOid { oid },
        Outcome::NotWritable => Error::NotWritable { oid },
        Outcome::Timeout => Error::SnmpTimeout {
            endpoint: invocation.endpoint.to_string(),
        },
    }
}

/// Split a successful `get` payload into value and type.
///
/// `SNMPv2-MIB::sysName.0 = STRING: "box"` yields `("box", "STRING")`.
/// A right-hand side without any `:` is typed `STRING`; a type-only
/// fragment such as `""` after `Hex-STRING:` yields an empty value.
pub fn parse_get_value(payload: &str) -> Result<SnmpValue> {
    let (_, rhs) = payload
        .trim()
        .split_once('=')
        .ok_or_else(|| Error::UnexpectedOutput {
            operation: "get".to_string(),
            output: payload.to_string(),
        })?;

    let (value_type, value) = if rhs.contains(':') {
        rhs.split_once(": ").map_or_else(
            || (rhs.trim().trim_end_matches(':').trim().to_string(), ""),
            |(value_type, value)| (value_type.trim().to_string(), value),
        )
    } else {
        ("STRING".to_string(), rhs)
    };

    Ok(SnmpValue {
        value: strip_quotes(value.trim()).to_string(),
        value_type,
    })
}

fn strip_quotes(value: &str) -> &str {
    // A lone quote opens and closes an empty string
    if value == "\"" {
        return "";
    }
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(value)
}

/// One `OID = TYPE: value` line of walk output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarBind {
    pub oid: String,
    pub value: SnmpValue,
}

/// Parse walk output into variable bindings.
///
/// A line starts a new binding only when the text before its first `=` is
/// a single OID token. Anything else (continuations of multi-line strings,
/// even ones containing `=`) is appended to the previous binding's value.
pub fn parse_varbinds(payload: &str) -> Vec<VarBind> {
    payload
        .lines()
        .filter(|line| !line.trim().is_empty())
        .fold(Vec::new(), |mut bindings: Vec<VarBind>, line| {
            let parsed = line
                .split_once('=')
                .filter(|(oid, _)| is_oid_token(oid.trim()))
                .and_then(|(oid, _)| {
                    parse_get_value(line).ok().map(|value| VarBind {
                        oid: oid.trim().to_string(),
                        value,
                    })
                });
            match (parsed, bindings.last_mut()) {
                (Some(binding), _) => bindings.push(binding),
                (None, Some(previous)) => {
                    previous.value.value.push('\n');
                    previous.value.value.push_str(line.trim());
                }
                (None, None) => {}
            }
            bindings
        })
}

fn is_oid_token(text: &str) -> bool {
    !text.is_empty() && !text.contains(char::is_whitespace)
}
