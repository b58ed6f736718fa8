//! net-snmp client command lines
//!
//! Formats `snmpget`/`snmpset`/`snmpwalk`/`snmptable` invocations against a
//! fixed endpoint. Every command is single-attempt (`-r0` by default) with a
//! short timeout so a dead agent surfaces as a timeout instead of being
//! masked by retries.

use std::{fmt, path::PathBuf, str::FromStr};

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::config::Config;

/// Client operation, named after the net-snmp program suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Get,
    Set,
    Walk,
    Table,
}

impl Operation {
    /// Name of the client program (`snmpget`, ...).
    pub fn program(self) -> String {
        format!("snmp{self}")
    }

    /// Only `set` needs the read-write community.
    pub const fn writes(self) -> bool {
        matches!(self, Self::Set)
    }
}

/// Value type argument accepted by `snmpset`.
///
/// Parses either the single-letter code or the type name the agent prints
/// (`INTEGER`, `Gauge32`, ...). Anything else is passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetType {
    Integer,
    Unsigned,
    TimeTicks,
    IpAddress,
    ObjectId,
    String,
    HexString,
    DecimalString,
    Bits,
    Unsigned64,
    Integer64,
    Float,
    Double,
    Null,
    MibDefault,
    Other(std::string::String),
}

impl SetType {
    /// Letter passed on the `snmpset` command line.
    pub fn code(&self) -> &str {
        match self {
            Self::Integer => "i",
            Self::Unsigned => "u",
            Self::TimeTicks => "t",
            Self::IpAddress => "a",
            Self::ObjectId => "o",
            Self::String => "s",
            Self::HexString => "x",
            Self::DecimalString => "d",
            Self::Bits => "b",
            Self::Unsigned64 => "U",
            Self::Integer64 => "I",
            Self::Float => "F",
            Self::Double => "D",
            Self::Null => "n",
            Self::MibDefault => "=",
            Self::Other(raw) => raw,
        }
    }
}

impl FromStr for SetType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed {
            "i" => Self::Integer,
            "u" => Self::Unsigned,
            "t" => Self::TimeTicks,
            "a" => Self::IpAddress,
            "o" => Self::ObjectId,
            "s" => Self::String,
            "x" => Self::HexString,
            "d" => Self::DecimalString,
            "b" => Self::Bits,
            "U" => Self::Unsigned64,
            "I" => Self::Integer64,
            "F" => Self::Float,
            "D" => Self::Double,
            "n" => Self::Null,
            "=" => Self::MibDefault,
            _ => match trimmed.to_ascii_uppercase().as_str() {
                "INTEGER" | "INTEGER32" => Self::Integer,
                "UNSIGNED32" | "GAUGE32" | "GAUGE" => Self::Unsigned,
                "TIMETICKS" => Self::TimeTicks,
                "IPADDRESS" => Self::IpAddress,
                "OID" | "OBJECT IDENTIFIER" => Self::ObjectId,
                "STRING" | "OCTETSTR" => Self::String,
                "HEX-STRING" => Self::HexString,
                "BITS" => Self::Bits,
                "COUNTER64" => Self::Unsigned64,
                "OPAQUE: FLOAT" | "FLOAT" => Self::Float,
                "OPAQUE: DOUBLE" | "DOUBLE" => Self::Double,
                _ => Self::Other(trimmed.to_string()),
            },
        };
        Ok(parsed)
    }
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Everything needed to format a client command, independent of any
/// environment instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub host: String,
    pub port: u16,
    pub read_community: String,
    pub write_community: String,
    pub version: String,
    pub timeout_secs: u32,
    pub retries: u32,
    pub mib_dirs: Vec<String>,
    pub bin_dir: PathBuf,
}

impl ClientSettings {
    /// `host:port` as passed to the client and reported on timeouts.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Config> for ClientSettings {
    fn from(config: &Config) -> Self {
        Self {
            host: config.agent.host.clone(),
            port: config.ports.agent,
            read_community: config.community.read_only.clone(),
            write_community: config.community.read_write.clone(),
            version: config.client.version.clone(),
            timeout_secs: config.client.timeout_secs,
            retries: config.client.retries,
            mib_dirs: config.client.mib_dirs.clone(),
            bin_dir: config.client.bin_dir.clone(),
        }
    }
}

/// One formatted client invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    pub operation: Operation,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ClientCommand {
    /// Build a read operation (`get`, `walk`, `table`).
    ///
    /// A `set` passed here is formatted without a value; use
    /// [`ClientCommand::set`] instead.
    pub fn read(settings: &ClientSettings, operation: Operation, oid: &str) -> Self {
        Self::build(settings, operation, oid, None)
    }

    /// Build a `set` operation.
    pub fn set(settings: &ClientSettings, oid: &str, value: &str, value_type: &SetType) -> Self {
        Self::build(settings, Operation::Set, oid, Some((value, value_type)))
    }

    fn build(
        settings: &ClientSettings,
        operation: Operation,
        oid: &str,
        assignment: Option<(&str, &SetType)>,
    ) -> Self {
        let community = if operation.writes() {
            &settings.write_community
        } else {
            &settings.read_community
        };

        let mut args: Vec<String> = settings
            .mib_dirs
            .iter()
            .map(|dir| format!("-M{dir}"))
            .collect();
        args.extend([
            format!("-r{}", settings.retries),
            format!("-t{}", settings.timeout_secs),
            "-v".to_string(),
            settings.version.clone(),
            "-c".to_string(),
            community.clone(),
            settings.endpoint(),
            oid.to_string(),
        ]);
        if let Some((value, value_type)) = assignment {
            args.push(value_type.code().to_string());
            args.push(value.to_string());
        }

        Self {
            operation,
            program: settings.bin_dir.join(operation.program()),
            args,
        }
    }

    /// Render as a single shell command line.
    pub fn to_shell(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .map(|word| shell_quote(&word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell())
    }
}

/// Quote a word for `sh` when it contains anything but plain characters.
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.,:/+=@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
