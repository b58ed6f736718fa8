//! Error types for snmp-testenv with categorization:
//!
//! - **SNMP outcomes**: classified client responses (timeout, unknown OID,
//!   unavailable MIB, read-only object, unclassified command failure)
//! - **Lifecycle errors**: launching, waiting for and tearing down the agent
//! - **Configuration errors**: invalid or unparsable settings

use std::{io, path::PathBuf};

use thiserror::Error;

/// Top-level error type for every fallible operation in the crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The agent did not answer before the client's timeout
    #[error("timeout: no response from {endpoint}")]
    SnmpTimeout { endpoint: String },

    /// The MIB is loaded but the identifier or instance does not exist
    #[error("unknown OID: {oid}")]
    UnknownOid { oid: String },

    /// The MIB defining the object is not loaded on the agent
    #[error("MIB unavailable for OID: {oid}")]
    MibUnavailable { oid: String },

    /// A set was attempted against a read-only object
    #[error("OID is not writable: {oid}")]
    NotWritable { oid: String },

    /// Client exited unsuccessfully with output no rule recognises
    #[error("command '{command}' failed with exit code {exit_code:?}: {output}")]
    CommandExecution {
        exit_code: Option<i32>,
        command: String,
        output: String,
    },

    /// Client reported success but printed something `get` cannot parse
    #[error("unexpected {operation} output: '{output}'")]
    UnexpectedOutput { operation: String, output: String },

    /// Filesystem operation failed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: IoErrorKind,
    },

    /// A program could not be started at all
    #[error("failed to execute '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: IoErrorKind,
    },

    /// The agent launcher exited unsuccessfully
    #[error("agent launch '{command}' failed with exit code {exit_code:?}\n{log}")]
    AgentLaunchFailed {
        command: String,
        exit_code: Option<i32>,
        log: String,
    },

    /// PID file did not appear before the readiness deadline
    #[error("agent not ready: {} did not appear within {waited_ms} ms", pid_file.display())]
    ReadinessTimeout { pid_file: PathBuf, waited_ms: u64 },

    /// Agent process survived every termination attempt
    #[error("agent process {pid} still running after {waited_ms} ms")]
    TerminationTimeout { pid: u32, waited_ms: u64 },

    /// Operation needs a live environment but it was already shut down
    #[error("environment has been shut down")]
    EnvironmentStopped,

    /// PID file content is not a process id
    #[error("invalid PID: '{raw}'")]
    InvalidPid { raw: String },

    /// Configuration values failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),
}

impl Error {
    /// Create an IO error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: &io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: source.into(),
        }
    }

    /// True for the outcomes produced by response classification.
    pub const fn is_snmp_outcome(&self) -> bool {
        matches!(
            self,
            Self::SnmpTimeout { .. }
                | Self::UnknownOid { .. }
                | Self::MibUnavailable { .. }
                | Self::NotWritable { .. }
                | Self::CommandExecution { .. }
                | Self::UnexpectedOutput { .. }
        )
    }

    /// Get the process exit code for this error.
    ///
    /// - Configuration errors: 1
    /// - SNMP outcomes: 2
    /// - Lifecycle and platform errors: 3
    /// - Timeouts: 4
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) | Self::ConfigParse(_) => 1,
            Self::UnknownOid { .. }
            | Self::MibUnavailable { .. }
            | Self::NotWritable { .. }
            | Self::CommandExecution { .. }
            | Self::UnexpectedOutput { .. } => 2,
            Self::Io { .. }
            | Self::CommandSpawn { .. }
            | Self::AgentLaunchFailed { .. }
            | Self::EnvironmentStopped
            | Self::InvalidPid { .. } => 3,
            Self::SnmpTimeout { .. }
            | Self::ReadinessTimeout { .. }
            | Self::TerminationTimeout { .. } => 4,
        }
    }
}

/// IO error kinds (cloneable, no source chain issues)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    InvalidInput,
    TimedOut,
    Interrupted,
    UnexpectedEof,
    Other(String),
}

impl std::fmt::Display for IoErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::AlreadyExists => write!(f, "already exists"),
            Self::InvalidInput => write!(f, "invalid input"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::UnexpectedEof => write!(f, "unexpected EOF"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for IoErrorKind {}

impl From<&io::Error> for IoErrorKind {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::InvalidInput => Self::InvalidInput,
            io::ErrorKind::TimedOut => Self::TimedOut,
            io::ErrorKind::Interrupted => Self::Interrupted,
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            _ => Self::Other(err.to_string()),
        }
    }
}

impl From<io::Error> for IoErrorKind {
    fn from(err: io::Error) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for snmp-testenv operations
pub type Result<T> = std::result::Result<T, Error>;
