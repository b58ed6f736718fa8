//! snmpd configuration file and on-disk layout of an environment.

use std::path::{Path, PathBuf};

use crate::config::Config;

/// Files an environment keeps inside its temp directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub master_socket: PathBuf,
    pub state_dir: PathBuf,
    pub pid_file: PathBuf,
    pub indexes_file: PathBuf,
    pub log_file: PathBuf,
}

impl EnvPaths {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            config_file: root.join("snmpd.conf"),
            master_socket: root.join("snmpd-agentx.sock"),
            state_dir: root.join("state"),
            pid_file: root.join("snmpd.pid"),
            indexes_file: root.join("mib_indexes"),
            log_file: root.join("snmpd.log"),
        }
    }
}

/// Render `snmpd.conf`: loopback-only communities, the three fixed
/// listeners, an AgentX master socket and a private persistent directory.
pub fn render(config: &Config, paths: &EnvPaths) -> String {
    let host = &config.agent.host;
    let community = &config.community;
    format!(
        "[snmpd]\n\
         rocommunity {ro} {source}\n\
         rwcommunity {rw} {source}\n\
         agentaddress {host}:{agent}\n\
         informsink {host}:{inform}\n\
         smuxsocket {host}:{smux}\n\
         master agentx\n\
         agentXSocket {socket}\n\
         \n\
         [snmp]\n\
         persistentDir {state}\n",
        ro = community.read_only,
        rw = community.read_write,
        source = community.source,
        agent = config.ports.agent,
        inform = config.ports.inform,
        smux = config.ports.smux,
        socket = paths.master_socket.display(),
        state = paths.state_dir.display(),
    )
}

/// Arguments for the agent: no root checks, warnings to stderr, ignore the
/// system-wide configuration, our config file and PID file.
pub fn agent_args(config: &Config, paths: &EnvPaths) -> Vec<String> {
    vec![
        "-r".to_string(),
        "-LE".to_string(),
        config.agent.log_level.clone(),
        "-C".to_string(),
        format!("-c{}", paths.config_file.display()),
        format!("-p{}", paths.pid_file.display()),
    ]
}
