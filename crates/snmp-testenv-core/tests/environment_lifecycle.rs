//! `TestEnvironment` lifecycle against fake net-snmp programs.
//!
//! The fake agent daemonizes a `sleep` and writes its PID where `-p` says;
//! the fake clients answer like net-snmp while that PID file exists and
//! time out once it is gone.

#![cfg(unix)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::Command,
    time::{Duration, Instant},
};

use serial_test::serial;
use snmp_testenv_core::{
    cleanup, process::is_process_alive, Config, EnvState, Error, TestEnvironment,
};
use tempfile::TempDir;

// ============================================================================
// Fake net-snmp
// ============================================================================

/// Shared argument parsing for every fake agent. Records the PID file path
/// in `@STATE@` so the fake clients can tell whether "the agent" is up.
const AGENT_PRELUDE: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -p*) pidfile="${arg#-p}" ;;
    -c*) conf="${arg#-c}" ;;
  esac
done
[ -f "$conf" ] || { echo "config file $conf missing" >&2; exit 1; }
echo "$pidfile" > "@STATE@"
"#;

const DAEMONIZING_AGENT: &str = r#"sleep 300 </dev/null >/dev/null 2>&1 &
echo $! > "$pidfile"
exit 0
"#;

/// Names its daemon 300 ms after the launcher returned. The PID is also
/// kept outside the temp dir so a test can find an orphaned daemon.
const SLOW_AGENT: &str = r#"( sleep 0.3; sleep 300 </dev/null >/dev/null 2>&1 & echo $! > "$pidfile"; echo $! > "@STATE@.daemon" ) </dev/null >/dev/null 2>&1 &
exit 0
"#;

const STUBBORN_AGENT: &str = r#"sh -c "trap '' TERM; exec sleep 300" </dev/null >/dev/null 2>&1 &
daemon=$!
sleep 0.2
echo $daemon > "$pidfile"
exit 0
"#;

const FOREGROUND_AGENT: &str = r#"echo $$ > "$pidfile"
exec sleep 300
"#;

const SILENT_AGENT: &str = "exit 0\n";

const FAILING_AGENT: &str = r#"echo "Error opening specified endpoint \"localhost:6555\"" >&2
exit 1
"#;

/// Client prelude: last argument is the OID; the agent is "up" while the
/// recorded PID file exists.
const CLIENT_PRELUDE: &str = r#"#!/bin/sh
for oid; do :; done
pidfile=$(cat "@STATE@" 2>/dev/null)
if [ -z "$pidfile" ] || [ ! -f "$pidfile" ]; then
  echo "Timeout: No Response from localhost:6555." >&2
  exit 1
fi
"#;

const FAKE_SNMPGET: &str = r#"case "$oid" in
  SNMPv2-MIB::snmpSetSerialNo.0) echo "SNMPv2-MIB::snmpSetSerialNo.0 = INTEGER: 1804289383" ;;
  SNMPv2-MIB::sysName.0) echo "SNMPv2-MIB::sysName.0 = STRING: \"testbox\"" ;;
  FOO-MIB::*) echo "$oid = No Such Object available on this agent at this OID" ;;
  *) echo "$oid: Unknown Object Identifier (Sub-id not found: (top) -> foo)" >&2; exit 2 ;;
esac
"#;

const FAKE_SNMPSET: &str = r#"case "$*" in
  *sysDescr*) printf 'Error in packet.\nReason: notWritable (That object does not support modification)\nFailed object: %s\n' "$oid" >&2; exit 2 ;;
  *) echo "args: $*" ;;
esac
"#;

const FAKE_SNMPWALK: &str = r#"echo "SNMPv2-MIB::sysDescr.0 = STRING: fake agent"
echo "SNMPv2-MIB::sysName.0 = STRING: testbox"
"#;

const FAKE_SNMPTABLE: &str = r#"echo "SNMP table: $oid"
"#;

struct FakeNetSnmp {
    dir: TempDir,
}

impl FakeNetSnmp {
    fn new(agent_body: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let fake = Self { dir };
        fake.script("snmpd", &format!("{AGENT_PRELUDE}{agent_body}"));
        fake.script("snmpget", &format!("{CLIENT_PRELUDE}{FAKE_SNMPGET}"));
        fake.script("snmpset", &format!("{CLIENT_PRELUDE}{FAKE_SNMPSET}"));
        fake.script("snmpwalk", &format!("{CLIENT_PRELUDE}{FAKE_SNMPWALK}"));
        fake.script("snmptable", &format!("{CLIENT_PRELUDE}{FAKE_SNMPTABLE}"));
        fake
    }

    fn script(&self, name: &str, body: &str) {
        let state = self.dir.path().join("current-pidfile");
        let path = self.dir.path().join(name);
        fs::write(&path, body.replace("@STATE@", &state.display().to_string()))
            .expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    }

    /// PID the slow agent recorded for its daemon.
    fn daemon_pid(&self, timeout: Duration) -> u32 {
        let path = self.dir.path().join("current-pidfile.daemon");
        let start = Instant::now();
        loop {
            if let Some(pid) = fs::read_to_string(&path)
                .ok()
                .and_then(|raw| raw.trim().parse().ok())
            {
                return pid;
            }
            assert!(start.elapsed() < timeout, "agent never recorded its daemon");
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    fn config(&self) -> Config {
        let mut config = Config::default();
        config.agent.binary = self.dir.path().join("snmpd");
        config.client.bin_dir = self.dir.path().to_path_buf();
        config.lifecycle.readiness_timeout_ms = 3000;
        config.lifecycle.poll_interval_ms = 20;
        config.lifecycle.launch_timeout_ms = 1000;
        config.lifecycle.grace_period_ms = 300;
        config.lifecycle.termination_timeout_ms = 300;
        config
    }
}

fn assert_torn_down(pid: u32, temp_dir: &Path) {
    assert!(!is_process_alive(pid), "agent {pid} still alive");
    assert!(!temp_dir.exists(), "{} still exists", temp_dir.display());
}

// ============================================================================
// Construction and readiness
// ============================================================================

#[test]
#[serial]
fn test_new_writes_configuration_and_returns_launching() {
    let fake = FakeNetSnmp::new(DAEMONIZING_AGENT);
    let mut env = TestEnvironment::new(fake.config()).expect("launch");

    assert_eq!(env.state(), EnvState::Launching);
    assert_eq!(env.agent_pid(), None);

    let paths = env.paths().clone();
    let conf = fs::read_to_string(&paths.config_file).expect("config written");
    assert!(conf.starts_with("[snmpd]\n"));
    assert!(conf.contains("agentaddress localhost:6555"));
    assert!(conf.contains(&format!("persistentDir {}", paths.state_dir.display())));
    assert_eq!(fs::read_to_string(&paths.indexes_file).expect("indexes"), "");
    assert!(paths.state_dir.is_dir());

    env.shutdown().expect("shutdown");
}

#[test]
#[serial]
fn test_start_waits_for_pid_file() {
    let fake = FakeNetSnmp::new(SLOW_AGENT);
    let mut env = TestEnvironment::start(fake.config()).expect("start");

    assert!(env.is_ready());
    let pid = env.agent_pid().expect("pid known");
    assert!(is_process_alive(pid));
    assert_eq!(env.wait_ready().expect("already ready"), pid);

    env.shutdown().expect("shutdown");
}

#[test]
#[serial]
fn test_readiness_timeout_is_bounded() {
    let fake = FakeNetSnmp::new(SILENT_AGENT);
    let mut env = TestEnvironment::new(fake.config()).expect("launch");
    let temp_dir = env.temp_dir().to_path_buf();

    let start = Instant::now();
    let result = env.wait_ready_within(Duration::from_millis(300));
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(
        matches!(&result, Err(Error::ReadinessTimeout { pid_file, .. }) if pid_file.ends_with("snmpd.pid")),
        "{result:?}"
    );
    assert_eq!(env.state(), EnvState::Launching);

    env.shutdown().expect("shutdown without agent");
    assert_eq!(env.state(), EnvState::Stopped);
    assert!(!temp_dir.exists());
}

#[test]
#[serial]
fn test_failed_launch_reports_log_and_cleans_up() {
    let fake = FakeNetSnmp::new(FAILING_AGENT);
    let before = cleanup::pending();

    let result = TestEnvironment::new(fake.config());
    match result {
        Err(Error::AgentLaunchFailed {
            exit_code, log, command,
        }) => {
            assert_eq!(exit_code, Some(1));
            assert!(log.contains("Error opening specified endpoint"), "{log}");
            assert!(command.contains("-C"));
        }
        other => panic!("expected AgentLaunchFailed, got {other:?}"),
    }
    assert_eq!(cleanup::pending(), before);
}

#[test]
#[serial]
fn test_missing_agent_binary_is_spawn_error() {
    let fake = FakeNetSnmp::new(DAEMONIZING_AGENT);
    let mut config = fake.config();
    config.agent.binary = PathBuf::from("/nonexistent/sbin/snmpd");

    let result = TestEnvironment::new(config);
    assert!(matches!(result, Err(Error::CommandSpawn { .. })), "{result:?}");
}

#[test]
#[serial]
fn test_invalid_config_rejected_before_launch() {
    let fake = FakeNetSnmp::new(DAEMONIZING_AGENT);
    let mut config = fake.config();
    config.ports.inform = config.ports.agent;

    let result = TestEnvironment::new(config);
    assert!(matches!(result, Err(Error::InvalidConfig(_))), "{result:?}");
}

// ============================================================================
// Operations
// ============================================================================

#[test]
#[serial]
fn test_operations_classify_client_output() {
    let fake = FakeNetSnmp::new(DAEMONIZING_AGENT);
    let mut env = TestEnvironment::start(fake.config()).expect("start");

    let serial = env.get("SNMPv2-MIB::snmpSetSerialNo.0").expect("get");
    assert_eq!(serial.value_type, "INTEGER");
    assert_eq!(serial.value, "1804289383");

    let name = env.get("SNMPv2-MIB::sysName.0").expect("get");
    assert_eq!(name.value, "testbox");

    assert_eq!(
        env.get("FOO-MIB::fooBarBaz.0"),
        Err(Error::MibUnavailable {
            oid: "FOO-MIB::fooBarBaz.0".to_string()
        })
    );
    assert_eq!(
        env.get("SNMPv2-MIB::nothingHere.0"),
        Err(Error::UnknownOid {
            oid: "SNMPv2-MIB::nothingHere.0".to_string()
        })
    );

    let payload = env
        .set("SNMPv2-MIB::sysLocation.0", "rack 4", "STRING")
        .expect("set");
    assert!(payload.contains("-c simple"), "{payload}");
    assert!(payload.ends_with("SNMPv2-MIB::sysLocation.0 s rack 4"), "{payload}");
    assert_eq!(
        env.set("SNMPv2-MIB::sysDescr.0", "x", "s"),
        Err(Error::NotWritable {
            oid: "SNMPv2-MIB::sysDescr.0".to_string()
        })
    );

    let walk = env.walk("SNMPv2-MIB::system").expect("walk");
    assert_eq!(snmp_testenv_core::parse_varbinds(&walk).len(), 2);
    assert_eq!(
        env.table("IF-MIB::ifTable").expect("table"),
        "SNMP table: IF-MIB::ifTable"
    );

    env.shutdown().expect("shutdown");
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
#[serial]
fn test_shutdown_round_trip_and_idempotence() {
    let fake = FakeNetSnmp::new(DAEMONIZING_AGENT);
    let mut env = TestEnvironment::start(fake.config()).expect("start");
    let pid = env.agent_pid().expect("pid");
    let temp_dir = env.temp_dir().to_path_buf();
    assert!(is_process_alive(pid));
    assert!(temp_dir.is_dir());

    env.shutdown().expect("first shutdown");
    assert_torn_down(pid, &temp_dir);
    assert_eq!(env.state(), EnvState::Stopped);

    env.shutdown().expect("second shutdown is a no-op");
    assert!(matches!(env.wait_ready(), Err(Error::EnvironmentStopped)));

    // The agent is gone, so the fixed endpoint no longer answers
    assert_eq!(
        env.get("SNMPv2-MIB::snmpSetSerialNo.0"),
        Err(Error::SnmpTimeout {
            endpoint: "localhost:6555".to_string()
        })
    );
}

#[test]
#[serial]
fn test_shutdown_while_launching_stops_late_agent() {
    let fake = FakeNetSnmp::new(SLOW_AGENT);
    let mut env = TestEnvironment::new(fake.config()).expect("launch");
    let temp_dir = env.temp_dir().to_path_buf();
    assert_eq!(env.state(), EnvState::Launching);

    env.shutdown().expect("shutdown while launching");
    assert_eq!(env.state(), EnvState::Stopped);

    let pid = fake.daemon_pid(Duration::from_secs(2));
    assert_torn_down(pid, &temp_dir);
}

#[test]
#[serial]
fn test_agent_surviving_shutdown_stays_registered() {
    let fake = FakeNetSnmp::new(STUBBORN_AGENT);
    let mut config = fake.config();
    config.lifecycle.force_kill = false;
    config.lifecycle.grace_period_ms = 100;
    config.lifecycle.termination_timeout_ms = 100;
    let before = cleanup::pending();

    let mut env = TestEnvironment::start(config).expect("start");
    let pid = env.agent_pid().expect("pid");
    let temp_dir = env.temp_dir().to_path_buf();

    let result = env.shutdown();
    assert!(
        matches!(&result, Err(Error::TerminationTimeout { pid: p, .. }) if *p == pid),
        "{result:?}"
    );
    assert!(is_process_alive(pid));
    assert!(!temp_dir.exists());
    assert_ne!(env.state(), EnvState::Stopped);
    assert_eq!(cleanup::pending(), before + 1);

    // Retried, not silently reported as done
    assert!(env.shutdown().is_err());

    let killed = Command::new("kill")
        .args(["-KILL", &pid.to_string()])
        .status()
        .expect("kill");
    assert!(killed.success());

    env.shutdown().expect("shutdown once the agent is gone");
    assert_eq!(env.state(), EnvState::Stopped);
    assert_eq!(cleanup::pending(), before);
    assert_torn_down(pid, &temp_dir);
}

#[test]
#[serial]
fn test_foreground_agent_is_stopped_and_reaped() {
    let fake = FakeNetSnmp::new(FOREGROUND_AGENT);
    let mut env = TestEnvironment::start(fake.config()).expect("start");
    let pid = env.agent_pid().expect("pid");
    let temp_dir = env.temp_dir().to_path_buf();

    env.shutdown().expect("shutdown");
    assert_torn_down(pid, &temp_dir);
}

#[test]
#[serial]
fn test_drop_shuts_down() {
    let fake = FakeNetSnmp::new(DAEMONIZING_AGENT);
    let (pid, temp_dir) = {
        let env = TestEnvironment::start(fake.config()).expect("start");
        (env.agent_pid().expect("pid"), env.temp_dir().to_path_buf())
    };
    assert_torn_down(pid, &temp_dir);
}

#[test]
#[serial]
fn test_cleanup_backstop_releases_forgotten_environment() {
    let fake = FakeNetSnmp::new(DAEMONIZING_AGENT);
    let env = TestEnvironment::start(fake.config()).expect("start");
    let pid = env.agent_pid().expect("pid");
    let temp_dir = env.temp_dir().to_path_buf();

    // Simulate an exit path that skips destructors
    std::mem::forget(env);
    assert!(cleanup::pending() >= 1);

    let failures = cleanup::run_pending();
    assert!(failures.is_empty(), "{failures:?}");
    assert_eq!(cleanup::pending(), 0);
    assert_torn_down(pid, &temp_dir);
}

#[test]
#[serial]
fn test_shutdown_after_backstop_is_quiet() {
    let fake = FakeNetSnmp::new(DAEMONIZING_AGENT);
    let mut env = TestEnvironment::start(fake.config()).expect("start");
    let pid = env.agent_pid().expect("pid");
    let temp_dir = env.temp_dir().to_path_buf();

    assert!(cleanup::run_pending().is_empty());
    env.shutdown().expect("nothing left to release");
    assert_torn_down(pid, &temp_dir);
}
