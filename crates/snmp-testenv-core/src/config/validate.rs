//! Configuration validation

use super::types::Config;
use crate::{Error, Result};

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or invalid
    pub fn validate(&self) -> Result<()> {
        let ports = [
            ("agent", self.ports.agent),
            ("inform", self.ports.inform),
            ("smux", self.ports.smux),
        ];
        if let Some((name, _)) = ports.iter().find(|(_, port)| *port == 0) {
            return Err(Error::InvalidConfig(format!("{name} port must be non-zero")));
        }
        if self.ports.agent == self.ports.inform
            || self.ports.agent == self.ports.smux
            || self.ports.inform == self.ports.smux
        {
            return Err(Error::InvalidConfig(
                "agent, inform and smux ports must be distinct".to_string(),
            ));
        }

        if self.community.read_only.trim().is_empty() || self.community.read_write.trim().is_empty()
        {
            return Err(Error::InvalidConfig(
                "community strings cannot be empty".to_string(),
            ));
        }

        if self.client.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "client timeout_secs must be at least 1".to_string(),
            ));
        }

        let lifecycle = &self.lifecycle;
        if lifecycle.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }
        let bounded = [
            ("readiness_timeout_ms", lifecycle.readiness_timeout_ms),
            ("launch_timeout_ms", lifecycle.launch_timeout_ms),
            ("termination_timeout_ms", lifecycle.termination_timeout_ms),
        ];
        if let Some((name, value)) = bounded
            .iter()
            .find(|(_, value)| *value <= lifecycle.poll_interval_ms)
        {
            return Err(Error::InvalidConfig(format!(
                "{name} ({value}) must be greater than poll_interval_ms ({})",
                lifecycle.poll_interval_ms
            )));
        }

        Ok(())
    }
}
