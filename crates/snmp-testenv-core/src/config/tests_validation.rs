//! Validation-focused tests for configuration

#[cfg(test)]
mod validation_tests {
    use crate::config::Config;
    use crate::Error;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.ports.smux = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig(msg)) if msg.contains("smux")
        ));
    }

    #[test]
    fn test_duplicate_ports_rejected() {
        let mut config = Config::default();
        config.ports.inform = config.ports.agent;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_community_rejected() {
        let mut config = Config::default();
        config.community.read_write = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_client_timeout_rejected() {
        let mut config = Config::default();
        config.client.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_must_be_below_timeouts() {
        let mut config = Config::default();
        config.lifecycle.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.lifecycle.poll_interval_ms = config.lifecycle.readiness_timeout_ms;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig(msg)) if msg.contains("readiness_timeout_ms")
        ));
    }
}
