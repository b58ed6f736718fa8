//! Loading-focused tests for configuration
//!
//! File parsing, layered merging and environment overrides.

#[cfg(test)]
mod loading_tests {
    use std::{collections::HashMap, path::PathBuf};

    use crate::config::{load_config, load_toml_file, Config};
    use crate::{Error, Result};

    fn write_config(contents: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let dir = tempfile::tempdir().map_err(|e| Error::io("failed to create temp dir", &e))?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).map_err(|e| Error::io("failed to write config", &e))?;
        Ok((dir, path))
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let (_dir, path) = write_config("[client]\nbin_dir = \"/opt/net-snmp/bin\"\n")?;
        let config = load_toml_file(&path)?;

        assert_eq!(config.client.bin_dir, PathBuf::from("/opt/net-snmp/bin"));
        assert_eq!(config.client.timeout_secs, 1);
        assert_eq!(config.ports.agent, 6555);
        assert_eq!(config.community.read_only, "public");
        Ok(())
    }

    #[test]
    fn test_explicit_file_goes_through_validation() -> Result<()> {
        let (_dir, path) = write_config("[ports]\nagent = 7000\ninform = 7000\n")?;
        let result = load_config(Some(&path));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        Ok(())
    }

    #[test]
    fn test_malformed_toml_returns_parse_error() -> Result<()> {
        let (_dir, path) = write_config("ports = \n invalid toml [[[")?;
        let result = load_toml_file(&path);
        assert!(matches!(result, Err(Error::ConfigParse(_))));
        Ok(())
    }

    #[test]
    fn test_wrong_value_type_returns_parse_error() -> Result<()> {
        let (_dir, path) = write_config("[ports]\nagent = \"not a port\"\n")?;
        assert!(matches!(load_toml_file(&path), Err(Error::ConfigParse(_))));
        Ok(())
    }

    #[test]
    fn test_directory_path_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir().map_err(|e| Error::io("failed to create temp dir", &e))?;
        assert!(matches!(
            load_toml_file(dir.path()),
            Err(Error::ConfigParse(msg)) if msg.contains("directory")
        ));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_toml_file(std::path::Path::new("/nonexistent/snmp-testenv.toml"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let vars: HashMap<&str, &str> = [
            ("SNMP_TESTENV_AGENT_PORT", "7555"),
            ("SNMP_TESTENV_CLIENT_BIN_DIR", "/tmp/fake-bin"),
            ("SNMP_TESTENV_FORCE_KILL", "false"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .apply_env_with(|key| vars.get(key).map(|value| (*value).to_string()))?;

        assert_eq!(config.ports.agent, 7555);
        assert_eq!(config.client.bin_dir, PathBuf::from("/tmp/fake-bin"));
        assert!(!config.lifecycle.force_kill);
        assert_eq!(config.ports.inform, 6556);
        Ok(())
    }

    #[test]
    fn test_env_override_parse_failure_names_variable() {
        let result = Config::default().apply_env_with(|key| {
            (key == "SNMP_TESTENV_READINESS_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(matches!(
            result,
            Err(Error::InvalidConfig(msg)) if msg.contains("SNMP_TESTENV_READINESS_TIMEOUT_MS")
        ));
    }

    #[test]
    fn test_merge_tables_is_deep() -> Result<()> {
        let base: toml::Table = "[a]\nx = 1\ny = 2\n[b]\nz = 3\n"
            .parse()
            .map_err(|e| Error::ConfigParse(format!("{e}")))?;
        let overlay: toml::Table = "[a]\ny = 20\n"
            .parse()
            .map_err(|e| Error::ConfigParse(format!("{e}")))?;

        let merged = super::super::load::merge_tables(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(20));
        assert_eq!(merged["b"]["z"].as_integer(), Some(3));
        Ok(())
    }
}
