use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    #[serde(default = "default_journal_lines")]
    pub journal_lines: u32,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_docker")]
    pub docker: String,
    #[serde(default = "default_docker_compose")]
    pub docker_compose: String,
    #[serde(default = "default_kubectl")]
    pub kubectl: String,
    #[serde(default = "default_systemctl")]
    pub systemctl: String,
    #[serde(default = "default_journalctl")]
    pub journalctl: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: None,
            journal_lines: default_journal_lines(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            docker: default_docker(),
            docker_compose: default_docker_compose(),
            kubectl: default_kubectl(),
            systemctl: default_systemctl(),
            journalctl: default_journalctl(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        Self::from_yaml(&text, &path_display)
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }

    fn from_yaml(text: &str, path_display: &str) -> Result<Self, ConfigError> {
        // An empty file is a valid "all defaults" config.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path_display.to_string(),
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.journal_lines < 1 {
            return Err(ConfigError::Validation(
                "journal_lines must be >= 1".to_string(),
            ));
        }
        if let Some(dir) = &self.state_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "state_dir must not be empty when set".to_string(),
                ));
            }
        }

        validate_tools(&self.tools)?;

        Ok(())
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn validate_tools(tools: &ToolsConfig) -> Result<(), ConfigError> {
    let entries = [
        ("docker", &tools.docker),
        ("docker_compose", &tools.docker_compose),
        ("kubectl", &tools.kubectl),
        ("systemctl", &tools.systemctl),
        ("journalctl", &tools.journalctl),
    ];
    for (key, value) in entries {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "tools.{key} must not be empty"
            )));
        }
    }
    Ok(())
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(crate::store::STATE_DIR_NAME).join(CONFIG_FILE_NAME))
}

const fn default_journal_lines() -> u32 {
    100
}

fn default_docker() -> String {
    "docker".to_string()
}

fn default_docker_compose() -> String {
    "docker-compose".to_string()
}

fn default_kubectl() -> String {
    "kubectl".to_string()
}

fn default_systemctl() -> String {
    "systemctl".to_string()
}

fn default_journalctl() -> String {
    "journalctl".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn example_config_is_valid() {
        let cfg = Config::from_yaml(Config::example_yaml(), "example")
            .expect("example config must parse");
        assert_eq!(cfg.journal_lines, 100);
        assert_eq!(cfg.tools.kubectl, "kubectl");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = Config::from_yaml("tools:\n  kubectl: /opt/bin/kubectl\n", "inline")
            .expect("partial config must parse");
        assert_eq!(cfg.tools.kubectl, "/opt/bin/kubectl");
        assert_eq!(cfg.tools.docker, "docker");
        assert_eq!(cfg.journal_lines, 100);
        assert!(cfg.state_dir.is_none());
    }

    #[test]
    fn empty_file_means_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\n").unwrap();
        let cfg = Config::load_from_file(file.path()).expect("empty config must load");
        assert_eq!(cfg.journal_lines, 100);
    }

    #[test]
    fn rejects_zero_journal_lines() {
        let err = Config::from_yaml("journal_lines: 0\n", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_blank_tool() {
        let err = Config::from_yaml("tools:\n  systemctl: \"  \"\n", "inline").unwrap_err();
        assert!(err.to_string().contains("tools.systemctl"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
