//! Host process configuration
//!
//! Read from `<config_dir>/media-bridge/bridge.toml` when present.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Executable name looked up on PATH when no program is configured
pub const HOST_BINARY: &str = "media-host";

/// Largest accepted `event_capacity`
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

fn default_event_capacity() -> usize {
    64
}

/// How to start and talk to the host process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Explicit path to the host executable
    #[serde(default)]
    pub program: Option<PathBuf>,

    /// Extra arguments passed to the host
    #[serde(default)]
    pub args: Vec<String>,

    /// Per-call timeout; unset means wait indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Buffer size for host notifications
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            request_timeout_secs: None,
            event_capacity: default_event_capacity(),
        }
    }
}

impl HostConfig {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("media-bridge")
            .join("bridge.toml")
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let path = Self::default_path();

        if !path.exists() {
            tracing::debug!("No bridge config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Load from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: HostConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        if config.event_capacity == 0 || config.event_capacity > MAX_EVENT_CAPACITY {
            return Err(Error::Config(format!(
                "event_capacity must be between 1 and {}, got {}",
                MAX_EVENT_CAPACITY, config.event_capacity
            )));
        }

        tracing::debug!("Loaded bridge config from {:?}", path);

        Ok(config)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Resolve the host executable: explicit path, PATH, then common locations
    pub fn resolve_program(&self) -> Result<PathBuf> {
        if let Some(program) = &self.program {
            return Ok(program.clone());
        }

        if let Ok(path) = which::which(HOST_BINARY) {
            return Ok(path);
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::HostNotFound("Cannot find home directory".to_string()))?;

        let common_paths = [
            home.join(".cargo/bin").join(HOST_BINARY),
            home.join(".local/bin").join(HOST_BINARY),
            PathBuf::from("/usr/local/bin").join(HOST_BINARY),
            PathBuf::from("/opt/homebrew/bin").join(HOST_BINARY),
        ];

        common_paths
            .into_iter()
            .find(|path| path.exists())
            .ok_or_else(|| Error::HostNotFound(format!("{} is not installed", HOST_BINARY)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
program = "/opt/media/host"
args = ["--stdio", "--verbose"]
request_timeout_secs = 120
"#;

        let config: HostConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.program, Some(PathBuf::from("/opt/media/host")));
        assert_eq!(config.args, vec!["--stdio", "--verbose"]);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: HostConfig = toml::from_str("").unwrap();
        assert!(config.program.is_none());
        assert!(config.args.is_empty());
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "event_capacity = 8").unwrap();

        let config = HostConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.event_capacity, 8);
    }

    #[test]
    fn test_load_from_path_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "args = \"not a list\"").unwrap();

        let result = HostConfig::load_from_path(file.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_path_rejects_event_capacity() {
        for capacity in ["0", "9223372036854775807"] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "event_capacity = {}", capacity).unwrap();

            let result = HostConfig::load_from_path(file.path());
            assert!(matches!(result, Err(Error::Config(_))), "{capacity}");
        }
    }

    #[test]
    fn test_explicit_program_wins() {
        let config = HostConfig {
            program: Some(PathBuf::from("/custom/host")),
            ..Default::default()
        };
        assert_eq!(config.resolve_program().unwrap(), PathBuf::from("/custom/host"));
    }
}
