//! Enrichment configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which captures run and how external commands are invoked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnricherConfig {
    /// Git executable name or path.
    pub git_executable: String,

    /// Directory git runs in; the process working directory when unset.
    pub work_dir: Option<PathBuf>,

    /// Per-command timeout in seconds. Unset means no timeout.
    pub command_timeout_secs: Option<u64>,

    pub capture_ci: bool,
    pub capture_ide: bool,
    pub capture_git: bool,
    pub capture_test_parallelism: bool,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
            work_dir: None,
            command_timeout_secs: None,
            capture_ci: true,
            capture_ide: true,
            capture_git: true,
            capture_test_parallelism: true,
        }
    }
}

impl EnricherConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_capture_everything() {
        let config = EnricherConfig::default();
        assert_eq!(config.git_executable, "git");
        assert!(config.capture_ci && config.capture_ide);
        assert!(config.capture_git && config.capture_test_parallelism);
        assert_eq!(config.command_timeout(), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EnricherConfig =
            serde_json::from_str(r#"{"command_timeout_secs": 10, "capture_git": false}"#).unwrap();
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(10)));
        assert!(!config.capture_git);
        assert!(config.capture_ci);
        assert_eq!(config.git_executable, "git");
    }
}
