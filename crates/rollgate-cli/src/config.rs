//! CLI configuration

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration
///
/// Every field is optional; command-line flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CliConfig {
    /// Repository the GitOps controller pulls manifests from
    pub repo_url: Option<String>,

    /// Initial target revision written into manifests
    pub target_revision: Option<String>,

    /// Directory for generated manifests
    pub manifest_output_path: Option<String>,

    /// Directory for generated workflows
    pub workflow_output_path: Option<String>,

    /// Namespace the controller watches for applications
    pub application_namespace: Option<String>,

    /// Controller project for generated applications
    pub project: Option<String>,

    /// Runner labels for deploy jobs
    pub runs_on: Option<Vec<String>>,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("rollgate").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert!(config.repo_url.is_none());
        assert!(config.runs_on.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        // Should return default config when file doesn't exist
        let config = CliConfig::load(Some("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "repo_url = \"https://github.com/acme/app.git\"\nruns_on = [\"self-hosted\"]\n",
        )
        .unwrap();

        let config = CliConfig::load(path.to_str()).unwrap();
        assert_eq!(config.repo_url.as_deref(), Some("https://github.com/acme/app.git"));
        assert_eq!(config.runs_on, Some(vec!["self-hosted".to_string()]));
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "repo_url = [").unwrap();
        assert!(matches!(
            CliConfig::load(path.to_str()),
            Err(CliError::Config(_))
        ));
    }
}
