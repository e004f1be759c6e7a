//! Reflection configuration (appsettings.toml)
//!
//! Optional project-level file naming where settings are reflected to.
//! Precedence: built-in defaults -> appsettings.toml -> CLI flags.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the reflection config in the project root
pub const CONFIG_FILE_NAME: &str = "appsettings.toml";

/// Error types for config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

fn default_run_configuration() -> String {
    ".run/main.dart.run.xml".to_string()
}

fn default_android_workspace() -> String {
    "android/.idea/workspace.xml".to_string()
}

fn default_flutter() -> String {
    "flutter".to_string()
}

fn default_true() -> bool {
    true
}

/// Where and how settings are reflected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReflectConfig {
    /// Run configuration receiving `additionalArgs`, relative to the root
    #[serde(default = "default_run_configuration")]
    pub run_configuration: String,

    /// Android Studio workspace receiving the Gradle dart-defines property
    #[serde(default = "default_android_workspace")]
    pub android_workspace: String,

    /// Run `flutter build ios --config-only` to refresh the Xcode project
    #[serde(default = "default_true")]
    pub ios: bool,

    /// Flutter executable
    #[serde(default = "default_flutter")]
    pub flutter: String,

    /// Fail instead of writing an empty Gradle property when no dart
    /// defines are configured
    #[serde(default)]
    pub require_dart_defines: bool,
}

impl Default for ReflectConfig {
    fn default() -> Self {
        Self {
            run_configuration: default_run_configuration(),
            android_workspace: default_android_workspace(),
            ios: true,
            flutter: default_flutter(),
            require_dart_defines: false,
        }
    }
}

impl ReflectConfig {
    /// Load and parse config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse config from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: ReflectConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `appsettings.toml` from a project root, or the defaults
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run_configuration.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "'run_configuration' cannot be empty".to_string(),
            ));
        }
        if self.android_workspace.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "'android_workspace' cannot be empty".to_string(),
            ));
        }
        if self.flutter.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "'flutter' cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn run_configuration_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.run_configuration)
    }

    pub fn android_workspace_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.android_workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ReflectConfig::default();
        assert_eq!(config.run_configuration, ".run/main.dart.run.xml");
        assert_eq!(config.android_workspace, "android/.idea/workspace.xml");
        assert!(config.ios);
        assert_eq!(config.flutter, "flutter");
        assert!(!config.require_dart_defines);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ReflectConfig::from_str("ios = false\nflutter = \"fvm flutter\"\n").unwrap();
        assert!(!config.ios);
        assert_eq!(config.flutter, "fvm flutter");
        assert_eq!(config.run_configuration, ".run/main.dart.run.xml");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(ReflectConfig::from_str("").unwrap(), ReflectConfig::default());
    }

    #[test]
    fn test_validation() {
        let result = ReflectConfig::from_str("run_configuration = \"  \"");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let result = ReflectConfig::from_str("flutter = \"\"");
        assert!(result.unwrap_err().to_string().contains("flutter"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ReflectConfig::from_str("workspace = \"x\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(ReflectConfig::load(dir.path()).unwrap(), ReflectConfig::default());
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "android_workspace = \"android/.idea/custom.xml\"\n",
        )
        .unwrap();

        let config = ReflectConfig::load(dir.path()).unwrap();
        assert_eq!(
            config.android_workspace_path(dir.path()),
            dir.path().join("android/.idea/custom.xml")
        );
    }
}
