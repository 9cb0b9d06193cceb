use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::blocks::MarkerPair;
use crate::builders::validator::{ConfigValidator, StandardValidator};

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".import-failure-cleaner.toml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GlobalSettings {
    pub backup_strategy: BackupStrategy,
    pub backup_suffix: String,
    pub verbose: bool,
    pub summary_format: SummaryFormat,
}

/// Where the untouched original of a cleaned file goes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum BackupStrategy {
    /// Next to the cleaned file, with `backup_suffix` appended to its name.
    SiblingFile,
    /// No backup is written.
    Disabled,
}

/// Output format of the batch summary.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CleanerConfig {
    pub version: String,
    pub markers: MarkerPair,
    pub global_settings: GlobalSettings,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            markers: MarkerPair::default(),
            global_settings: GlobalSettings {
                backup_strategy: BackupStrategy::SiblingFile,
                backup_suffix: ".bak".to_string(),
                verbose: false,
                summary_format: SummaryFormat::Text,
            },
        }
    }
}

/// Command-line values that take precedence over the configuration file.
///
/// `None` (or `false` for flags) keeps the value from the file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub no_backup: bool,
    pub verbose: bool,
    pub start_marker: Option<String>,
    pub end_marker: Option<String>,
    pub summary_format: Option<SummaryFormat>,
}

impl CleanerConfig {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if overrides.no_backup {
            self.global_settings.backup_strategy = BackupStrategy::Disabled;
        }
        if overrides.verbose {
            self.global_settings.verbose = true;
        }
        if let Some(start) = &overrides.start_marker {
            self.markers.start = start.clone();
        }
        if let Some(end) = &overrides.end_marker {
            self.markers.end = end.clone();
        }
        if let Some(format) = overrides.summary_format {
            self.global_settings.summary_format = format;
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Uses `.import-failure-cleaner.toml` in the current directory.
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to read current directory")?;
        Ok(Self::new_at(current_dir.join(DEFAULT_CONFIG_FILE)))
    }

    pub fn new_at(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Writes the default configuration unless a file is already there.
    /// Returns `true` if a file was written.
    pub fn initialize(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }

        let default_config = CleanerConfig::default();
        self.save_config(&default_config)?;
        Ok(true)
    }

    /// Checks `config` (usually loaded from this manager's file, with
    /// overrides applied) and names the file in the error.
    pub fn validate_config(&self, config: &CleanerConfig) -> Result<()> {
        let validator = StandardValidator::new();
        let issues = validator.validate_config(config);

        if issues.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration {} is invalid:\n  - {}",
                self.config_path.display(),
                issues.join("\n  - ")
            );
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

pub trait ConfigProvider {
    fn load_config(&self) -> Result<CleanerConfig>;
    fn save_config(&self, config: &CleanerConfig) -> Result<()>;
    fn get_config_path(&self) -> Result<PathBuf>;
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> Result<CleanerConfig> {
        if !self.config_path.exists() {
            return Ok(CleanerConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file {}", self.config_path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", self.config_path.display()))
    }

    fn save_config(&self, config: &CleanerConfig) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn get_config_path(&self) -> Result<PathBuf> {
        Ok(self.config_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new_at(dir.path().join("absent.toml"));
        assert_eq!(manager.load_config().unwrap(), CleanerConfig::default());
    }

    #[test]
    fn test_initialize_round_trips_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new_at(dir.path().join("cleaner.toml"));

        assert!(manager.initialize().unwrap());
        assert!(!manager.initialize().unwrap());

        let written = fs::read_to_string(manager.config_path()).unwrap();
        assert!(written.contains("TEST.IMPORT_FAILURES:"));
        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded, CleanerConfig::default());
        manager.validate_config(&loaded).unwrap();
    }

    #[test]
    fn test_custom_markers_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cleaner.toml");
        fs::write(
            &path,
            r#"
version = "1.0"

[markers]
start = "BEGIN:"
end = "FINISH:"

[global_settings]
backup_strategy = "Disabled"
backup_suffix = ".orig"
verbose = true
summary_format = "json"
"#,
        )
        .unwrap();

        let config = ConfigManager::new_at(path).load_config().unwrap();
        assert_eq!(config.markers.start, "BEGIN:");
        assert_eq!(config.markers.end, "FINISH:");
        assert_eq!(config.global_settings.backup_strategy, BackupStrategy::Disabled);
        assert_eq!(config.global_settings.summary_format, SummaryFormat::Json);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new_at(dir.path().join("cleaner.toml"));
        let mut config = CleanerConfig::default();
        config.markers.end = config.markers.start.clone();
        manager.save_config(&config).unwrap();

        let loaded = manager.load_config().unwrap();
        let err = manager.validate_config(&loaded).unwrap_err().to_string();
        assert!(err.contains("must differ"), "unexpected error: {err}");
        assert!(err.contains("cleaner.toml"), "unexpected error: {err}");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = CleanerConfig::default();
        config.apply_overrides(&ConfigOverrides {
            no_backup: true,
            verbose: true,
            start_marker: Some("A:".to_string()),
            end_marker: None,
            summary_format: Some(SummaryFormat::Yaml),
        });

        assert_eq!(config.global_settings.backup_strategy, BackupStrategy::Disabled);
        assert!(config.global_settings.verbose);
        assert_eq!(config.markers.start, "A:");
        assert_eq!(config.markers.end, "TEST.END_IMPORT_FAILURES:");
        assert_eq!(config.global_settings.summary_format, SummaryFormat::Yaml);
    }
}
