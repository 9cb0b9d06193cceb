use anyhow::{Context, Result};
use std::path::Path;

use crate::core::config;

/// The `ConfigValidator` trait checks a configuration and the files it is
/// about to be applied to.
pub trait ConfigValidator {
    /// Performs a full validation of the `CleanerConfig` and returns the list
    /// of issues found. An empty list means the configuration is usable.
    fn validate_config(&self, config: &config::CleanerConfig) -> Vec<String>;

    /// Checks that `path` is an existing, regular, writable file.
    ///
    /// # Returns
    /// `Ok(())` if the file can be cleaned in place, otherwise an error naming
    /// the path and the reason.
    fn validate_target(&self, path: &Path) -> Result<()>;
}

/// The `StandardValidator` performs the checks every run needs before a file
/// is touched.
pub struct StandardValidator;

impl StandardValidator {
    pub fn new() -> Self {
        Self
    }

    /// Checks the suffix used to build sibling backup paths.
    ///
    /// An empty suffix would make the backup overwrite the file being cleaned,
    /// and a separator would move the backup into another directory.
    fn check_backup_suffix(&self, suffix: &str) -> Vec<String> {
        let mut issues = Vec::new();
        if suffix.is_empty() {
            issues.push("Backup suffix cannot be empty".to_string());
        }
        if suffix.contains(['/', '\\']) {
            issues.push(format!("Backup suffix must not contain a path separator: {suffix}"));
        }
        issues
    }
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator for StandardValidator {
    fn validate_config(&self, config: &config::CleanerConfig) -> Vec<String> {
        let mut issues = Vec::new();

        if config.version != "1.0" {
            issues.push(format!("Unsupported config version: {}", config.version));
        }

        if let Err(e) = config.markers.validate() {
            issues.push(format!("Invalid markers: {e}"));
        }

        if config.global_settings.backup_strategy == config::BackupStrategy::SiblingFile {
            issues.extend(self.check_backup_suffix(&config.global_settings.backup_suffix));
        }

        issues
    }

    fn validate_target(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            anyhow::bail!("File does not exist: {}", path.display());
        }

        let metadata = path
            .metadata()
            .with_context(|| format!("Failed to read metadata of {}", path.display()))?;

        if !metadata.is_file() {
            anyhow::bail!("Path is not a file: {}", path.display());
        }

        if metadata.permissions().readonly() {
            anyhow::bail!("File is not writable: {}", path.display());
        }

        Ok(())
    }
}
