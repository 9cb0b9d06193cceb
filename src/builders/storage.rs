use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Keeps a copy of a file's original text before it is overwritten.
pub trait BackupProvider {
    /// Stores `original_content` for `file_path`.
    ///
    /// Returns the location of the backup, or `None` if the provider does not
    /// keep one.
    fn store_backup(&mut self, file_path: &Path, original_content: &str) -> Result<Option<PathBuf>>;
}

/// Writes the backup next to the original file, with a suffix appended to
/// the full file name (`env.tst` becomes `env.tst.bak`).
pub struct SiblingFileBackup {
    suffix: String,
}

impl SiblingFileBackup {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn get_backup_path(&self, file_path: &Path) -> PathBuf {
        let mut name = file_path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(&self.suffix);
        file_path.with_file_name(name)
    }
}

impl BackupProvider for SiblingFileBackup {
    fn store_backup(&mut self, file_path: &Path, original_content: &str) -> Result<Option<PathBuf>> {
        let backup_path = self.get_backup_path(file_path);
        fs::write(&backup_path, original_content)
            .with_context(|| format!("Failed to write backup file {}", backup_path.display()))?;
        Ok(Some(backup_path))
    }
}

pub struct NoBackup;

impl BackupProvider for NoBackup {
    fn store_backup(&mut self, _file_path: &Path, _original_content: &str) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}
