use crate::builders::blocks::BlockRemover;
use crate::builders::storage::{BackupProvider, NoBackup, SiblingFileBackup};
use crate::builders::validator::{ConfigValidator, StandardValidator};
use crate::core::config::{BackupStrategy, CleanerConfig};
use anyhow::{Context, Result};
use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Blocks were removed and the file was rewritten.
    Cleaned,
    /// The file held no blocks and was left alone.
    Unchanged,
    /// Blocks were found but nothing was written.
    DryRun,
    /// The file could not be processed.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    pub blocks_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn new(path: &Path, status: FileStatus, blocks_found: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            blocks_found,
            backup_path: None,
            error: None,
        }
    }

    fn failed(path: &Path, error: &anyhow::Error) -> Self {
        Self {
            error: Some(format!("{error:#}")),
            ..Self::new(path, FileStatus::Failed, 0)
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status != FileStatus::Failed
    }
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}

impl BatchSummary {
    pub fn push(&mut self, report: FileReport) {
        if report.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.files.push(report);
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn failed_paths(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(|report| !report.succeeded())
            .map(|report| report.path.as_path())
    }

    pub fn blocks_found(&self) -> usize {
        self.files.iter().map(|report| report.blocks_found).sum()
    }
}

pub struct CleanEngine {
    remover: BlockRemover,
    storage: Box<dyn BackupProvider>,
    validator: StandardValidator,
    dry_run: bool,
}

impl CleanEngine {
    pub fn new(config: &CleanerConfig) -> Result<Self> {
        let validator = StandardValidator::new();
        let issues = validator.validate_config(config);
        if !issues.is_empty() {
            anyhow::bail!("Invalid configuration:\n  - {}", issues.join("\n  - "));
        }

        let remover = BlockRemover::new(config.markers.clone())?;

        // Choose storage strategy based on config
        let storage: Box<dyn BackupProvider> = match config.global_settings.backup_strategy {
            BackupStrategy::SiblingFile => {
                Box::new(SiblingFileBackup::new(config.global_settings.backup_suffix.clone()))
            }
            BackupStrategy::Disabled => Box::new(NoBackup),
        };

        Ok(Self {
            remover,
            storage,
            validator,
            dry_run: false,
        })
    }

    /// Count blocks but never write backups or cleaned files.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Cleans one file in place.
    ///
    /// A file without blocks is neither backed up nor rewritten. Bytes that
    /// are not valid UTF-8 are replaced with U+FFFD rather than failing the
    /// whole file.
    pub fn clean_file(&mut self, path: &Path) -> Result<FileReport> {
        self.validator.validate_target(path)?;

        info!("Reading file: {}", path.display());
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let original = String::from_utf8_lossy(&bytes);
        if matches!(original, Cow::Owned(_)) {
            warn!("{} is not valid UTF-8; invalid bytes were replaced", path.display());
        }

        let block_count = self.remover.count(&original);
        if block_count == 0 {
            info!("No import failure blocks found in {}", path.display());
            return Ok(FileReport::new(path, FileStatus::Unchanged, 0));
        }
        info!("Found {block_count} import failure block(s)");

        if self.dry_run {
            debug!("Dry run: leaving {} untouched", path.display());
            return Ok(FileReport::new(path, FileStatus::DryRun, block_count));
        }

        let backup_path = self.storage.store_backup(path, &original)?;
        if let Some(backup_path) = &backup_path {
            info!("Created backup: {}", backup_path.display());
        }

        let result = self.remover.clean(&original);

        info!("Writing cleaned content to: {}", path.display());
        fs::write(path, &result.content)
            .with_context(|| format!("Failed to write cleaned content to {}", path.display()))?;

        info!("Successfully cleaned {} import failure block(s)", result.blocks_removed);
        Ok(FileReport {
            backup_path,
            ..FileReport::new(path, FileStatus::Cleaned, result.blocks_removed)
        })
    }

    /// Cleans every path in order. A failure is recorded in the summary and
    /// the remaining files are still processed.
    pub fn clean_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for path in paths {
            let path = path.as_ref();
            info!("Processing file: {}", path.display());
            let report = match self.clean_file(path) {
                Ok(report) => report,
                Err(e) => {
                    error!("{e:#}");
                    FileReport::failed(path, &e)
                }
            };
            summary.push(report);
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const DIRTY: &str = "TEST.UNIT:env\nTEST.IMPORT_FAILURES:\nbad\nTEST.END_IMPORT_FAILURES:\nTEST.END\n";

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = CleanerConfig::default();
        config.markers.end.clear();
        let err = CleanEngine::new(&config).err().unwrap();
        assert!(err.to_string().contains("End marker cannot be empty"));
    }

    #[test]
    fn test_clean_file_writes_backup_and_result() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("env.tst");
        fs::write(&file, DIRTY).unwrap();

        let mut engine = CleanEngine::new(&CleanerConfig::default()).unwrap();
        let report = engine.clean_file(&file).unwrap();

        assert_eq!(report.status, FileStatus::Cleaned);
        assert_eq!(report.blocks_found, 1);
        assert_eq!(report.backup_path, Some(dir.path().join("env.tst.bak")));
        assert_eq!(fs::read_to_string(&file).unwrap(), "TEST.UNIT:env\nTEST.END\n");
        assert_eq!(fs::read_to_string(dir.path().join("env.tst.bak")).unwrap(), DIRTY);
    }

    #[test]
    fn test_dry_run_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("env.tst");
        fs::write(&file, DIRTY).unwrap();

        let mut engine = CleanEngine::new(&CleanerConfig::default())
            .unwrap()
            .with_dry_run(true);
        let report = engine.clean_file(&file).unwrap();

        assert_eq!(report.status, FileStatus::DryRun);
        assert_eq!(report.blocks_found, 1);
        assert_eq!(fs::read_to_string(&file).unwrap(), DIRTY);
        assert!(!dir.path().join("env.tst.bak").exists());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("env.tst");
        let mut bytes = b"ok \xff\n".to_vec();
        bytes.extend_from_slice(DIRTY.as_bytes());
        fs::write(&file, bytes).unwrap();

        let mut config = CleanerConfig::default();
        config.global_settings.backup_strategy = BackupStrategy::Disabled;
        let mut engine = CleanEngine::new(&config).unwrap();
        let report = engine.clean_file(&file).unwrap();

        assert_eq!(report.status, FileStatus::Cleaned);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "ok \u{FFFD}\nTEST.UNIT:env\nTEST.END\n"
        );
    }

    #[test]
    fn test_batch_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.push(FileReport::new(Path::new("a"), FileStatus::Cleaned, 2));
        summary.push(FileReport::new(Path::new("b"), FileStatus::Unchanged, 0));
        summary.push(FileReport::failed(Path::new("c"), &anyhow::anyhow!("boom")));

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.blocks_found(), 2);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.failed_paths().collect::<Vec<_>>(), vec![Path::new("c")]);
    }
}
