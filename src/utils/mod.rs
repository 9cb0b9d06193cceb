use crate::builders::reporter::reporter_for;
use crate::core::config::{
    CleanerConfig, ConfigManager, ConfigOverrides, ConfigProvider, SummaryFormat,
};
use crate::core::engine::CleanEngine;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Answers that cancel the interactive prompt.
const QUIT_WORDS: [&str; 3] = ["q", "quit", "exit"];

pub fn initialize_config(config_path: Option<PathBuf>) -> Result<()> {
    let config_manager = get_config_manager(config_path)?;
    if config_manager.initialize()? {
        println!("✓ Wrote default configuration to {}", config_manager.config_path().display());
    } else {
        println!(
            "ℹ️  Configuration already exists at {}",
            config_manager.config_path().display()
        );
    }
    Ok(())
}

/// Loads the configuration and applies command-line overrides.
///
/// An explicit `config_path` must exist; the default file in the current
/// directory is optional. The merged result is validated so a bad marker or
/// suffix is reported before any file is opened.
pub fn load_config(config_path: Option<PathBuf>, overrides: &ConfigOverrides) -> Result<CleanerConfig> {
    if let Some(path) = &config_path
        && !path.exists()
    {
        anyhow::bail!("Config file not found: {}", path.display());
    }

    let config_manager = get_config_manager(config_path)?;
    let mut config = config_manager.load_config()?;
    config.apply_overrides(overrides);
    config_manager.validate_config(&config)?;
    Ok(config)
}

/// `verbose` wins over `RUST_LOG`; without either, log at info.
pub fn log_filter(verbose: bool) -> Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::try_new("debug")?);
    }
    Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?)
}

/// Asks once for a file path.
///
/// Returns `None` when the user quits, enters nothing, or closes the input.
pub fn prompt_for_path<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Option<String>> {
    writeln!(output, "\n=== Import Failure Cleaner ===")?;
    writeln!(output, "This tool removes TEST.IMPORT_FAILURES blocks from test files\n")?;
    write!(output, "Enter the path to the file to clean (or 'q' to quit): ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).context("Failed to read from stdin")? == 0 {
        writeln!(output, "\nOperation cancelled.")?;
        return Ok(None);
    }

    let answer = line.trim();
    if QUIT_WORDS.contains(&answer.to_lowercase().as_str()) {
        writeln!(output, "Operation cancelled.")?;
        return Ok(None);
    }
    if answer.is_empty() {
        writeln!(output, "No file path provided.")?;
        return Ok(None);
    }

    Ok(Some(answer.to_string()))
}

/// Cleans `paths` and reports the outcome.
///
/// A single file is reported through the log only; several files also get a
/// summary on stdout. Returns `true` if every file succeeded.
pub fn clean_paths(paths: &[PathBuf], config: &CleanerConfig, dry_run: bool) -> Result<bool> {
    let mut engine = CleanEngine::new(config)?.with_dry_run(dry_run);
    let summary = engine.clean_files(paths);
    debug!(
        "Processed {} file(s), {} block(s) found",
        summary.files.len(),
        summary.blocks_found()
    );

    let format = config.global_settings.summary_format;
    if paths.len() > 1 || format != SummaryFormat::Text {
        let rendered = reporter_for(format).render_summary(&summary)?;
        println!("{rendered}");
    }

    Ok(summary.all_succeeded())
}

// Helper function to create ConfigManager instance
fn get_config_manager(config_path: Option<PathBuf>) -> Result<ConfigManager> {
    match config_path {
        Some(path) => Ok(ConfigManager::new_at(path)),
        None => ConfigManager::new(),
    }
}
