/// Generated test scripts record the units that failed to import between
/// `TEST.IMPORT_FAILURES:` and `TEST.END_IMPORT_FAILURES:`. Those blocks
/// have to go before the script can be imported again, and editing them out
/// by hand across a whole suite is tedious and easy to get wrong.
use anyhow::Result;
use clap::Parser;
use import_failure_cleaner::core::config::{ConfigOverrides, SummaryFormat};
use import_failure_cleaner::utils;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "import-failure-cleaner", version)]
#[command(about = "Clean test files by removing import failure blocks")]
#[command(after_help = "Example: import-failure-cleaner test_file.tst --no-backup")]
struct Cli {
    /// File(s) to clean. If none are given, you will be prompted for one
    files: Vec<PathBuf>,

    /// Don't create backup files
    #[arg(long)]
    no_backup: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Count blocks without modifying any file
    #[arg(long)]
    dry_run: bool,

    /// Configuration file (defaults to ./.import-failure-cleaner.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the start marker
    #[arg(long, value_name = "MARKER")]
    start_marker: Option<String>,

    /// Override the end marker
    #[arg(long, value_name = "MARKER")]
    end_marker: Option<String>,

    /// Format of the batch summary
    #[arg(long, value_enum)]
    format: Option<SummaryFormat>,

    /// Write the default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.init_config {
        utils::initialize_config(cli.config)?;
        return Ok(ExitCode::SUCCESS);
    }

    let overrides = ConfigOverrides {
        no_backup: cli.no_backup,
        verbose: cli.verbose,
        start_marker: cli.start_marker,
        end_marker: cli.end_marker,
        summary_format: cli.format,
    };
    let config = utils::load_config(cli.config, &overrides)?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(utils::log_filter(config.global_settings.verbose)?)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    if config.global_settings.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    let files = if cli.files.is_empty() {
        let stdin = io::stdin();
        match utils::prompt_for_path(&mut stdin.lock(), &mut io::stdout())? {
            Some(path) => vec![PathBuf::from(path)],
            None => return Ok(ExitCode::SUCCESS),
        }
    } else {
        cli.files
    };

    if utils::clean_paths(&files, &config, cli.dry_run)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
