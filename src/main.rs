use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use file_crawler::services::DEFAULT_CSV_PATH;
use file_crawler::{
    home_dir, run_crawl, AppConfig, CrawlOutcome, FileCopyConfig, FileDiscoveryConfig,
    ReportConfig, DEFAULT_LOG_FILE,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn, Level};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing home directory only changes the default root
    let home = home_dir().unwrap_or_else(|e| {
        println!("Error: {}", e);
        PathBuf::new()
    });

    let matches = build_cli().get_matches();

    let config = create_app_config(&matches, home)?;

    initialize_logging(&config.log_level, &config.log_file)?;

    run_application(config).await
}

fn build_cli() -> Command {
    Command::new("file-crawler")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Walk a directory tree, report files by extension and copy them in parallel")
        .arg(
            Arg::new("root-dir")
                .long("root-dir")
                .value_name("PATH")
                .help("The root directory to crawl [default: home directory]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("file-types")
                .long("file-types")
                .value_name("LIST")
                .help("Comma separated file types to find")
                .default_value(".py"),
        )
        .arg(
            Arg::new("to-dir")
                .long("to-dir")
                .value_name("PATH")
                .help("The directory to copy files into [default: system temp directory]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(bool_flag("copy-files", "Copy matching files into --to-dir", "false"))
        .arg(bool_flag("echo-files", "Print results to stdout", "true"))
        .arg(bool_flag("to-csv", "Write results to the CSV file", "false"))
        .arg(
            Arg::new("num-workers")
                .long("num-workers")
                .value_name("N")
                .help("Number of concurrent copy workers")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("4"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Set the log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Where to write the run log")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_LOG_FILE),
        )
        .arg(
            Arg::new("csv-path")
                .long("csv-path")
                .value_name("PATH")
                .help("Where --to-csv writes its output")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_CSV_PATH),
        )
}

/// `--name` alone means true; `--name false` turns a default-on flag off
fn bool_flag(name: &'static str, help: &'static str, default: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("BOOL")
        .help(help)
        .num_args(0..=1)
        .action(ArgAction::Set)
        .value_parser(value_parser!(bool))
        .default_value(default)
        .default_missing_value("true")
}

fn required<'a, T>(matches: &'a ArgMatches, id: &str) -> Result<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    matches
        .get_one::<T>(id)
        .ok_or_else(|| anyhow!("Missing value for --{}", id))
}

/// Build the application configuration from CLI arguments
fn create_app_config(matches: &ArgMatches, home: PathBuf) -> Result<AppConfig> {
    let defaults = AppConfig::default();

    let num_workers = usize::try_from(*required::<u64>(matches, "num-workers")?)
        .context("Invalid num-workers value")?;

    Ok(AppConfig {
        file_discovery: FileDiscoveryConfig {
            root_dir: matches.get_one::<PathBuf>("root-dir").cloned().unwrap_or(home),
            file_types: required::<String>(matches, "file-types")?.clone(),
            ..defaults.file_discovery
        },
        file_copy: FileCopyConfig {
            enabled: *required::<bool>(matches, "copy-files")?,
            to_dir: matches
                .get_one::<PathBuf>("to-dir")
                .cloned()
                .unwrap_or(defaults.file_copy.to_dir),
            num_workers,
        },
        report: ReportConfig {
            echo_files: *required::<bool>(matches, "echo-files")?,
            to_csv: *required::<bool>(matches, "to-csv")?,
            csv_path: required::<PathBuf>(matches, "csv-path")?.clone(),
        },
        log_level: required::<String>(matches, "log-level")?.clone(),
        log_file: required::<PathBuf>(matches, "log-file")?.clone(),
    })
}

/// Initialize structured logging into the run log file
fn initialize_logging(log_level: &str, log_file: &Path) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let (writer, open_error) = match File::create(log_file) {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), None),
        Err(e) => (BoxMakeWriter::new(std::io::stderr), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    match open_error {
        Some(e) => warn!("Could not create {}, logging to stderr: {}", log_file.display(), e),
        None => info!("This log is written to {}", log_file.display()),
    }

    Ok(())
}

async fn run_application(config: AppConfig) -> Result<()> {
    info!("crawler called");
    info!("Parsing {}", config.file_discovery.root_dir.display());
    info!("Looking for files of type: {}", config.file_discovery.file_types);
    info!("Output directory: {}", config.file_copy.to_dir.display());
    info!("Copy files? {}", config.file_copy.enabled);
    info!("Echo files? {}", config.report.echo_files);
    info!("Output to CSV file? {}", config.report.to_csv);
    info!("Number of workers: {}", config.file_copy.num_workers);

    let outcome = run_crawl(&config.file_discovery, &config.file_copy, &config.report).await;

    print_final_summary(&outcome);
    Ok(())
}

/// Walk and copy failures are logged here; the process still exits cleanly
fn print_final_summary(outcome: &CrawlOutcome) {
    info!("=== FINAL SUMMARY ===");
    info!("Entries scanned: {}", outcome.discovery.entries_scanned);
    info!("Files matched: {}", outcome.discovery.files_matched());
    info!("Files copied: {}", outcome.copy.successful_copies);
    info!("Copy errors: {}", outcome.copy.errors.len());
    if outcome.copy.total_processed() > 0 {
        info!("Copy success rate: {:.2}%", outcome.copy.success_rate() * 100.0);
    }

    if let Some(e) = &outcome.discovery.walk_error {
        error!("Error walking the directory: {}", e);
    }
}
