use crate::services::file_copy::{copy_discovered_files, FileCopyConfig, FileCopyReport};
use crate::services::file_discovery::{discover_files, FileDiscoveryConfig, FileDiscoveryReport};
use crate::services::report::{export_csv_report, print_echo_report, ReportConfig};
use tracing::error;

/// Everything a crawl produced, returned for summary logging and tests
#[derive(Debug)]
pub struct CrawlOutcome {
    pub discovery: FileDiscoveryReport,
    pub copy: FileCopyReport,
}

/// Walk, report, copy, then write the CSV.
///
/// The walk finishes before any copy starts. Stdout rows are printed as
/// soon as the walk is over; the CSV waits for the copy pool. A walk error
/// has already been logged by discovery and does not stop the copies of
/// the records found before it.
pub async fn run_crawl(
    discovery_config: &FileDiscoveryConfig,
    copy_config: &FileCopyConfig,
    report_config: &ReportConfig,
) -> CrawlOutcome {
    let walk_config = discovery_config.clone();
    let discovery = tokio::task::spawn_blocking(move || discover_files(&walk_config))
        .await
        .unwrap_or_else(|e| {
            error!("Directory walk task failed: {}", e);
            FileDiscoveryReport::empty()
        });

    if report_config.echo_files {
        print_echo_report(&discovery.records);
    }

    let copy = copy_discovered_files(&discovery.records, copy_config).await;

    if report_config.to_csv {
        export_csv_report(&report_config.csv_path, &discovery.records);
    }

    CrawlOutcome { discovery, copy }
}
