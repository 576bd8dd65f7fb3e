pub mod crawler;
pub mod file_copy;
pub mod file_discovery;
pub mod report;

pub use crawler::{run_crawl, CrawlOutcome};
pub use file_copy::{
    copy_discovered_files, run_copy_pool, CopiedFile, CopyError, FileCopyConfig, FileCopyReport,
    DEFAULT_NUM_WORKERS,
};
pub use file_discovery::{
    discover_files, walk_tree, FileDiscoveryConfig, FileDiscoveryReport, MetadataCollector,
};
pub use report::{
    export_csv_report, print_echo_report, write_csv, write_csv_report, write_echo_report,
    ReportConfig, DEFAULT_CSV_PATH,
};
