pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::path::PathBuf;

// Re-export commonly used types
pub use error::{CrawlError, CrawlResult};
pub use models::{plan_copy_jobs, CopyJob, FileMetadata, FileRecord, JobState};
pub use services::{
    copy_discovered_files, discover_files, run_copy_pool, run_crawl, CrawlOutcome, FileCopyConfig,
    FileCopyReport, FileDiscoveryConfig, FileDiscoveryReport, MetadataCollector, ReportConfig,
};
pub use utils::ExtensionSet;

pub const DEFAULT_LOG_FILE: &str = "./crawler_log.txt";

// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub file_discovery: FileDiscoveryConfig,
    pub file_copy: FileCopyConfig,
    pub report: ReportConfig,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            file_discovery: FileDiscoveryConfig::default(),
            file_copy: FileCopyConfig::default(),
            report: ReportConfig::default(),
            log_level: "info".to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Resolve the caller's home directory, the default crawl root
pub fn home_dir() -> CrawlResult<PathBuf> {
    dirs::home_dir().ok_or(CrawlError::HomeDir)
}
