use crate::models::FileRecord;
use std::path::{Path, PathBuf};

/// One unit of work for the copy pool
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CopyJob {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl CopyJob {
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Job for a matched record, named `<uid>_<name>` under `to_dir`
    pub fn for_record(record: &FileRecord, to_dir: &Path) -> Self {
        Self::new(record.metadata.path.clone(), record.copy_destination(to_dir))
    }
}

/// Lifecycle of a job inside the pool; `Completed` and `Failed` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    InProgress,
    Completed,
    Failed,
}

/// Build one job per matched non-directory record, in discovery order
pub fn plan_copy_jobs(records: &[FileRecord], to_dir: &Path) -> Vec<CopyJob> {
    records
        .iter()
        .filter(|record| !record.metadata.is_dir)
        .map(|record| CopyJob::for_record(record, to_dir))
        .collect()
}
