use crate::error::{CrawlError, CrawlResult};
use crate::utils::{extension_of, system_time_to_datetime, ExtensionSet};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Snapshot of one filesystem entry visited by the walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub name: String,
    /// Original case; compare through [`ExtensionSet::contains`]
    pub extension: String,
    pub modified_at: DateTime<Utc>,
    pub is_dir: bool,
    pub size_bytes: u64,
    pub path: PathBuf,
    pub is_regular: bool,
}

impl FileMetadata {
    /// Build a snapshot from a walk entry without following symlinks
    pub fn from_entry(entry: &walkdir::DirEntry) -> CrawlResult<Self> {
        let metadata = entry.metadata().map_err(|e| CrawlError::Walk {
            path: entry.path().to_path_buf(),
            source: e,
        })?;

        let modified_at = metadata
            .modified()
            .map(system_time_to_datetime)
            .map_err(|e| CrawlError::Metadata {
                path: entry.path().to_path_buf(),
                source: e,
            })?;

        Ok(Self {
            name: entry.file_name().to_string_lossy().into_owned(),
            extension: extension_of(entry.path()),
            modified_at,
            is_dir: metadata.is_dir(),
            size_bytes: metadata.len(),
            path: entry.path().to_path_buf(),
            is_regular: metadata.file_type().is_file(),
        })
    }

    /// Directories are descended into but never match
    pub fn matches(&self, extensions: &ExtensionSet) -> bool {
        !self.is_dir && extensions.contains(&self.extension)
    }
}

/// A matched entry together with the identifier it was given at match time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub uid: u64,
    pub metadata: FileMetadata,
}

impl FileRecord {
    pub fn new(uid: u64, metadata: FileMetadata) -> Self {
        Self { uid, metadata }
    }

    /// `<to_dir>/<uid>_<name>`, unique even when several sources share a name
    pub fn copy_destination(&self, to_dir: &Path) -> PathBuf {
        to_dir.join(format!("{}_{}", self.uid, self.metadata.name))
    }
}
