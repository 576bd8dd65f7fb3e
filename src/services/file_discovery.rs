use crate::error::{CrawlError, CrawlResult};
use crate::models::{FileMetadata, FileRecord};
use crate::utils::{ExtensionSet, DEFAULT_EXTENSION_SEPARATOR};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Configuration for the directory walk
#[derive(Debug, Clone)]
pub struct FileDiscoveryConfig {
    pub root_dir: PathBuf,
    pub file_types: String,
    pub separator: String,
}

impl Default for FileDiscoveryConfig {
    fn default() -> Self {
        Self {
            root_dir: dirs::home_dir().unwrap_or_default(),
            file_types: ".py".to_string(),
            separator: DEFAULT_EXTENSION_SEPARATOR.to_string(),
        }
    }
}

impl FileDiscoveryConfig {
    pub fn extension_set(&self) -> ExtensionSet {
        ExtensionSet::parse(&self.file_types, &self.separator)
    }
}

/// Retains matching entries and hands out their identifiers.
///
/// The counter starts at 0 and advances once per match, never per visited
/// entry, so identifiers follow discovery order without gaps.
#[derive(Debug)]
pub struct MetadataCollector {
    extensions: ExtensionSet,
    next_uid: u64,
    entries_scanned: usize,
    records: Vec<FileRecord>,
}

impl MetadataCollector {
    pub fn new(extensions: ExtensionSet) -> Self {
        Self {
            extensions,
            next_uid: 0,
            entries_scanned: 0,
            records: Vec::new(),
        }
    }

    /// Offer one snapshot; returns the assigned identifier when it matches
    pub fn offer(&mut self, metadata: FileMetadata) -> Option<u64> {
        self.entries_scanned += 1;

        if !metadata.matches(&self.extensions) {
            return None;
        }

        let uid = self.next_uid;
        self.next_uid += 1;
        debug!("Matched {} as {}", metadata.path.display(), uid);
        self.records.push(FileRecord::new(uid, metadata));
        Some(uid)
    }

    pub fn entries_scanned(&self) -> usize {
        self.entries_scanned
    }

    pub fn into_records(self) -> Vec<FileRecord> {
        self.records
    }
}

/// Walk `root` depth-first in file-name order, offering every entry.
///
/// The root itself is visited. Symlinks are reported, not followed. The
/// first entry whose metadata can't be read stops the walk; whatever the
/// collector holds at that point is kept.
pub fn walk_tree<P: AsRef<Path>>(root: P, collector: &mut MetadataCollector) -> CrawlResult<()> {
    let root = root.as_ref();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| CrawlError::Walk {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source: e,
        })?;

        collector.offer(FileMetadata::from_entry(&entry)?);
    }

    Ok(())
}

/// Anchor a relative root at the working directory so every record path is
/// absolute. Symlinks in the root are left unresolved.
fn absolute_root(root_dir: &Path) -> PathBuf {
    std::path::absolute(root_dir).unwrap_or_else(|_| root_dir.to_path_buf())
}

/// Walk the configured root and collect matching records
pub fn discover_files(config: &FileDiscoveryConfig) -> FileDiscoveryReport {
    let extensions = config.extension_set();
    let root = absolute_root(&config.root_dir);
    info!(
        "Scanning {} for file extensions: {:?}",
        root.display(),
        extensions.sorted()
    );

    let mut collector = MetadataCollector::new(extensions);
    let walk_error = walk_tree(&root, &mut collector).err();

    if let Some(error) = &walk_error {
        warn!("Directory walk stopped early: {}", error);
    }

    let report = FileDiscoveryReport {
        entries_scanned: collector.entries_scanned(),
        records: collector.into_records(),
        walk_error,
    };

    info!(
        "File discovery completed. Scanned: {}, Matched: {}",
        report.entries_scanned,
        report.records.len()
    );

    report
}

/// Outcome of the walk phase
#[derive(Debug)]
pub struct FileDiscoveryReport {
    pub entries_scanned: usize,
    pub records: Vec<FileRecord>,
    pub walk_error: Option<CrawlError>,
}

impl FileDiscoveryReport {
    pub fn empty() -> Self {
        Self {
            entries_scanned: 0,
            records: Vec::new(),
            walk_error: None,
        }
    }

    pub fn files_matched(&self) -> usize {
        self.records.len()
    }

    pub fn is_complete(&self) -> bool {
        self.walk_error.is_none()
    }
}
