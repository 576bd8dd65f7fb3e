use crate::error::{CrawlError, CrawlResult};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Separator used for the `--file-types` list
pub const DEFAULT_EXTENSION_SEPARATOR: &str = ",";

/// Case-insensitive set of file suffixes (".py", ".txt", ...)
///
/// Built once from the command line and read-only afterwards. Every segment
/// of the source list is kept, so an empty segment (`".py,"`) inserts `""`
/// and files without an extension match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: HashSet<String>,
}

impl ExtensionSet {
    /// Split `file_types` on `separator` and lower-case every segment
    pub fn parse(file_types: &str, separator: &str) -> Self {
        let extensions = file_types
            .split(separator)
            .map(str::to_lowercase)
            .collect();

        Self { extensions }
    }

    /// Membership test, ignoring case
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(&extension.to_lowercase())
    }

    /// Sorted view of the members, for logging
    pub fn sorted(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}

/// Extension of the final path component, leading dot included.
///
/// The suffix starts at the last `.` of the file name: `a.tar.gz` gives
/// `.gz`, `.bashrc` gives `.bashrc` and `Makefile` gives an empty string.
/// Case is preserved.
pub fn extension_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    match name.rfind('.') {
        Some(idx) => name[idx..].to_string(),
        None => String::new(),
    }
}

/// Copy the bytes of `from` into `to`, truncating `to` if it exists.
///
/// The source must resolve to a regular file (symlinks are followed).
/// Permissions and timestamps are not carried over.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> CrawlResult<u64> {
    let src_path = from.as_ref();
    let dest_path = to.as_ref();

    let metadata = fs::metadata(src_path).map_err(|e| CrawlError::Metadata {
        path: src_path.to_path_buf(),
        source: e,
    })?;

    if !metadata.is_file() {
        return Err(CrawlError::NotRegularFile {
            path: src_path.to_path_buf(),
        });
    }

    let mut source = File::open(src_path).map_err(|e| CrawlError::io("open", src_path, e))?;
    let mut destination =
        File::create(dest_path).map_err(|e| CrawlError::io("create", dest_path, e))?;

    io::copy(&mut source, &mut destination).map_err(|e| CrawlError::io("copy into", dest_path, e))
}

/// Convert a filesystem timestamp to UTC; times before 1970 are kept as-is
pub fn system_time_to_datetime(system_time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(system_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_lowercases_every_segment() {
        let set = ExtensionSet::parse(".PY,.Txt", DEFAULT_EXTENSION_SEPARATOR);
        assert_eq!(set.sorted(), vec![".py", ".txt"]);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let set = ExtensionSet::parse(".py", ",");
        assert!(set.contains(".py"));
        assert!(set.contains(".PY"));
        assert!(!set.contains(".pyc"));
    }

    #[test]
    fn test_trailing_separator_matches_extensionless_files() {
        let set = ExtensionSet::parse(".py,", ",");
        assert_eq!(set.sorted(), vec!["", ".py"]);
        assert!(set.contains(""));
        assert!(set.contains(&extension_of(Path::new("Makefile"))));

        let strict = ExtensionSet::parse(".py", ",");
        assert!(!strict.contains(""));
    }

    #[test]
    fn test_custom_separator() {
        let set = ExtensionSet::parse(".rs;.toml", ";");
        assert!(set.contains(".toml"));
        assert!(!set.contains(".rs;.toml"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("/tmp/a.py")), ".py");
        assert_eq!(extension_of(Path::new("archive.tar.GZ")), ".GZ");
        assert_eq!(extension_of(Path::new("/home/u/.bashrc")), ".bashrc");
        assert_eq!(extension_of(Path::new("Makefile")), "");
        assert_eq!(extension_of(&PathBuf::from("dir.d/Makefile")), "");
    }

    #[test]
    fn test_copy_file_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.bin");
        let dst = dir.path().join("0_a.bin");
        let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
        fs::write(&src, &payload).unwrap();
        fs::write(&dst, b"stale content that is longer than nothing").unwrap();

        let copied = copy_file(&src, &dst).unwrap();

        assert_eq!(copied, payload.len() as u64);
        assert_eq!(fs::read(&dst).unwrap(), payload);
    }

    #[test]
    fn test_copy_file_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_file(dir.path(), dir.path().join("out")).unwrap_err();
        assert!(matches!(err, CrawlError::NotRegularFile { .. }));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_copy_file_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_file(dir.path().join("nope.py"), dir.path().join("out")).unwrap_err();
        assert!(matches!(err, CrawlError::Metadata { .. }));
    }

    #[test]
    fn test_copy_file_missing_destination_dir() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.py");
        fs::write(&src, b"print()").unwrap();
        let err = copy_file(&src, dir.path().join("missing").join("0_a.py")).unwrap_err();
        assert!(matches!(err, CrawlError::Io { operation: "create", .. }));
    }

    #[test]
    fn test_system_time_to_datetime() {
        use std::time::{Duration, UNIX_EPOCH};

        let at = UNIX_EPOCH + Duration::new(1_700_000_000, 500);
        let dt = system_time_to_datetime(at);
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_nanos(), 500);
        assert_eq!(system_time_to_datetime(UNIX_EPOCH).timestamp(), 0);

        let before_epoch = UNIX_EPOCH - Duration::from_secs(86_400);
        assert_eq!(
            system_time_to_datetime(before_epoch).to_string(),
            "1969-12-31 00:00:00 UTC"
        );
    }
}
