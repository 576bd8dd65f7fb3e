use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crawler library.
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Errors produced while walking, copying or reporting.
///
/// None of these terminate the process: walk errors stop the traversal,
/// copy errors stay local to one job, report errors are logged.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to get user home directory")]
    HomeDir,

    #[error("failed to walk directory tree at {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read metadata for {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} is not a regular file")]
    NotRegularFile { path: PathBuf },

    #[error("failed to {operation} {path:?}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write CSV report to {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("copy task for {path:?} did not complete: {source}")]
    TaskJoin {
        path: PathBuf,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl CrawlError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
