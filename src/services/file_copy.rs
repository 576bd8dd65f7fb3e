use crate::error::CrawlError;
use crate::models::{plan_copy_jobs, CopyJob, FileRecord, JobState};
use crate::utils::copy_file;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const DEFAULT_NUM_WORKERS: usize = 4;

/// Configuration for the copy phase
#[derive(Debug, Clone)]
pub struct FileCopyConfig {
    pub enabled: bool,
    pub to_dir: PathBuf,
    pub num_workers: usize,
}

impl Default for FileCopyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            to_dir: env::temp_dir(),
            num_workers: DEFAULT_NUM_WORKERS,
        }
    }
}

type JobQueue = Arc<Mutex<mpsc::Receiver<CopyJob>>>;

/// Copy every matched record into the configured destination.
///
/// Returns an empty report without touching the filesystem when copying is
/// disabled.
pub async fn copy_discovered_files(
    records: &[FileRecord],
    config: &FileCopyConfig,
) -> FileCopyReport {
    if !config.enabled {
        debug!("Copying disabled, skipping {} records", records.len());
        return FileCopyReport::empty();
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.to_dir).await {
        warn!(
            "Failed to create destination directory {}: {}",
            config.to_dir.display(),
            e
        );
    }

    let jobs = plan_copy_jobs(records, &config.to_dir);
    info!("Copying {} files into {}", jobs.len(), config.to_dir.display());

    let report = run_copy_pool(jobs, config.num_workers).await;

    info!(
        "File copy completed. Success: {}, Errors: {}",
        report.successful_copies,
        report.errors.len()
    );

    report
}

/// Drain `jobs` with `num_workers` concurrent workers.
///
/// The queue and the error channel are sized to the job count. Each worker
/// pulls a job, copies it on the blocking pool and moves on; failures are
/// pushed to the error channel and never stop the pool. Returns once every
/// job has completed or failed, after both channels are closed.
pub async fn run_copy_pool(jobs: Vec<CopyJob>, num_workers: usize) -> FileCopyReport {
    let num_workers = num_workers.max(1);
    let capacity = jobs.len().max(1);
    let total_jobs = jobs.len();

    let (job_tx, job_rx) = mpsc::channel::<CopyJob>(capacity);
    let (error_tx, error_rx) = mpsc::channel::<CopyError>(capacity);

    for job in jobs {
        debug!(
            state = ?JobState::Queued,
            "{} -> {}",
            job.source.display(),
            job.destination.display()
        );
        if let Err(e) = job_tx.try_send(job) {
            // capacity covers every job and the receiver is still alive
            error!("Copy queue rejected a job: {}", e);
        }
    }
    // closing the queue lets idle workers exit once it is drained
    drop(job_tx);

    let drain = tokio::spawn(drain_errors(error_rx));

    info!("Initialising {} workers", num_workers);
    let queue: JobQueue = Arc::new(Mutex::new(job_rx));
    let workers: Vec<JoinHandle<Vec<CopiedFile>>> = (0..num_workers)
        .map(|worker_id| tokio::spawn(copy_worker(worker_id, queue.clone(), error_tx.clone())))
        .collect();
    drop(error_tx);

    let mut copied_files = Vec::with_capacity(total_jobs);
    for (worker_id, handle) in workers.into_iter().enumerate() {
        match handle.await {
            Ok(mut done) => copied_files.append(&mut done),
            Err(e) => error!("Copy worker {} aborted: {}", worker_id, e),
        }
    }

    // every sender is gone once the workers have returned
    let errors = drain.await.unwrap_or_else(|e| {
        error!("Error drain task aborted: {}", e);
        Vec::new()
    });

    let accounted = copied_files.len() + errors.len();
    if accounted != total_jobs {
        warn!("Copy pool accounted for {} of {} jobs", accounted, total_jobs);
    }

    FileCopyReport {
        successful_copies: copied_files.len(),
        copied_files,
        errors,
    }
}

async fn copy_worker(
    worker_id: usize,
    queue: JobQueue,
    errors: mpsc::Sender<CopyError>,
) -> Vec<CopiedFile> {
    let mut copied = Vec::new();

    loop {
        let job = { queue.lock().await.recv().await };
        let Some(job) = job else {
            break;
        };

        info!("Copying {} to {}", job.source.display(), job.destination.display());
        debug!(worker_id, state = ?JobState::InProgress, "{}", job.source.display());

        let source = job.source.clone();
        let destination = job.destination.clone();
        let result = tokio::task::spawn_blocking(move || copy_file(&source, &destination))
            .await
            .unwrap_or_else(|e| {
                Err(CrawlError::TaskJoin {
                    path: job.source.clone(),
                    source: e,
                })
            });

        match result {
            Ok(bytes) => {
                debug!(
                    worker_id,
                    state = ?JobState::Completed,
                    bytes,
                    "{}",
                    job.destination.display()
                );
                copied.push(CopiedFile {
                    source: job.source,
                    destination: job.destination,
                    bytes,
                });
            }
            Err(e) => {
                debug!(worker_id, state = ?JobState::Failed, "{}", job.source.display());
                let failure = CopyError {
                    source: job.source,
                    destination: job.destination,
                    error: e.to_string(),
                };
                if errors.send(failure).await.is_err() {
                    warn!("Error channel closed before worker {} finished", worker_id);
                }
            }
        }
    }

    debug!(worker_id, "Copy worker exiting, {} files copied", copied.len());
    copied
}

async fn drain_errors(mut errors: mpsc::Receiver<CopyError>) -> Vec<CopyError> {
    let mut collected = Vec::new();
    while let Some(failure) = errors.recv().await {
        error!(
            "Failed to copy {} to {}: {}",
            failure.source.display(),
            failure.destination.display(),
            failure.error
        );
        collected.push(failure);
    }
    collected
}

/// Report structure for the copy phase
#[derive(Debug, Clone, Default)]
pub struct FileCopyReport {
    pub successful_copies: usize,
    pub copied_files: Vec<CopiedFile>,
    pub errors: Vec<CopyError>,
}

impl FileCopyReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn total_processed(&self) -> usize {
        self.successful_copies + self.errors.len()
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total_processed();
        if total == 0 {
            0.0
        } else {
            self.successful_copies as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CopiedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CopyError {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileMetadata;
    use chrono::DateTime;
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;

    fn write_sources(dir: &Path, files: &[(&str, &[u8])]) -> Vec<CopyJob> {
        let out = dir.join("out");
        fs::create_dir_all(&out).unwrap();
        files
            .iter()
            .enumerate()
            .map(|(uid, (name, bytes))| {
                let src = dir.join(name);
                fs::write(&src, bytes).unwrap();
                CopyJob::new(src, out.join(format!("{}_{}", uid, name)))
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_copies_every_job() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = write_sources(
            dir.path(),
            &[
                ("a.py", b"aaaa"),
                ("b.py", b"bb"),
                ("c.txt", b"c"),
                ("d.txt", b""),
                ("e.py", b"eeeee"),
            ],
        );

        let report = run_copy_pool(jobs.clone(), 3).await;

        assert_eq!(report.successful_copies, 5);
        assert!(report.errors.is_empty());
        assert_eq!(report.success_rate(), 1.0);
        for job in &jobs {
            assert_eq!(fs::read(&job.destination).unwrap(), fs::read(&job.source).unwrap());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failed_job_does_not_stop_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let mut jobs = write_sources(dir.path(), &[("a.py", b"one"), ("b.py", b"two")]);
        jobs.insert(
            1,
            CopyJob::new(dir.path().join("missing.py"), dir.path().join("out/9_missing.py")),
        );
        jobs.push(CopyJob::new(
            dir.path().to_path_buf(),
            dir.path().join("out/10_dir.py"),
        ));

        let report = run_copy_pool(jobs, 2).await;

        assert_eq!(report.successful_copies, 2);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.total_processed(), 4);
        assert_eq!(report.success_rate(), 0.5);
        let failed: HashSet<PathBuf> = report.errors.iter().map(|e| e.source.clone()).collect();
        assert!(failed.contains(&dir.path().join("missing.py")));
        assert!(failed.contains(dir.path()));
        assert!(!dir.path().join("out/10_dir.py").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_and_many_workers_agree() {
        let dir = tempfile::tempdir().unwrap();
        let mut jobs = write_sources(
            dir.path(),
            &[("a.py", b"1"), ("b.py", b"22"), ("c.py", b"333"), ("d.py", b"4444")],
        );
        jobs.push(CopyJob::new(
            dir.path().join("nope.py"),
            dir.path().join("out/4_nope.py"),
        ));

        let serial = run_copy_pool(jobs.clone(), 1).await;
        let parallel = run_copy_pool(jobs, 8).await;

        let as_set = |r: &FileCopyReport| r.copied_files.iter().cloned().collect::<HashSet<_>>();
        let errors = |r: &FileCopyReport| r.errors.iter().cloned().collect::<HashSet<_>>();
        assert_eq!(as_set(&serial), as_set(&parallel));
        assert_eq!(errors(&serial), errors(&parallel));
        assert_eq!(serial.successful_copies, 4);
        assert_eq!(serial.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_job_list() {
        let report = run_copy_pool(Vec::new(), 4).await;
        assert_eq!(report.total_processed(), 0);
        assert_eq!(report.success_rate(), 0.0);
    }

    #[tokio::test]
    async fn test_zero_workers_still_drains() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = write_sources(dir.path(), &[("a.py", b"x")]);
        let report = run_copy_pool(jobs, 0).await;
        assert_eq!(report.successful_copies, 1);
    }

    #[tokio::test]
    async fn test_disabled_copy_creates_no_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.py");
        fs::write(&src, b"x").unwrap();
        let record = FileRecord::new(
            0,
            FileMetadata {
                name: "a.py".to_string(),
                extension: ".py".to_string(),
                modified_at: DateTime::default(),
                is_dir: false,
                size_bytes: 1,
                path: src,
                is_regular: true,
            },
        );
        let config = FileCopyConfig {
            enabled: false,
            to_dir: dir.path().join("out"),
            num_workers: 2,
        };

        let report = copy_discovered_files(&[record], &config).await;

        assert_eq!(report.total_processed(), 0);
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_destination_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.py");
        fs::write(&src, b"print(1)").unwrap();
        let record = FileRecord::new(
            3,
            FileMetadata {
                name: "a.py".to_string(),
                extension: ".py".to_string(),
                modified_at: DateTime::default(),
                is_dir: false,
                size_bytes: 8,
                path: src,
                is_regular: true,
            },
        );
        let config = FileCopyConfig {
            enabled: true,
            to_dir: dir.path().join("nested").join("out"),
            num_workers: 2,
        };

        let report = copy_discovered_files(&[record], &config).await;

        assert_eq!(report.successful_copies, 1);
        assert_eq!(
            fs::read(dir.path().join("nested/out/3_a.py")).unwrap(),
            b"print(1)"
        );
    }
}
