pub mod copy_job;
pub mod file_record;

pub use copy_job::{plan_copy_jobs, CopyJob, JobState};
pub use file_record::{FileMetadata, FileRecord};
