use crate::error::{CrawlError, CrawlResult};
use crate::models::FileRecord;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const DEFAULT_CSV_PATH: &str = "./output.csv";

const ECHO_HEADER: [&str; 8] = [
    "UID",
    "Name",
    "Extension",
    "ModDate",
    "IsDir",
    "Size(B)",
    "FilePath",
    "IsRegularfile",
];

const CSV_HEADER: [&str; 8] = [
    "UID",
    "Name",
    "Extension",
    "ModDate",
    "IsDir",
    "Size(B)",
    "FilePath",
    "IsRegularFile",
];

/// Which reports to produce once the run is over
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub echo_files: bool,
    pub to_csv: bool,
    pub csv_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            echo_files: true,
            to_csv: false,
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
        }
    }
}

/// One CSV line; field names double as the header row
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "UID")]
    uid: u64,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Extension")]
    extension: &'a str,
    #[serde(rename = "ModDate")]
    mod_date: String,
    #[serde(rename = "IsDir")]
    is_dir: bool,
    #[serde(rename = "Size(B)")]
    size_bytes: u64,
    #[serde(rename = "FilePath")]
    path: String,
    #[serde(rename = "IsRegularFile")]
    is_regular: bool,
}

impl<'a> From<&'a FileRecord> for ReportRow<'a> {
    fn from(record: &'a FileRecord) -> Self {
        let metadata = &record.metadata;
        Self {
            uid: record.uid,
            name: &metadata.name,
            extension: &metadata.extension,
            mod_date: metadata.modified_at.to_string(),
            is_dir: metadata.is_dir,
            size_bytes: metadata.size_bytes,
            path: metadata.path.to_string_lossy().into_owned(),
            is_regular: metadata.is_regular,
        }
    }
}

/// Header plus one tab-separated line per record, in discovery order
pub fn write_echo_report<W: Write>(mut out: W, records: &[FileRecord]) -> io::Result<()> {
    writeln!(out, "{}", ECHO_HEADER.join("\t"))?;
    for record in records {
        let row = ReportRow::from(record);
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.uid,
            row.name,
            row.extension,
            row.mod_date,
            row.is_dir,
            row.size_bytes,
            row.path,
            row.is_regular
        )?;
    }
    out.flush()
}

/// Serialize the records as CSV with a header row
pub fn write_csv<W: Write>(out: W, records: &[FileRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(ReportRow::from(record))?;
    }
    // the header is emitted with the first row, so write it alone when empty
    if records.is_empty() {
        writer.write_record(CSV_HEADER)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_report<P: AsRef<Path>>(path: P, records: &[FileRecord]) -> CrawlResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| CrawlError::io("create CSV file", path, e))?;

    write_csv(file, records).map_err(|e| CrawlError::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Print the tab-separated report to stdout, logging any write failure
pub fn print_echo_report(records: &[FileRecord]) {
    let stdout = io::stdout();
    if let Err(e) = write_echo_report(stdout.lock(), records) {
        error!("Could not print report to stdout: {}", e);
    }
}

/// Write the CSV report, logging any failure
pub fn export_csv_report(path: &Path, records: &[FileRecord]) {
    if let Err(e) = write_csv_report(path, records) {
        error!("Could not create CSV file: {}", e);
    }
}
