//! Report stores: where finished tables end up.
//!
//! [`FileReportStore`] writes CSV files under a root directory, one
//! subdirectory per course. [`MemoryReportStore`] keeps uploads in memory.

use crate::error::{ReportError, Result};
use crate::services::{ReportStore, StoredReport};
use crate::types::CourseKey;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::debug;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Timestamp format embedded in report file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H%M";

/// Make a course id safe for file names ("course-v1:edX+DemoX+2024" -> "edX_DemoX_2024")
pub fn course_filename_prefix(course: &CourseKey) -> String {
    let key = course.as_str();
    let key = key.split_once(':').map_or(key, |(_, rest)| rest);
    sanitize(key)
}

fn sanitize(s: &str) -> String {
    s.chars().map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' }).collect()
}

/// File name for a report upload
pub fn report_filename(course: &CourseKey, name: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}_{}_{}.csv", course_filename_prefix(course), sanitize(name), timestamp.format(TIMESTAMP_FORMAT))
}

/// Read a stored report back as rows; the first row is the header
pub fn read_report(path: &Path) -> Result<Vec<Vec<String>>> {
    let name = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ReportError::storage(name.as_str(), e.into()))?;

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(String::from).collect())
                .map_err(|e| ReportError::storage(name.as_str(), e.into()))
        })
        .collect()
}

/// CSV files under `<root>/<course prefix>/`
#[derive(Debug, Clone)]
pub struct FileReportStore {
    root: PathBuf,
}

impl FileReportStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn course_dir(&self, course: &CourseKey) -> PathBuf {
        self.root.join(course_filename_prefix(course))
    }

    /// Reports already stored for a course, oldest name first
    pub fn list_reports(&self, course: &CourseKey) -> Result<Vec<PathBuf>> {
        let dir = self.course_dir(course);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|e| ReportError::storage(dir.display().to_string(), e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

impl ReportStore for FileReportStore {
    fn store_rows(
        &self,
        course: &CourseKey,
        name: &str,
        rows: &[Vec<String>],
        timestamp: DateTime<Utc>,
    ) -> Result<StoredReport> {
        let dir = self.course_dir(course);
        fs::create_dir_all(&dir).map_err(|e| ReportError::storage(name, e))?;

        let path = dir.join(report_filename(course, name, timestamp));
        debug!("Writing {} rows to {:?}", rows.len(), path);

        let file = File::create(&path).map_err(|e| ReportError::storage(name, e))?;
        file.lock_exclusive().map_err(|e| ReportError::storage(name, e))?;

        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(BufWriter::new(&file));
        let written = rows
            .iter()
            .try_for_each(|row| writer.write_record(row))
            .map_err(std::io::Error::from)
            .and_then(|_| writer.flush());
        drop(writer);
        let _ = FileExt::unlock(&file);
        written.map_err(|e| ReportError::storage(name, e))?;

        Ok(StoredReport { name: name.to_string(), location: path, rows: rows.len() })
    }
}

/// One upload recorded by [`MemoryReportStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTable {
    pub course: CourseKey,
    pub name: String,
    pub rows: Vec<Vec<String>>,
    pub timestamp: DateTime<Utc>,
}

/// Report store that records uploads in memory
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    tables: Mutex<Vec<StoredTable>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> Vec<StoredTable> {
        self.tables.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Uploads stored under `name`
    pub fn tables_named(&self, name: &str) -> Vec<StoredTable> {
        self.tables().into_iter().filter(|t| t.name == name).collect()
    }
}

impl ReportStore for MemoryReportStore {
    fn store_rows(
        &self,
        course: &CourseKey,
        name: &str,
        rows: &[Vec<String>],
        timestamp: DateTime<Utc>,
    ) -> Result<StoredReport> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| ReportError::storage(name, std::io::Error::other("report store lock poisoned")))?;
        tables.push(StoredTable { course: course.clone(), name: name.to_string(), rows: rows.to_vec(), timestamp });
        Ok(StoredReport { name: name.to_string(), location: PathBuf::from(format!("memory://{}", name)), rows: rows.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn course() -> CourseKey {
        CourseKey::new("course-v1:edX+DemoX+2024")
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn test_course_filename_prefix() {
        assert_eq!(course_filename_prefix(&course()), "edX_DemoX_2024");
        assert_eq!(course_filename_prefix(&CourseKey::new("edX/Demo/2013")), "edX_Demo_2013");
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename(&course(), "grade_report", timestamp()), "edX_DemoX_2024_grade_report_2024-05-06-0708.csv");
    }

    #[test]
    fn test_stored_report_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileReportStore::new(dir.path());
        let rows = vec![
            vec!["Student ID".to_string(), "State".to_string()],
            vec!["1".to_string(), "{\"a\": \"x,y\"}".to_string()],
            vec!["2".to_string(), "two\nlines".to_string()],
            vec!["3".to_string(), String::new()],
        ];

        let stored = store.store_rows(&course(), "student_state", &rows, timestamp()).unwrap();

        assert_eq!(read_report(&stored.location).unwrap(), rows);
    }

    #[test]
    fn test_read_report_handles_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("windows.csv");
        fs::write(&path, "Student ID,Username\r\n1,ada\r\n").unwrap();

        let rows = read_report(&path).unwrap();

        assert_eq!(rows, vec![vec!["Student ID", "Username"], vec!["1", "ada"]]);
    }

    #[test]
    fn test_read_missing_report_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_report(&dir.path().join("gone.csv")).unwrap_err();
        assert!(matches!(err, ReportError::Storage { .. }));
    }

    #[test]
    fn test_file_store_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileReportStore::new(dir.path());
        let rows = vec![
            vec!["Student ID".to_string(), "Username".to_string()],
            vec!["1".to_string(), "ada, countess".to_string()],
        ];

        let stored = store.store_rows(&course(), "grade_report", &rows, timestamp()).unwrap();

        assert_eq!(stored.rows, 2);
        let contents = fs::read_to_string(&stored.location).unwrap();
        assert_eq!(contents, "Student ID,Username\n1,\"ada, countess\"\n");
        assert_eq!(store.list_reports(&course()).unwrap(), vec![stored.location]);
    }

    #[test]
    fn test_list_reports_for_unknown_course_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileReportStore::new(dir.path());
        assert!(store.list_reports(&course()).unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_records_uploads() {
        let store = MemoryReportStore::new();
        store.store_rows(&course(), "grade_report", &[vec!["h".to_string()]], timestamp()).unwrap();
        assert_eq!(store.tables_named("grade_report").len(), 1);
        assert!(store.tables_named("grade_report_err").is_empty());
    }
}
