//! Error types for report generation.
//!
//! Only failures that must terminate a run live here. A learner who cannot be
//! graded is not an error; it becomes a row in the error table.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal report generation errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Course not found: {course_id}")]
    CourseNotFound { course_id: String },

    #[error("Failed to load course configuration for {course_id}: {message}")]
    CourseConfiguration { course_id: String, message: String },

    #[error("Failed to enumerate enrolled learners for {course_id}: {message}")]
    Enrollment { course_id: String, message: String },

    #[error("Task input is missing required key '{key}'")]
    MissingTaskInput { key: String },

    #[error("Failed to store report {name}: {source}")]
    Storage {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load course snapshot {}: {message}", path.display())]
    Snapshot { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ReportError {
    pub fn storage(name: impl Into<String>, source: std::io::Error) -> Self {
        ReportError::Storage { name: name.into(), source }
    }

    /// Whether the run failed before any course data was read
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ReportError::CourseNotFound { .. } | ReportError::CourseConfiguration { .. } | ReportError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
