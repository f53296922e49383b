//! Course grade report generation.
//!
//! A report run resolves the course configuration once into a
//! [`context::ReportContext`], walks the enrolled learners in fixed-size
//! batches, compiles one row per learner (grading failures become error rows),
//! and uploads a success table plus, when needed, an error table to a
//! [`services::ReportStore`].
//!
//! All external data comes in through the traits in [`services`];
//! [`snapshot::CourseSnapshot`] implements them from a JSON export so the
//! pipeline runs end to end from the `gradebook-reports` binary.

pub mod batch;
pub mod cli;
pub mod config;
pub mod console_format;
pub mod context;
pub mod error;
pub mod progress;
pub mod report;
pub mod schema;
pub mod services;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use config::ReportSettings;
pub use context::{ReportContext, ReportRequest, TaskContext, TaskInfo};
pub use error::{ReportError, Result};
pub use report::{ReportKind, ReportOutcome, run};
pub use services::Services;
