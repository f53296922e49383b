//! Report generation module - row compilation, aggregation and upload.
//!
//! # Module Organization
//!
//! - `types` - Cells, rows, error rows and tables
//! - `grade_rows` / `problem_rows` - Per-learner row compilers
//! - `aggregate` - Merges batch results and keeps progress counters
//! - `emit` - Builds tables and hands them to the report store
//! - `grade_report`, `problem_report`, `responses_report` - Report drivers

mod aggregate;
mod emit;
pub mod grade_report;
mod grade_rows;
pub mod problem_report;
mod problem_rows;
pub mod responses_report;
mod types;

pub use aggregate::{Aggregator, CompiledRows, DEFAULT_STATUS_INTERVAL};
pub use emit::{ERROR_SUFFIX, ReportArtifact, ReportEmitter};
pub use grade_report::GRADE_REPORT;
pub use grade_rows::{grade_results, success_headers as grade_report_headers};
pub use problem_report::PROBLEM_GRADE_REPORT;
pub use problem_rows::{problem_results, success_headers as problem_report_headers};
pub use responses_report::responses_report_name;
pub use types::{BatchRows, Cell, ErrorLayout, ErrorRow, GradeCell, Row, Table, format_number};

use crate::config::ReportSettings;
use crate::context::ReportRequest;
use crate::error::Result;
use crate::progress::ProgressSnapshot;
use crate::services::{Services, StoredReport};
use clap::ValueEnum;
use serde::Serialize;

/// The reports this crate can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Course grade report, one column per graded subsection
    Grades,
    /// Earned/possible points per scorable problem
    ProblemGrades,
    /// Stored learner state for a single problem
    ProblemResponses,
}

impl ReportKind {
    /// Action label recorded in progress snapshots
    pub fn action_name(&self) -> &'static str {
        match self {
            ReportKind::Grades | ReportKind::ProblemGrades => "graded",
            ReportKind::ProblemResponses => "generated",
        }
    }
}

/// Terminal status of a run plus the uploads it made
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutcome {
    pub status: ProgressSnapshot,
    pub stored: Vec<StoredReport>,
}

/// Run one report to completion
pub fn run(
    kind: ReportKind,
    request: &ReportRequest,
    services: &Services<'_>,
    settings: &ReportSettings,
) -> Result<ReportOutcome> {
    match kind {
        ReportKind::Grades => grade_report::generate(request, services, settings),
        ReportKind::ProblemGrades => problem_report::generate(request, services, settings),
        ReportKind::ProblemResponses => responses_report::generate(request, services),
    }
}
