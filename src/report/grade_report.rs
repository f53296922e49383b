//! Course grade report: one row per enrolled learner.

use super::aggregate::Aggregator;
use super::emit::{ReportArtifact, ReportEmitter};
use super::grade_rows;
use super::types::ErrorLayout;
use super::ReportOutcome;
use crate::batch::batches;
use crate::config::ReportSettings;
use crate::context::{ReportContext, ReportRequest, ReportStage};
use crate::error::Result;
use crate::services::Services;
use chrono::Utc;

/// Artifact name of the course grade report
pub const GRADE_REPORT: &str = "grade_report";

const SUBJECT: &str = "grades";

/// Generate the course grade report and upload it.
///
/// The enrolled population is not counted up front; the final total is the
/// number of learners attempted.
pub fn generate(request: &ReportRequest, services: &Services<'_>, settings: &ReportSettings) -> Result<ReportOutcome> {
    let timestamp = Utc::now();
    let mut ctx = ReportContext::resolve(request, services, None)?;

    ctx.update_status(&ReportStage::Starting.message(SUBJECT));
    let compiling = ReportStage::Compiling.message(SUBJECT);
    ctx.update_status(&compiling);

    let learners = services.enrollments.enrolled_learners(ctx.course_id())?;
    let mut aggregator = Aggregator::new(settings.status_interval);
    for batch in batches(learners, settings.batch_size) {
        let rows = grade_rows::rows_for_learners(&ctx, services, &batch);
        aggregator.absorb(&mut ctx, rows, &compiling);
    }
    let rows = aggregator.finish(&mut ctx);

    ctx.update_status(&ReportStage::Uploading.message(SUBJECT));
    let artifact = ReportArtifact {
        name: GRADE_REPORT.to_string(),
        success_headers: grade_rows::success_headers(&ctx),
        error_layout: ErrorLayout::IdUsername,
        skip_empty_success: false,
    };
    let stored = ReportEmitter::new(services.store, ctx.course_id(), timestamp).emit(&artifact, rows)?;

    let status = ctx.update_status(&ReportStage::Completed.message(SUBJECT));
    Ok(ReportOutcome { status, stored })
}

#[cfg(test)]
#[path = "grade_report_test.rs"]
mod grade_report_test;
