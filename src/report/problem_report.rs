//! Problem grade report: earned and possible points per scorable block.

use super::aggregate::Aggregator;
use super::emit::{ReportArtifact, ReportEmitter};
use super::problem_rows;
use super::types::ErrorLayout;
use super::ReportOutcome;
use crate::batch::batches;
use crate::config::ReportSettings;
use crate::context::{ReportContext, ReportRequest, ReportStage};
use crate::error::Result;
use crate::services::Services;
use chrono::Utc;

/// Artifact name of the problem grade report
pub const PROBLEM_GRADE_REPORT: &str = "problem_grade_report";

const SUBJECT: &str = "problem grades";

/// Generate the problem grade report and upload it
pub fn generate(request: &ReportRequest, services: &Services<'_>, settings: &ReportSettings) -> Result<ReportOutcome> {
    let timestamp = Utc::now();
    let total = services.enrollments.enrolled_count(&request.course_id)?;
    let mut ctx = ReportContext::resolve(request, services, Some(total))?;

    ctx.update_status(&ReportStage::Starting.message(SUBJECT));
    let compiling = ReportStage::Compiling.message(SUBJECT);
    ctx.update_status(&compiling);

    let learners = services.enrollments.enrolled_learners(ctx.course_id())?;
    let mut aggregator = Aggregator::new(settings.status_interval);
    for batch in batches(learners, settings.batch_size) {
        let rows = problem_rows::rows_for_learners(ctx.course_id(), ctx.problem_schema(), services, &batch);
        aggregator.absorb(&mut ctx, rows, &compiling);
    }
    let rows = aggregator.finish(&mut ctx);

    ctx.update_status(&ReportStage::Uploading.message(SUBJECT));
    let artifact = ReportArtifact {
        name: PROBLEM_GRADE_REPORT.to_string(),
        success_headers: problem_rows::success_headers(ctx.problem_schema()),
        error_layout: ErrorLayout::IdEmailUsername,
        skip_empty_success: true,
    };
    let stored = ReportEmitter::new(services.store, ctx.course_id(), timestamp).emit(&artifact, rows)?;

    let status = ctx.update_status(&ReportStage::Completed.message(SUBJECT));
    Ok(ReportOutcome { status, stored })
}
