//! Problem responses report: every learner's stored state for one problem.

use super::emit::ReportEmitter;
use super::types::Table;
use super::ReportOutcome;
use crate::context::{ReportRequest, TaskContext};
use crate::error::{ReportError, Result};
use crate::services::Services;
use chrono::Utc;

/// Task input key naming the problem
pub const PROBLEM_LOCATION_KEY: &str = "problem_location";

pub const RESPONSE_HEADERS: [&str; 2] = ["username", "state"];

/// Artifact name for a problem location (`:` and `/` become `_`)
pub fn responses_report_name(problem_location: &str) -> String {
    let sanitized: String = problem_location.chars().map(|c| if c == ':' || c == '/' { '_' } else { c }).collect();
    format!("student_state_from_{}", sanitized)
}

/// Dump learner responses for the problem named in the task input
pub fn generate(request: &ReportRequest, services: &Services<'_>) -> Result<ReportOutcome> {
    let timestamp = Utc::now();
    let problem_location = request
        .task_input
        .get(PROBLEM_LOCATION_KEY)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ReportError::MissingTaskInput { key: PROBLEM_LOCATION_KEY.to_string() })?;

    let mut ctx = TaskContext::new(request, services, Some(1));
    ctx.update_status("Calculating students answers to problem");

    let responses = services.responses.problem_responses(ctx.course_id(), problem_location)?;
    let mut table = Table::new(RESPONSE_HEADERS.iter().map(|h| h.to_string()).collect());
    table.rows = responses.into_iter().map(|r| vec![r.username, r.state]).collect();

    let count = table.rows.len() as u64;
    let progress = ctx.progress_mut();
    progress.record_batch(count, 0);
    let skipped = progress.total().unwrap_or(0).saturating_sub(progress.attempted());
    progress.record_skipped(skipped);

    ctx.update_status("Uploading CSV");
    let stored = ReportEmitter::new(services.store, ctx.course_id(), timestamp)
        .upload(&responses_report_name(problem_location), table)?;

    let status = ctx.update_status("Uploading CSV");
    Ok(ReportOutcome { status, stored: vec![stored] })
}
