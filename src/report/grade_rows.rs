//! Row compiler for the course grade report.
//!
//! Grading a learner is the only step allowed to fail; a failure becomes an
//! [`ErrorRow`] and the batch carries on. Every other lookup degrades to an
//! empty cell or a sentinel.

use super::types::{BatchRows, Cell, ErrorRow, GradeCell, Row};
use crate::context::ReportContext;
use crate::schema::{GradeColumn, GradedAssignmentSchema};
use crate::services::Services;
use crate::types::{CourseGrade, Learner};
use std::collections::HashSet;

/// Fixed identity headers preceding the overall grade
pub const IDENTITY_HEADERS: [&str; 3] = ["Student ID", "Email", "Username"];

/// Header of the overall percent column
pub const GRADE_HEADER: &str = "Grade";

/// Headers after the group columns
pub const ENROLLMENT_HEADERS: [&str; 2] = ["Enrollment Track", "Verification Status"];

pub const CERTIFICATE_HEADERS: [&str; 3] = ["Certificate Eligible", "Certificate Delivered", "Certificate Type"];

/// All success headers for the course grade report
pub fn success_headers(ctx: &ReportContext<'_>) -> Vec<String> {
    let mut headers: Vec<String> = IDENTITY_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.push(GRADE_HEADER.to_string());
    headers.extend(ctx.graded_assignments().headers());
    if ctx.cohorts_enabled() {
        headers.push("Cohort Name".to_string());
    }
    headers.extend(ctx.course_experiments().iter().map(|p| format!("Experiment Group ({})", p.name)));
    if ctx.teams_enabled() {
        headers.push("Team Name".to_string());
    }
    headers.extend(ENROLLMENT_HEADERS.iter().map(|h| h.to_string()));
    headers.extend(CERTIFICATE_HEADERS.iter().map(|h| h.to_string()));
    headers
}

/// Grade one batch of learners and build their rows
pub fn rows_for_learners(ctx: &ReportContext<'_>, services: &Services<'_>, learners: &[Learner]) -> BatchRows {
    let course = ctx.course_id();
    let whitelisted = services.credentials.whitelisted_learner_ids(course);
    let mut rows = BatchRows::default();

    for graded in services.grades.grade_learners(course, learners) {
        match graded.outcome {
            Ok(grade) => rows.success.push(success_row(ctx, services, &graded.learner, &grade, &whitelisted)),
            Err(failure) => rows.errors.push(ErrorRow { learner: graded.learner, message: failure.describe() }),
        }
    }

    rows
}

fn success_row(
    ctx: &ReportContext<'_>,
    services: &Services<'_>,
    learner: &Learner,
    grade: &CourseGrade,
    whitelisted: &HashSet<u64>,
) -> Row {
    let mut row = Row::new();
    row.push(learner.id);
    row.push(learner.email.as_str());
    row.push(learner.username.as_str());
    row.push(grade.percent);
    row.extend(grade_results(ctx.graded_assignments(), grade));
    row.extend(group_names(ctx, services, learner));
    row.extend(verification_mode(ctx, services, learner));
    row.extend(certificate_cells(ctx, services, learner, grade, whitelisted));
    row
}

/// One cell per schema column, walking the same columns as the headers
pub fn grade_results(schema: &GradedAssignmentSchema, grade: &CourseGrade) -> Vec<Cell> {
    schema
        .columns()
        .map(|column| match column {
            GradeColumn::Subsection { category, location, .. } => {
                let cell = match grade.subsection_score(category, location) {
                    None => GradeCell::Unavailable,
                    Some(score) if !score.attempted() => GradeCell::NotAttempted,
                    Some(score) => GradeCell::Scored(score.fraction()),
                };
                Cell::Grade(cell)
            }
            // Averages are keyed by category name in the grader breakdown
            GradeColumn::Average { category, .. } => Cell::from(grade.category_percent(category)),
        })
        .collect()
}

/// Cohort, experiment group and team columns, as enabled for the course
fn group_names(ctx: &ReportContext<'_>, services: &Services<'_>, learner: &Learner) -> Vec<Cell> {
    let course = ctx.course_id();
    let mut cells = Vec::new();

    if ctx.cohorts_enabled() {
        let cohort = services.groups.cohort_for(learner, course);
        cells.push(Cell::Text(cohort.map(|g| g.name).unwrap_or_default()));
    }

    for partition in ctx.course_experiments() {
        let group = services.groups.experiment_group_for(learner, course, partition);
        cells.push(Cell::Text(group.map(|g| g.name).unwrap_or_default()));
    }

    if ctx.teams_enabled() {
        let team = services.groups.team_for(learner, course);
        cells.push(Cell::Text(team.map(|g| g.name).unwrap_or_default()));
    }

    cells
}

fn verification_mode(ctx: &ReportContext<'_>, services: &Services<'_>, learner: &Learner) -> [Cell; 2] {
    let mode = services.credentials.enrollment_mode(learner, ctx.course_id());
    let status = services.credentials.verification_status(learner, ctx.course_id(), &mode);
    [Cell::Text(mode), Cell::Text(status)]
}

fn certificate_cells(
    ctx: &ReportContext<'_>,
    services: &Services<'_>,
    learner: &Learner,
    grade: &CourseGrade,
    whitelisted: &HashSet<u64>,
) -> [Cell; 3] {
    let is_whitelisted = whitelisted.contains(&learner.id);
    let info =
        services.credentials.certificate_info(learner, ctx.course_id(), grade.letter_grade.as_deref(), is_whitelisted);

    ctx.logger().info(format_args!(
        "Student certificate eligibility: {} (user={}, course_id={}, grade_percent={} letter_grade={:?} gradecutoffs={:?}, is_whitelisted={})",
        yes_no(info.eligible),
        learner.username,
        ctx.course_id(),
        grade.percent,
        grade.letter_grade,
        ctx.settings().grade_cutoffs,
        is_whitelisted,
    ));

    [
        Cell::from(yes_no(info.eligible)),
        Cell::from(yes_no(info.delivered)),
        Cell::Text(info.certificate_type.unwrap_or_else(|| "N/A".to_string())),
    ]
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Y" } else { "N" }
}

#[cfg(test)]
#[path = "grade_rows_test.rs"]
mod grade_rows_test;
