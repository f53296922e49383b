//! Row compiler for the problem grade report.

use super::types::{BatchRows, Cell, ErrorRow, GradeCell, Row};
use crate::schema::ProblemSchema;
use crate::services::Services;
use crate::types::{CourseGrade, CourseKey, Learner};

/// Headers preceding the per-problem pairs
pub const PROBLEM_IDENTITY_HEADERS: [&str; 4] = ["Student ID", "Email", "Username", "Grade"];

pub fn success_headers(schema: &ProblemSchema) -> Vec<String> {
    let mut headers: Vec<String> = PROBLEM_IDENTITY_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.extend(schema.headers());
    headers
}

/// Grade one batch and build the per-problem rows
pub fn rows_for_learners(
    course: &CourseKey,
    schema: &ProblemSchema,
    services: &Services<'_>,
    learners: &[Learner],
) -> BatchRows {
    let mut rows = BatchRows::default();

    for graded in services.grades.grade_learners(course, learners) {
        match graded.outcome {
            Ok(grade) => {
                let mut row = Row::new();
                row.push(graded.learner.id);
                row.push(graded.learner.email.as_str());
                row.push(graded.learner.username.as_str());
                row.push(grade.percent);
                row.extend(problem_results(schema, &grade));
                rows.success.push(row);
            }
            Err(failure) => rows.errors.push(ErrorRow { learner: graded.learner, message: failure.describe() }),
        }
    }

    rows
}

/// Earned and possible cells for every block, in schema order
pub fn problem_results(schema: &ProblemSchema, grade: &CourseGrade) -> Vec<Cell> {
    schema
        .blocks()
        .iter()
        .flat_map(|block| match grade.problem_scores.get(&block.location) {
            None => [Cell::Grade(GradeCell::Unavailable), Cell::Grade(GradeCell::Unavailable)],
            Some(score) if !score.attempted() => [Cell::Grade(GradeCell::NotAttempted), Cell::Number(score.possible)],
            Some(score) => [Cell::Grade(GradeCell::Scored(score.earned)), Cell::Number(score.possible)],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_problem_results_cover_every_block() {
        let schema = ProblemSchema::derive(&demo_grading());
        let cells: Vec<String> = problem_results(&schema, &demo_grade(0.5)).iter().map(Cell::render).collect();

        assert_eq!(cells.len(), schema.column_count());
        assert_eq!(cells, vec!["1.0", "2.0", "Not Attempted", "2.0", "Not Available", "Not Available"]);
    }

    #[test]
    fn test_headers_align_with_rows() {
        let snapshot = demo_snapshot(2, &[2]);
        let store = crate::store::MemoryReportStore::new();
        let status = crate::progress::MemoryStatusSink::new();
        let logger = CapturingLogger::default();
        let services = snapshot.services(&store, &status, &logger);
        let schema = ProblemSchema::derive(&demo_grading());
        let learners: Vec<Learner> = snapshot.learners.iter().map(|r| r.learner.clone()).collect();

        let rows = rows_for_learners(&course(), &schema, &services, &learners);

        assert_eq!(rows.success.len(), 1);
        assert_eq!(rows.errors.len(), 1);
        assert_eq!(rows.success[0].len(), success_headers(&schema).len());
        assert_eq!(rows.errors[0].message, "grading failed for learner2");
    }
}
