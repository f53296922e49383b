//! Shared fixtures for unit tests.

use crate::snapshot::{CourseSnapshot, LearnerRecord};
use crate::types::*;
use chrono::{TimeZone, Utc};
use log::{Level, Log, Metadata, Record};
use std::collections::BTreeMap;
use std::sync::Mutex;

pub const COURSE_ID: &str = "course-v1:edX+DemoX+2024";

/// Logger that keeps formatted messages in memory
#[derive(Default)]
pub struct CapturingLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl CapturingLogger {
    pub fn lines(&self) -> Vec<String> {
        self.records().into_iter().map(|(_, line)| line).collect()
    }

    /// Messages logged at exactly `level`
    pub fn lines_at(&self, level: Level) -> Vec<String> {
        self.records().into_iter().filter(|(l, _)| *l == level).map(|(_, line)| line).collect()
    }

    fn records(&self) -> Vec<(Level, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((record.level(), format!("{}", record.args())));
        }
    }

    fn flush(&self) {}
}

pub fn course() -> CourseKey {
    CourseKey::new(COURSE_ID)
}

pub fn attempted(earned: f64, possible: f64) -> Score {
    Score { earned, possible, first_attempted: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()) }
}

pub fn unattempted(possible: f64) -> Score {
    Score { earned: 0.0, possible, first_attempted: None }
}

fn subsection(location: &str, name: &str, problems: &[(&str, &str)]) -> SubsectionInfo {
    SubsectionInfo {
        location: BlockKey::new(location),
        display_name: name.to_string(),
        scored_descendants: problems
            .iter()
            .map(|(loc, name)| ScorableBlock { location: BlockKey::new(*loc), display_name: name.to_string() })
            .collect(),
    }
}

/// Homework with three subsections, one single-subsection exam
pub fn demo_grading() -> GradingContext {
    GradingContext {
        categories: vec![
            AssignmentCategory {
                name: "Homework".to_string(),
                subsections: vec![
                    subsection("hw1", "H1", &[("p1", "Q1")]),
                    subsection("hw2", "H2", &[("p2", "Q2")]),
                    subsection("hw3", "H3", &[]),
                ],
            },
            AssignmentCategory { name: "Exam".to_string(), subsections: vec![subsection("final", "Final", &[("p3", "Q3")])] },
        ],
    }
}

/// A fully graded learner for `demo_grading`
pub fn demo_grade(percent: f64) -> CourseGrade {
    let mut homework = BTreeMap::new();
    homework.insert(BlockKey::new("hw1"), attempted(1.0, 2.0));
    homework.insert(BlockKey::new("hw2"), unattempted(2.0));
    let mut exam = BTreeMap::new();
    exam.insert(BlockKey::new("final"), attempted(3.0, 4.0));

    let mut subsection_grades = BTreeMap::new();
    subsection_grades.insert("Homework".to_string(), homework);
    subsection_grades.insert("Exam".to_string(), exam);

    let mut grade_breakdown = BTreeMap::new();
    grade_breakdown.insert("Homework".to_string(), CategoryBreakdown { percent: 0.25 });

    let mut problem_scores = BTreeMap::new();
    problem_scores.insert(BlockKey::new("p1"), attempted(1.0, 2.0));
    problem_scores.insert(BlockKey::new("p2"), unattempted(2.0));

    CourseGrade {
        percent,
        letter_grade: Some("Pass".to_string()),
        subsection_grades,
        grade_breakdown,
        problem_scores,
    }
}

/// Course with `count` learners; learner ids listed in `failing` fail grading
pub fn demo_snapshot(count: u64, failing: &[u64]) -> CourseSnapshot {
    let mut snapshot = CourseSnapshot::new(course());
    snapshot.grading = demo_grading();
    for id in 1..=count {
        let record = LearnerRecord::new(id, format!("learner{}", id), format!("learner{}@example.com", id));
        let record = if failing.contains(&id) {
            record.with_grading_error(format!("grading failed for learner{}", id))
        } else {
            record.with_grade(demo_grade(0.5))
        };
        snapshot.learners.push(record);
    }
    snapshot
}
