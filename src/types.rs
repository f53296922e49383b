/// Core data structures for grade reports
///
/// This module defines the course, learner and grade structures that flow
/// between the collaborator services and the report pipeline.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a course run, e.g. "course-v1:edX+DemoX+2024"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseKey(pub String);

impl CourseKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Usage key of a block in the course tree (subsection or scorable problem)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(pub String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An enrolled learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Learner {
    pub id: u64,
    pub username: String,
    pub email: String,
}

/// A named group: cohort, experiment group or team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
}

/// A split-test (experiment) partition of the course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentPartition {
    pub id: u64,
    pub name: String,
}

/// Course-level settings that shape the report columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CourseSettings {
    #[serde(default)]
    pub cohorts_enabled: bool,
    #[serde(default)]
    pub teams_enabled: bool,
    #[serde(default)]
    pub experiment_partitions: Vec<ExperimentPartition>,
    /// Letter grade -> minimum percent
    #[serde(default)]
    pub grade_cutoffs: BTreeMap<String, f64>,
}

/// A problem (or other scorable leaf) inside a graded subsection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorableBlock {
    pub location: BlockKey,
    pub display_name: String,
}

/// A graded subsection with its scorable descendants, in course order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionInfo {
    pub location: BlockKey,
    pub display_name: String,
    #[serde(default)]
    pub scored_descendants: Vec<ScorableBlock>,
}

/// An assignment type ("Homework", "Exam") and its graded subsections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentCategory {
    pub name: String,
    #[serde(default)]
    pub subsections: Vec<SubsectionInfo>,
}

/// Graded structure of a course: categories in grading-policy order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradingContext {
    pub categories: Vec<AssignmentCategory>,
}

/// Earned/possible points with the time of the first attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub earned: f64,
    pub possible: f64,
    #[serde(default)]
    pub first_attempted: Option<DateTime<Utc>>,
}

impl Score {
    pub fn attempted(&self) -> bool {
        self.first_attempted.is_some()
    }

    /// Earned fraction of the possible points (0 when nothing is possible)
    pub fn fraction(&self) -> f64 {
        if self.possible > 0.0 { self.earned / self.possible } else { 0.0 }
    }
}

/// Per-category summary from the grader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub percent: f64,
}

/// A learner's computed course grade
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CourseGrade {
    pub percent: f64,
    #[serde(default)]
    pub letter_grade: Option<String>,
    /// Category name -> subsection location -> graded total
    #[serde(default)]
    pub subsection_grades: BTreeMap<String, BTreeMap<BlockKey, Score>>,
    /// Category name -> category summary
    #[serde(default)]
    pub grade_breakdown: BTreeMap<String, CategoryBreakdown>,
    #[serde(default)]
    pub problem_scores: BTreeMap<BlockKey, Score>,
}

impl CourseGrade {
    pub fn subsection_score(&self, category: &str, location: &BlockKey) -> Option<&Score> {
        self.subsection_grades.get(category).and_then(|by_location| by_location.get(location))
    }

    pub fn category_percent(&self, category: &str) -> Option<f64> {
        self.grade_breakdown.get(category).map(|b| b.percent)
    }
}

/// Why a learner could not be graded
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GradeFailure {
    pub message: Option<String>,
}

impl GradeFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: Some(message.into()) }
    }

    /// Message for the error table
    pub fn describe(&self) -> String {
        match self.message.as_deref() {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => "Unknown error".to_string(),
        }
    }
}

/// Outcome of grading one learner
#[derive(Debug, Clone, PartialEq)]
pub struct GradedLearner {
    pub learner: Learner,
    pub outcome: Result<CourseGrade, GradeFailure>,
}

/// Certificate status: (eligible, delivered, type)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CertificateInfo {
    pub eligible: bool,
    pub delivered: bool,
    pub certificate_type: Option<String>,
}

/// A learner's stored state for one problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemResponse {
    pub username: String,
    pub state: String,
}
