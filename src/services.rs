//! Collaborator interfaces used by the report pipeline.
//!
//! Everything the pipeline reads or writes outside its own memory goes through
//! one of these traits. [`crate::snapshot::CourseSnapshot`] implements the read
//! side from a file; [`crate::store`] and [`crate::progress`] provide sinks.

use crate::error::Result;
use crate::progress::ProgressSnapshot;
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Course structure and settings
pub trait CourseCatalog {
    fn course_settings(&self, course: &CourseKey) -> Result<CourseSettings>;
    fn grading_context(&self, course: &CourseKey) -> Result<GradingContext>;
}

/// The enrolled population of a course
pub trait EnrollmentSource {
    /// Learners in no particular order, pulled lazily
    fn enrolled_learners<'a>(&'a self, course: &CourseKey) -> Result<Box<dyn Iterator<Item = Learner> + 'a>>;
    fn enrolled_count(&self, course: &CourseKey) -> Result<u64>;
}

/// Grade computation for a batch of learners
pub trait GradeService {
    /// One outcome per learner, in input order
    fn grade_learners(&self, course: &CourseKey, learners: &[Learner]) -> Vec<GradedLearner>;
}

/// Cohort, experiment and team membership lookups
pub trait GroupLookup {
    fn cohort_for(&self, learner: &Learner, course: &CourseKey) -> Option<Group>;
    fn experiment_group_for(
        &self,
        learner: &Learner,
        course: &CourseKey,
        partition: &ExperimentPartition,
    ) -> Option<Group>;
    fn team_for(&self, learner: &Learner, course: &CourseKey) -> Option<Group>;
}

/// Enrollment track, identity verification and certificates
pub trait CredentialService {
    fn enrollment_mode(&self, learner: &Learner, course: &CourseKey) -> String;
    fn verification_status(&self, learner: &Learner, course: &CourseKey, enrollment_mode: &str) -> String;
    fn certificate_info(
        &self,
        learner: &Learner,
        course: &CourseKey,
        letter_grade: Option<&str>,
        whitelisted: bool,
    ) -> CertificateInfo;
    /// Learners exempted from the normal certificate rules
    fn whitelisted_learner_ids(&self, course: &CourseKey) -> HashSet<u64>;
}

/// Learner answers stored for a problem
pub trait ResponseSource {
    fn problem_responses(&self, course: &CourseKey, problem_location: &str) -> Result<Vec<ProblemResponse>>;
}

/// Durable destination for report tables
pub trait ReportStore {
    /// Store `rows` (first row is the header) and return where they went
    fn store_rows(
        &self,
        course: &CourseKey,
        name: &str,
        rows: &[Vec<String>],
        timestamp: DateTime<Utc>,
    ) -> Result<StoredReport>;
}

/// Receiver of progress updates for external observers
pub trait StatusSink {
    fn update(&self, snapshot: &ProgressSnapshot);
}

/// Location and size of an uploaded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredReport {
    pub name: String,
    pub location: PathBuf,
    pub rows: usize,
}

/// All collaborators of one run, plus the run's logger
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub catalog: &'a dyn CourseCatalog,
    pub enrollments: &'a dyn EnrollmentSource,
    pub grades: &'a dyn GradeService,
    pub groups: &'a dyn GroupLookup,
    pub credentials: &'a dyn CredentialService,
    pub responses: &'a dyn ResponseSource,
    pub store: &'a dyn ReportStore,
    pub status: &'a dyn StatusSink,
    pub logger: &'a dyn log::Log,
}
