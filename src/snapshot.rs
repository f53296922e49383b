//! Course snapshot: a file-backed implementation of the collaborator traits.
//!
//! A snapshot is a JSON export of one course (settings, graded structure,
//! learners with their computed grades and memberships). It lets the report
//! pipeline run end to end without the services that normally sit behind the
//! traits in [`crate::services`].

use crate::error::{ReportError, Result};
use crate::services::*;
use crate::types::*;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Enrollment modes that require identity verification
const VERIFIED_MODES: &[&str] = &["verified", "professional", "no-id-professional", "credit", "masters"];

/// A generated certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub status: String,
    pub mode: String,
}

/// One learner as exported in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerRecord {
    #[serde(flatten)]
    pub learner: Learner,
    #[serde(default)]
    pub cohort: Option<String>,
    /// Partition id (as written in JSON object keys) -> group name
    #[serde(default)]
    pub experiment_groups: BTreeMap<String, String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default = "default_enrollment_mode")]
    pub enrollment_mode: String,
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default = "default_allow_certificate")]
    pub allow_certificate: bool,
    #[serde(default)]
    pub certificate: Option<CertificateRecord>,
    #[serde(default)]
    pub grade: Option<CourseGrade>,
    #[serde(default)]
    pub grading_error: Option<String>,
}

fn default_enrollment_mode() -> String {
    "audit".to_string()
}

fn default_allow_certificate() -> bool {
    true
}

impl LearnerRecord {
    pub fn new(id: u64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            learner: Learner { id, username: username.into(), email: email.into() },
            cohort: None,
            experiment_groups: BTreeMap::new(),
            team: None,
            enrollment_mode: default_enrollment_mode(),
            verification_status: None,
            allow_certificate: true,
            certificate: None,
            grade: None,
            grading_error: None,
        }
    }

    pub fn with_grade(mut self, grade: CourseGrade) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn with_grading_error(mut self, message: impl Into<String>) -> Self {
        self.grading_error = Some(message.into());
        self
    }
}

/// Exported state of one course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSnapshot {
    pub course_id: CourseKey,
    #[serde(default)]
    pub settings: CourseSettings,
    #[serde(default)]
    pub grading: GradingContext,
    #[serde(default)]
    pub learners: Vec<LearnerRecord>,
    #[serde(default)]
    pub certificate_whitelist: Vec<u64>,
    /// Problem location -> stored learner states
    #[serde(default)]
    pub problem_responses: BTreeMap<String, Vec<ProblemResponse>>,
    /// Learner id -> position in `learners`, built on first lookup
    #[serde(skip)]
    learner_index: OnceLock<HashMap<u64, usize>>,
}

impl CourseSnapshot {
    pub fn new(course_id: CourseKey) -> Self {
        Self {
            course_id,
            settings: CourseSettings::default(),
            grading: GradingContext::default(),
            learners: Vec::new(),
            certificate_whitelist: Vec::new(),
            problem_responses: BTreeMap::new(),
            learner_index: OnceLock::new(),
        }
    }

    /// Read a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ReportError::Snapshot { path: path.to_path_buf(), message: e.to_string() })?;
        let snapshot: CourseSnapshot = serde_json::from_str(&contents)
            .map_err(|e| ReportError::Snapshot { path: path.to_path_buf(), message: e.to_string() })?;
        debug!("Loaded snapshot for {} with {} learners", snapshot.course_id, snapshot.learners.len());
        Ok(snapshot)
    }

    /// Bundle this snapshot with the given sinks into a full service set
    pub fn services<'a>(
        &'a self,
        store: &'a dyn ReportStore,
        status: &'a dyn StatusSink,
        logger: &'a dyn log::Log,
    ) -> Services<'a> {
        Services {
            catalog: self,
            enrollments: self,
            grades: self,
            groups: self,
            credentials: self,
            responses: self,
            store,
            status,
            logger,
        }
    }

    fn check_course(&self, course: &CourseKey) -> Result<()> {
        if *course == self.course_id {
            Ok(())
        } else {
            Err(ReportError::CourseNotFound { course_id: course.to_string() })
        }
    }

    fn record(&self, learner: &Learner) -> Option<&LearnerRecord> {
        let index = self.learner_index.get_or_init(|| {
            debug!("Indexing {} learner records", self.learners.len());
            self.learners.iter().enumerate().map(|(pos, r)| (r.learner.id, pos)).collect()
        });
        let indexed = index.get(&learner.id).and_then(|&pos| self.learners.get(pos)).filter(|r| r.learner.id == learner.id);

        // Records pushed after the index was built are still found
        indexed.or_else(|| self.learners.iter().find(|r| r.learner.id == learner.id))
    }
}

impl CourseCatalog for CourseSnapshot {
    fn course_settings(&self, course: &CourseKey) -> Result<CourseSettings> {
        self.check_course(course)?;
        Ok(self.settings.clone())
    }

    fn grading_context(&self, course: &CourseKey) -> Result<GradingContext> {
        self.check_course(course)?;
        Ok(self.grading.clone())
    }
}

impl EnrollmentSource for CourseSnapshot {
    fn enrolled_learners<'a>(&'a self, course: &CourseKey) -> Result<Box<dyn Iterator<Item = Learner> + 'a>> {
        self.check_course(course)?;
        Ok(Box::new(self.learners.iter().map(|r| r.learner.clone())))
    }

    fn enrolled_count(&self, course: &CourseKey) -> Result<u64> {
        self.check_course(course)?;
        Ok(self.learners.len() as u64)
    }
}

impl GradeService for CourseSnapshot {
    fn grade_learners(&self, _course: &CourseKey, learners: &[Learner]) -> Vec<GradedLearner> {
        learners
            .iter()
            .map(|learner| {
                let outcome = match self.record(learner) {
                    Some(LearnerRecord { grading_error: Some(message), .. }) => Err(GradeFailure::new(message.clone())),
                    Some(LearnerRecord { grade: Some(grade), .. }) => Ok(grade.clone()),
                    Some(_) => Err(GradeFailure::default()),
                    None => Err(GradeFailure::new(format!("No enrollment record for learner {}", learner.id))),
                };
                GradedLearner { learner: learner.clone(), outcome }
            })
            .collect()
    }
}

impl GroupLookup for CourseSnapshot {
    fn cohort_for(&self, learner: &Learner, _course: &CourseKey) -> Option<Group> {
        self.record(learner)?.cohort.clone().map(|name| Group { name })
    }

    fn experiment_group_for(
        &self,
        learner: &Learner,
        _course: &CourseKey,
        partition: &ExperimentPartition,
    ) -> Option<Group> {
        self.record(learner)?.experiment_groups.get(&partition.id.to_string()).cloned().map(|name| Group { name })
    }

    fn team_for(&self, learner: &Learner, _course: &CourseKey) -> Option<Group> {
        self.record(learner)?.team.clone().map(|name| Group { name })
    }
}

impl CredentialService for CourseSnapshot {
    fn enrollment_mode(&self, learner: &Learner, _course: &CourseKey) -> String {
        self.record(learner).map(|r| r.enrollment_mode.clone()).unwrap_or_else(default_enrollment_mode)
    }

    fn verification_status(&self, learner: &Learner, _course: &CourseKey, enrollment_mode: &str) -> String {
        if let Some(status) = self.record(learner).and_then(|r| r.verification_status.clone()) {
            return status;
        }
        if VERIFIED_MODES.contains(&enrollment_mode) { "Not ID Verified".to_string() } else { "N/A".to_string() }
    }

    fn certificate_info(
        &self,
        learner: &Learner,
        _course: &CourseKey,
        letter_grade: Option<&str>,
        whitelisted: bool,
    ) -> CertificateInfo {
        let Some(record) = self.record(learner) else {
            return CertificateInfo::default();
        };

        let passing = letter_grade.is_some_and(|g| !g.is_empty());
        let eligible = whitelisted || (record.allow_certificate && passing);
        let delivered_cert = record.certificate.as_ref().filter(|c| c.status == "downloadable");

        CertificateInfo {
            eligible,
            delivered: delivered_cert.is_some(),
            certificate_type: delivered_cert.map(|c| c.mode.clone()),
        }
    }

    fn whitelisted_learner_ids(&self, _course: &CourseKey) -> HashSet<u64> {
        self.certificate_whitelist.iter().copied().collect()
    }
}

impl ResponseSource for CourseSnapshot {
    fn problem_responses(&self, course: &CourseKey, problem_location: &str) -> Result<Vec<ProblemResponse>> {
        self.check_course(course)?;
        Ok(self.problem_responses.get(problem_location).cloned().unwrap_or_default())
    }
}
