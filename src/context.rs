//! Per-run report context.
//!
//! The context is resolved once at the start of a run: course settings, the
//! grading structure and the derived column schemas are all computed here and
//! then shared read-only by every batch. The only mutable part is the progress
//! counter, which changes through [`ReportContext::progress_mut`] and is
//! published through [`ReportContext::update_status`].

use crate::error::Result;
use crate::progress::{ProgressSnapshot, TaskProgress, step_meta};
use crate::schema::{GradedAssignmentSchema, ProblemSchema};
use crate::services::{Services, StatusSink};
use crate::types::{CourseKey, CourseSettings, ExperimentPartition, GradingContext};
use log::{Level, Log, Record};
use serde_json::Value;
use std::fmt;

/// Log target for run-scoped messages
pub const TASK_LOG_TARGET: &str = "gradebook_reports::task";

/// Logger scoped to one run, writing through an injected `log::Log`
#[derive(Clone, Copy)]
pub struct RunLogger<'a> {
    sink: &'a dyn Log,
}

impl<'a> RunLogger<'a> {
    pub fn new(sink: &'a dyn Log) -> Self {
        Self { sink }
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let record = Record::builder().args(args).level(level).target(TASK_LOG_TARGET).build();
        if self.sink.enabled(record.metadata()) {
            self.sink.log(&record);
        }
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }
}

/// Identity of the job that asked for the report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskInfo {
    pub task_id: Option<String>,
    pub entry_id: u64,
}

/// Everything a caller supplies to start a report run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub task: TaskInfo,
    pub course_id: CourseKey,
    pub action_name: String,
    pub task_input: Value,
}

impl ReportRequest {
    pub fn new(course_id: CourseKey, action_name: impl Into<String>) -> Self {
        Self { task: TaskInfo::default(), course_id, action_name: action_name.into(), task_input: Value::Null }
    }

    pub fn with_task(mut self, task: TaskInfo) -> Self {
        self.task = task;
        self
    }

    pub fn with_input(mut self, task_input: Value) -> Self {
        self.task_input = task_input;
        self
    }

    /// "Task: .., InstructorTask ID: .., Course: .., Input: .." prefix for log lines
    pub fn task_info_string(&self) -> String {
        format!(
            "Task: {}, InstructorTask ID: {}, Course: {}, Input: {}",
            self.task.task_id.as_deref().unwrap_or("None"),
            self.task.entry_id,
            self.course_id,
            self.task_input
        )
    }
}

/// Stages of a report run, announced in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    Starting,
    Compiling,
    Uploading,
    Completed,
}

impl ReportStage {
    pub fn verb(&self) -> &'static str {
        match self {
            ReportStage::Starting => "Starting",
            ReportStage::Compiling => "Compiling",
            ReportStage::Uploading => "Uploading",
            ReportStage::Completed => "Completed",
        }
    }

    /// Status message for this stage, e.g. "Compiling grades"
    pub fn message(&self, subject: &str) -> String {
        format!("{} {}", self.verb(), subject)
    }
}

/// Identity, progress and status publishing for one run.
///
/// Reports that never read course configuration work with this alone.
pub struct TaskContext<'a> {
    task_info: String,
    action_name: String,
    course_id: CourseKey,
    progress: TaskProgress,
    status: &'a dyn StatusSink,
    logger: RunLogger<'a>,
}

impl<'a> TaskContext<'a> {
    pub fn new(request: &ReportRequest, services: &Services<'a>, total: Option<u64>) -> Self {
        Self {
            task_info: request.task_info_string(),
            action_name: request.action_name.clone(),
            course_id: request.course_id.clone(),
            progress: TaskProgress::new(request.action_name.clone(), total),
            status: services.status,
            logger: RunLogger::new(services.logger),
        }
    }

    pub fn course_id(&self) -> &CourseKey {
        &self.course_id
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn progress(&self) -> &TaskProgress {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut TaskProgress {
        &mut self.progress
    }

    pub fn logger(&self) -> RunLogger<'a> {
        self.logger
    }

    /// Publish a state transition and log it with the run identity
    pub fn update_status(&self, message: &str) -> ProgressSnapshot {
        self.logger.info(format_args!("{}, Task type: {}, {}", self.task_info, self.action_name, message));
        self.progress.update_task_state(self.status, step_meta(message))
    }
}

/// Shared, read-only configuration of one report run
pub struct ReportContext<'a> {
    task: TaskContext<'a>,
    settings: CourseSettings,
    grading: GradingContext,
    graded_assignments: GradedAssignmentSchema,
    problems: ProblemSchema,
}

impl<'a> ReportContext<'a> {
    /// Load and derive all course configuration for the run.
    ///
    /// Fails when the course or its grading structure cannot be read.
    pub fn resolve(request: &ReportRequest, services: &Services<'a>, total: Option<u64>) -> Result<Self> {
        let settings = services.catalog.course_settings(&request.course_id)?;
        let grading = services.catalog.grading_context(&request.course_id)?;
        let graded_assignments = GradedAssignmentSchema::derive(&grading);
        let problems = ProblemSchema::derive(&grading);

        Ok(Self { task: TaskContext::new(request, services, total), settings, grading, graded_assignments, problems })
    }

    pub fn task(&self) -> &TaskContext<'a> {
        &self.task
    }

    pub fn course_id(&self) -> &CourseKey {
        self.task.course_id()
    }

    pub fn action_name(&self) -> &str {
        self.task.action_name()
    }

    pub fn settings(&self) -> &CourseSettings {
        &self.settings
    }

    pub fn cohorts_enabled(&self) -> bool {
        self.settings.cohorts_enabled
    }

    pub fn teams_enabled(&self) -> bool {
        self.settings.teams_enabled
    }

    pub fn course_experiments(&self) -> &[ExperimentPartition] {
        &self.settings.experiment_partitions
    }

    pub fn grading(&self) -> &GradingContext {
        &self.grading
    }

    pub fn graded_assignments(&self) -> &GradedAssignmentSchema {
        &self.graded_assignments
    }

    /// Per-problem columns of the problem grade report
    pub fn problem_schema(&self) -> &ProblemSchema {
        &self.problems
    }

    pub fn progress(&self) -> &TaskProgress {
        self.task.progress()
    }

    pub fn progress_mut(&mut self) -> &mut TaskProgress {
        self.task.progress_mut()
    }

    pub fn logger(&self) -> RunLogger<'a> {
        self.task.logger()
    }

    pub fn update_status(&self, message: &str) -> ProgressSnapshot {
        self.task.update_status(message)
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;
