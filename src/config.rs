/// Configuration resolution module
///
/// This module handles:
/// - Loading the optional TOML settings file
/// - Layering CLI flags, environment and file values over the defaults
/// - Building the report request from CLI arguments
use crate::batch::DEFAULT_BATCH_SIZE;
use crate::cli::CliArgs;
use crate::context::{ReportRequest, TaskInfo};
use crate::error::{ReportError, Result};
use crate::report::DEFAULT_STATUS_INTERVAL;
use crate::types::CourseKey;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file picked up from the working directory
pub const SETTINGS_FILE_NAME: &str = "gradebook-reports.toml";

/// Environment variable overriding the report directory
pub const REPORT_DIR_ENV: &str = "GRADEBOOK_REPORT_DIR";

/// Default report directory
/// Uses platform-specific data directories:
/// - Linux: ~/.local/share/gradebook-reports/reports
/// - macOS: ~/Library/Application Support/gradebook-reports/reports
/// - Windows: %APPDATA%/gradebook-reports/reports
pub fn default_report_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("gradebook-reports"))
        .unwrap_or_else(|| PathBuf::from(".gradebook-reports"))
        .join("reports")
}

/// Tunables of a report run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub batch_size: usize,
    pub status_interval: u64,
    pub report_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { batch_size: DEFAULT_BATCH_SIZE, status_interval: DEFAULT_STATUS_INTERVAL, report_dir: default_report_dir() }
    }
}

impl ReportSettings {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ReportError::Config("batch_size must be greater than 0".to_string()));
        }
        if self.status_interval == 0 {
            return Err(ReportError::Config("status_interval must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Contents of a settings file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub batch_size: Option<usize>,
    pub status_interval: Option<u64>,
    pub report_dir: Option<PathBuf>,
}

/// Parse a settings file
pub fn load_settings_file(path: &Path) -> Result<SettingsFile> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ReportError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&contents).map_err(|e| ReportError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Find the settings file: `--config` if given, else `<cwd>/gradebook-reports.toml` when present
fn locate_settings_file(args: &CliArgs, cwd: &Path) -> Option<PathBuf> {
    if let Some(ref path) = args.config {
        return Some(path.clone());
    }
    let local = cwd.join(SETTINGS_FILE_NAME);
    local.is_file().then_some(local)
}

/// Resolve run settings.
///
/// Precedence: CLI flag > `GRADEBOOK_REPORT_DIR` (report dir only) > settings file > defaults.
/// `env_report_dir` is the environment value, passed in by the caller.
pub fn resolve_settings(args: &CliArgs, env_report_dir: Option<PathBuf>, cwd: &Path) -> Result<ReportSettings> {
    let file = match locate_settings_file(args, cwd) {
        Some(path) => {
            debug!("Loading settings from {:?}", path);
            load_settings_file(&path)?
        }
        None => SettingsFile::default(),
    };
    let defaults = ReportSettings::default();

    let settings = ReportSettings {
        batch_size: args.batch_size.or(file.batch_size).unwrap_or(defaults.batch_size),
        status_interval: args.status_interval.or(file.status_interval).unwrap_or(defaults.status_interval),
        report_dir: args.report_dir.clone().or(env_report_dir).or(file.report_dir).unwrap_or(defaults.report_dir),
    };
    settings.validate()?;

    debug!(
        "Resolved settings: batch_size={}, status_interval={}, report_dir={:?}",
        settings.batch_size, settings.status_interval, settings.report_dir
    );
    Ok(settings)
}

/// Task input recorded with the request; carries the problem location when given
pub fn task_input(args: &CliArgs) -> Value {
    let mut input = Map::new();
    if let Some(ref location) = args.problem_location {
        input.insert("problem_location".to_string(), Value::String(location.clone()));
    }
    Value::Object(input)
}

/// Build the report request; `snapshot_course` is used unless `--course` overrides it
pub fn build_request(args: &CliArgs, snapshot_course: &CourseKey) -> ReportRequest {
    let course = args.course.as_deref().map(CourseKey::new).unwrap_or_else(|| snapshot_course.clone());
    ReportRequest::new(course, args.report.action_name())
        .with_task(TaskInfo { task_id: args.task_id.clone(), entry_id: args.entry_id })
        .with_input(task_input(args))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
