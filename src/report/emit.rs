//! Report emission: turn compiled rows into tables and upload them.

use super::aggregate::CompiledRows;
use super::types::{ErrorLayout, Table};
use crate::error::Result;
use crate::services::{ReportStore, StoredReport};
use crate::types::CourseKey;
use chrono::{DateTime, Utc};
use log::{debug, info};

/// Suffix appended to a report name for its error table
pub const ERROR_SUFFIX: &str = "_err";

/// Name and table shapes of one report artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub name: String,
    pub success_headers: Vec<String>,
    pub error_layout: ErrorLayout,
    /// Skip the success upload when no learner succeeded
    pub skip_empty_success: bool,
}

impl ReportArtifact {
    pub fn error_name(&self) -> String {
        format!("{}{}", self.name, ERROR_SUFFIX)
    }

    /// Render compiled rows into the success and error tables
    pub fn tables(&self, rows: CompiledRows) -> (Table, Table) {
        let mut success = Table::new(self.success_headers.clone());
        success.rows = rows.success.iter().map(|r| r.render()).collect();

        let mut errors = Table::new(self.error_layout.headers());
        errors.rows = rows.errors.iter().map(|e| self.error_layout.render(e)).collect();

        (success, errors)
    }
}

/// Uploads a run's tables under one shared timestamp
pub struct ReportEmitter<'a> {
    store: &'a dyn ReportStore,
    course: &'a CourseKey,
    timestamp: DateTime<Utc>,
}

impl<'a> ReportEmitter<'a> {
    pub fn new(store: &'a dyn ReportStore, course: &'a CourseKey, timestamp: DateTime<Utc>) -> Self {
        Self { store, course, timestamp }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Upload a single table under `name`
    pub fn upload(&self, name: &str, table: Table) -> Result<StoredReport> {
        debug!("Uploading {} ({} rows) for {}", name, table.rows.len(), self.course);
        let rows = table.into_rows();
        let stored = self.store.store_rows(self.course, name, &rows, self.timestamp)?;
        info!("Stored {} at {}", stored.name, stored.location.display());
        Ok(stored)
    }

    /// Upload the success table and, when there are errors, the error table
    pub fn emit(&self, artifact: &ReportArtifact, rows: CompiledRows) -> Result<Vec<StoredReport>> {
        let (success, errors) = artifact.tables(rows);
        let mut stored = Vec::new();

        if !(artifact.skip_empty_success && success.is_empty()) {
            stored.push(self.upload(&artifact.name, success)?);
        }
        if !errors.is_empty() {
            stored.push(self.upload(&artifact.error_name(), errors)?);
        }

        Ok(stored)
    }
}
