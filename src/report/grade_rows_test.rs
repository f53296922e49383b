/// Tests for the course grade row compiler
#[cfg(test)]
mod tests {
    use crate::context::{ReportContext, ReportRequest};
    use crate::progress::MemoryStatusSink;
    use crate::report::grade_rows::{grade_results, rows_for_learners, success_headers};
    use crate::report::types::Cell;
    use crate::snapshot::{CertificateRecord, CourseSnapshot};
    use crate::store::MemoryReportStore;
    use crate::test_support::*;
    use crate::types::{ExperimentPartition, Learner};
    use log::Level;

    fn learners(snapshot: &CourseSnapshot) -> Vec<Learner> {
        snapshot.learners.iter().map(|r| r.learner.clone()).collect()
    }

    #[test]
    fn test_grade_results_follow_schema_columns() {
        let schema = crate::schema::GradedAssignmentSchema::derive(&demo_grading());
        let cells: Vec<String> = grade_results(&schema, &demo_grade(0.5)).iter().map(Cell::render).collect();

        assert_eq!(cells.len(), schema.column_count());
        // hw1 attempted 1/2, hw2 never attempted, hw3 has no grade, Homework avg, Exam 3/4
        assert_eq!(cells, vec!["0.5", "Not Attempted", "Not Available", "0.25", "0.75"]);
    }

    #[test]
    fn test_missing_average_is_empty() {
        let schema = crate::schema::GradedAssignmentSchema::derive(&demo_grading());
        let mut grade = demo_grade(0.5);
        grade.grade_breakdown.clear();

        let cells = grade_results(&schema, &grade);

        assert_eq!(cells[3], Cell::Empty);
    }

    #[test]
    fn test_full_row_in_header_order() {
        let snapshot = demo_snapshot(1, &[]);
        let store = MemoryReportStore::new();
        let status = MemoryStatusSink::new();
        let logger = CapturingLogger::default();
        let services = snapshot.services(&store, &status, &logger);
        let ctx = ReportContext::resolve(&ReportRequest::new(course(), "graded"), &services, None).unwrap();

        let rows = rows_for_learners(&ctx, &services, &learners(&snapshot));

        assert_eq!(
            success_headers(&ctx),
            vec![
                "Student ID",
                "Email",
                "Username",
                "Grade",
                "Homework 1: H1",
                "Homework 2: H2",
                "Homework 3: H3",
                "Homework (Avg)",
                "Exam",
                "Enrollment Track",
                "Verification Status",
                "Certificate Eligible",
                "Certificate Delivered",
                "Certificate Type",
            ]
        );
        assert_eq!(
            rows.success[0].render(),
            vec![
                "1",
                "learner1@example.com",
                "learner1",
                "0.5",
                "0.5",
                "Not Attempted",
                "Not Available",
                "0.25",
                "0.75",
                "audit",
                "N/A",
                "Y",
                "N",
                "N/A",
            ]
        );
    }

    #[test]
    fn test_group_columns_when_enabled() {
        let mut snapshot = demo_snapshot(2, &[]);
        snapshot.settings.cohorts_enabled = true;
        snapshot.settings.teams_enabled = true;
        snapshot.settings.experiment_partitions.push(ExperimentPartition { id: 3, name: "Video".to_string() });
        snapshot.learners[0].cohort = Some("Blue".to_string());
        snapshot.learners[0].experiment_groups.insert("3".to_string(), "Control".to_string());
        snapshot.learners[0].team = Some("Owls".to_string());
        let store = MemoryReportStore::new();
        let status = MemoryStatusSink::new();
        let logger = CapturingLogger::default();
        let services = snapshot.services(&store, &status, &logger);
        let ctx = ReportContext::resolve(&ReportRequest::new(course(), "graded"), &services, None).unwrap();

        let headers = success_headers(&ctx);
        let rows = rows_for_learners(&ctx, &services, &learners(&snapshot));

        assert_eq!(headers[9..12], ["Cohort Name", "Experiment Group (Video)", "Team Name"]);
        assert_eq!(rows.success[0].render()[9..12], ["Blue", "Control", "Owls"]);
        // Missing memberships degrade to empty cells
        assert_eq!(rows.success[1].render()[9..12], ["", "", ""]);
        for row in &rows.success {
            assert_eq!(row.len(), headers.len());
        }
    }

    #[test]
    fn test_certificate_columns() {
        let mut snapshot = demo_snapshot(2, &[]);
        snapshot.learners[0].allow_certificate = false;
        snapshot.learners[0].enrollment_mode = "verified".to_string();
        snapshot.learners[0].certificate =
            Some(CertificateRecord { status: "downloadable".to_string(), mode: "verified".to_string() });
        snapshot.certificate_whitelist.push(1);
        snapshot.learners[1].allow_certificate = false;
        let store = MemoryReportStore::new();
        let status = MemoryStatusSink::new();
        let logger = CapturingLogger::default();
        let services = snapshot.services(&store, &status, &logger);
        let ctx = ReportContext::resolve(&ReportRequest::new(course(), "graded"), &services, None).unwrap();

        let rows = rows_for_learners(&ctx, &services, &learners(&snapshot));

        assert_eq!(rows.success[0].render()[9..], ["verified", "Not ID Verified", "Y", "Y", "verified"]);
        assert_eq!(rows.success[1].render()[9..], ["audit", "N/A", "N", "N", "N/A"]);
        let eligibility = logger.lines_at(Level::Info);
        assert!(eligibility.iter().any(|l| l.starts_with("Student certificate eligibility: Y (user=learner1")));
        assert!(eligibility.iter().any(|l| l.starts_with("Student certificate eligibility: N (user=learner2")));
    }

    #[test]
    fn test_failures_become_error_rows() {
        let mut snapshot = demo_snapshot(3, &[2]);
        snapshot.learners[2].grade = None;
        let store = MemoryReportStore::new();
        let status = MemoryStatusSink::new();
        let logger = CapturingLogger::default();
        let services = snapshot.services(&store, &status, &logger);
        let ctx = ReportContext::resolve(&ReportRequest::new(course(), "graded"), &services, None).unwrap();

        let rows = rows_for_learners(&ctx, &services, &learners(&snapshot));

        assert_eq!(rows.success.len(), 1);
        assert_eq!(rows.errors.len(), 2);
        assert_eq!(rows.errors[0].message, "grading failed for learner2");
        assert_eq!(rows.errors[1].message, "Unknown error");
    }
}
