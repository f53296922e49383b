//! Aggregation of per-batch results into the final report rows.

use super::types::{BatchRows, ErrorRow, Row};
use crate::context::ReportContext;
use log::debug;

/// Default number of attempted learners between checkpoint status updates
pub const DEFAULT_STATUS_INTERVAL: u64 = 100;

/// Everything compiled over a run, in batch order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledRows {
    pub success: Vec<Row>,
    pub errors: Vec<ErrorRow>,
}

/// Accumulates batch results and keeps the run's counters current
#[derive(Debug)]
pub struct Aggregator {
    status_interval: u64,
    rows: CompiledRows,
    checkpoints: u64,
}

impl Aggregator {
    pub fn new(status_interval: u64) -> Self {
        Self { status_interval: status_interval.max(1), rows: CompiledRows::default(), checkpoints: 0 }
    }

    /// Append one batch and update counters.
    ///
    /// Publishes `checkpoint_message` whenever attempted crosses a multiple of
    /// the status interval.
    pub fn absorb(&mut self, ctx: &mut ReportContext<'_>, batch: BatchRows, checkpoint_message: &str) {
        let before = ctx.progress().attempted() / self.status_interval;

        let succeeded = batch.success.len() as u64;
        let failed = batch.errors.len() as u64;
        self.rows.success.extend(batch.success);
        self.rows.errors.extend(batch.errors);
        ctx.progress_mut().record_batch(succeeded, failed);

        let progress = ctx.progress();
        debug!(
            "Aggregated batch: {} succeeded, {} failed ({} attempted so far)",
            succeeded,
            failed,
            progress.attempted()
        );

        if progress.attempted() / self.status_interval > before {
            self.checkpoints += 1;
            ctx.update_status(checkpoint_message);
        }
    }

    /// Checkpoint updates published so far
    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }

    /// Close the run: the total becomes at least the attempted count
    pub fn finish(self, ctx: &mut ReportContext<'_>) -> CompiledRows {
        let attempted = ctx.progress().attempted();
        ctx.progress_mut().raise_total(attempted);
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ReportRequest;
    use crate::progress::MemoryStatusSink;
    use crate::store::MemoryReportStore;
    use crate::test_support::*;
    use crate::types::Learner;

    fn batch(success: usize, errors: usize) -> BatchRows {
        let learner = Learner { id: 1, username: "a".to_string(), email: "a@example.com".to_string() };
        BatchRows {
            success: (0..success).map(|_| Row::new()).collect(),
            errors: (0..errors).map(|_| ErrorRow { learner: learner.clone(), message: "x".to_string() }).collect(),
        }
    }

    #[test]
    fn test_counters_follow_batches() {
        let snapshot = demo_snapshot(0, &[]);
        let store = MemoryReportStore::new();
        let status = MemoryStatusSink::new();
        let logger = CapturingLogger::default();
        let services = snapshot.services(&store, &status, &logger);
        let mut ctx = ReportContext::resolve(&ReportRequest::new(course(), "graded"), &services, None).unwrap();

        let mut aggregator = Aggregator::new(100);
        aggregator.absorb(&mut ctx, batch(2, 1), "Compiling grades");
        aggregator.absorb(&mut ctx, batch(2, 0), "Compiling grades");

        assert_eq!(ctx.progress().succeeded(), 4);
        assert_eq!(ctx.progress().failed(), 1);
        assert_eq!(ctx.progress().attempted(), 5);

        let rows = aggregator.finish(&mut ctx);
        assert_eq!(rows.success.len(), 4);
        assert_eq!(rows.errors.len(), 1);
        assert_eq!(ctx.progress().total(), Some(5));
    }

    #[test]
    fn test_checkpoint_when_crossing_interval() {
        let snapshot = demo_snapshot(0, &[]);
        let store = MemoryReportStore::new();
        let status = MemoryStatusSink::new();
        let logger = CapturingLogger::default();
        let services = snapshot.services(&store, &status, &logger);
        let mut ctx = ReportContext::resolve(&ReportRequest::new(course(), "graded"), &services, None).unwrap();

        let mut aggregator = Aggregator::new(3);
        aggregator.absorb(&mut ctx, batch(2, 0), "Compiling grades");
        assert_eq!(aggregator.checkpoints(), 0);
        aggregator.absorb(&mut ctx, batch(1, 1), "Compiling grades");
        assert_eq!(aggregator.checkpoints(), 1);
        aggregator.absorb(&mut ctx, batch(4, 0), "Compiling grades");
        assert_eq!(aggregator.checkpoints(), 2);
        assert_eq!(status.steps(), vec!["Compiling grades", "Compiling grades"]);
    }

    #[test]
    fn test_finish_keeps_larger_known_total() {
        let snapshot = demo_snapshot(0, &[]);
        let store = MemoryReportStore::new();
        let status = MemoryStatusSink::new();
        let logger = CapturingLogger::default();
        let services = snapshot.services(&store, &status, &logger);
        let mut ctx = ReportContext::resolve(&ReportRequest::new(course(), "graded"), &services, Some(10)).unwrap();

        let mut aggregator = Aggregator::new(100);
        aggregator.absorb(&mut ctx, batch(3, 0), "Compiling problem grades");
        aggregator.finish(&mut ctx);

        assert_eq!(ctx.progress().total(), Some(10));
    }
}
