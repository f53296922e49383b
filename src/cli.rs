use crate::report::ReportKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "gradebook-reports")]
#[command(about = "Generate course grade reports from a course snapshot")]
#[command(version)]
pub struct CliArgs {
    /// Course snapshot to report on (JSON export of one course)
    #[arg(long, short = 's', value_name = "PATH")]
    pub snapshot: PathBuf,

    /// Which report to generate
    #[arg(long, short = 'r', value_enum, default_value = "grades")]
    pub report: ReportKind,

    /// Course id to report on (default: the snapshot's course)
    #[arg(long, value_name = "COURSE_ID")]
    pub course: Option<String>,

    /// Problem location for the problem-responses report
    #[arg(long, value_name = "LOCATION")]
    pub problem_location: Option<String>,

    /// Directory that receives the CSV reports
    /// Default: $GRADEBOOK_REPORT_DIR, then the settings file, then the platform data dir
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Learners graded per batch (default: 100)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Attempted learners between progress checkpoints (default: 100)
    #[arg(long, value_name = "N")]
    pub status_interval: Option<u64>,

    /// Settings file (default: ./gradebook-reports.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Task id recorded in status log lines
    #[arg(long)]
    pub task_id: Option<String>,

    /// Task entry id recorded in status log lines
    #[arg(long, default_value = "0")]
    pub entry_id: u64,

    /// Print the first N rows of each uploaded report
    #[arg(long, value_name = "ROWS")]
    pub preview: Option<usize>,

    /// Print the final status as JSON
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.report == ReportKind::ProblemResponses && self.problem_location.is_none() {
            return Err("--report problem-responses requires --problem-location".to_string());
        }

        if self.problem_location.is_some() && self.report != ReportKind::ProblemResponses {
            return Err("--problem-location only applies to --report problem-responses".to_string());
        }

        if self.batch_size == Some(0) {
            return Err("--batch-size must be greater than 0".to_string());
        }

        if self.status_interval == Some(0) {
            return Err("--status-interval must be greater than 0".to_string());
        }

        Ok(())
    }
}
