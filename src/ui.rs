/// User interface and status output utilities
///
/// This module handles:
/// - Serialized console output
/// - Colored terminal text
/// - The end-of-run summary
use crate::report::ReportOutcome;
use lazy_static::lazy_static;
use std::io::Write;
use std::sync::Mutex;

/// Execute a function with exclusive access to console output
fn status_lock<F>(f: F)
where
    F: FnOnce(),
{
    lazy_static! {
        static ref LOCK: Mutex<()> = Mutex::new(());
    }
    let _guard = LOCK.lock();
    f();
}

/// Print the "gradebook: " prefix for status messages
fn print_status_header() {
    print!("gradebook: ");
}

/// Print colored text to terminal, with fallback to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        if let Some(ref mut t) = term::stdout() {
            if t.fg(fg).is_err() {
                return false;
            }
            let _ = t.attr(term::Attr::Bold);
            if write!(t, "{}", s).is_err() {
                return false;
            }
            let _ = t.reset();
        }

        true
    }
}

/// Print a status message with "gradebook: " prefix
pub fn status(s: &str) {
    status_lock(|| {
        print_status_header();
        println!("{}", s);
    });
}

/// Print an error message with colored "error" prefix
pub fn print_error(msg: &str) {
    status_lock(|| {
        println!();
        print_color("error", term::color::BRIGHT_RED);
        println!(": {}", msg);
        println!();
    });
}

/// One-line counts for a finished run
pub fn format_summary(outcome: &ReportOutcome) -> String {
    let status = &outcome.status;
    format!(
        "{}: {} attempted, {} succeeded, {} failed, {} skipped (total {}) in {}ms",
        status.step().unwrap_or(status.action_name.as_str()),
        status.attempted,
        status.succeeded,
        status.failed,
        status.skipped,
        status.total.map_or_else(|| "unknown".to_string(), |t| t.to_string()),
        status.duration_ms
    )
}

/// Print the run summary and where each report was stored
pub fn print_summary(outcome: &ReportOutcome) {
    status_lock(|| {
        print_status_header();
        let color = if outcome.status.failed > 0 { term::color::BRIGHT_YELLOW } else { term::color::BRIGHT_GREEN };
        print_color(&format_summary(outcome), color);
        println!();
        for stored in &outcome.stored {
            println!("  {} ({} rows) -> {}", stored.name, stored.rows, stored.location.display());
        }
    });
}
