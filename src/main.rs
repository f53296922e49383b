// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use gradebook_reports::cli::CliArgs;
use gradebook_reports::config::{self, REPORT_DIR_ENV};
use gradebook_reports::progress::LogStatusSink;
use gradebook_reports::snapshot::CourseSnapshot;
use gradebook_reports::store::{self, FileReportStore};
use gradebook_reports::{console_format, report, ui};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    // Resolve settings from flags, environment and settings file
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_report_dir = env::var_os(REPORT_DIR_ENV).map(PathBuf::from);
    let settings = match config::resolve_settings(&args, env_report_dir, &cwd) {
        Ok(s) => s,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    let snapshot = match CourseSnapshot::load(&args.snapshot) {
        Ok(s) => s,
        Err(e) => {
            ui::print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let request = config::build_request(&args, &snapshot.course_id);
    if !args.json {
        ui::status(&format!("Generating {:?} report for {}", args.report, request.course_id));
    }

    let store = FileReportStore::new(&settings.report_dir);
    let status = LogStatusSink;
    let services = snapshot.services(&store, &status, log::logger());

    let outcome = match report::run(args.report, &request, &services, &settings) {
        Ok(o) => o,
        Err(e) => {
            ui::print_error(&format!("Report failed: {}", e));
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                ui::print_error(&format!("Failed to serialize outcome: {}", e));
                std::process::exit(1);
            }
        }
        return;
    }

    ui::print_summary(&outcome);

    if let Some(max_rows) = args.preview {
        for stored in &outcome.stored {
            match store::read_report(&stored.location) {
                Ok(rows) => console_format::print_preview(&stored.name, &rows, max_rows),
                Err(e) => log::warn!("Could not read {} for preview: {}", stored.location.display(), e),
            }
        }
    }
}
