//! Load and diff command implementations

use std::io::Write;
use std::time::{Duration, Instant};

use colored::Colorize;
use rulesync_core::{GroupAction, LoadReport, ReconcileOptions, RuleStore, load_files};

use super::parse_options;
use crate::cli::{FileArgs, LoadArgs};
use crate::error::Result;
use crate::metrics::{self, LoadGauges};

/// Run the load command
///
/// Creates or updates every group declared in the files. The report is
/// printed before the run's error, if any, is returned.
pub fn run_load(store: &dyn RuleStore, args: &LoadArgs, out: &mut impl Write) -> Result<()> {
    let options = ReconcileOptions {
        dry_run: args.dry_run,
        deadline: args
            .timeout
            .map(|secs| Instant::now() + Duration::from_secs(secs)),
    };

    if !args.json {
        writeln!(
            out,
            "{} Loading rule groups from {} file(s)...",
            "=>".blue().bold(),
            args.files.files.len()
        )?;
    }

    let report = load_files(store, &args.files.files, &parse_options(&args.files), &options)?;

    if args.json {
        write_json(&report, out)?;
    } else {
        write_report(&report, false, out)?;
    }

    match &args.metrics_file {
        Some(path) if args.dry_run => {
            tracing::debug!(path = %path.display(), "dry run, metrics file left untouched");
        }
        Some(path) => {
            let gauges = LoadGauges::from_report(&report, metrics::previous_success(path));
            gauges.write(path)?;
            tracing::debug!(path = %path.display(), "wrote load metrics");
        }
        None => {}
    }

    report.ensure_success()?;
    Ok(())
}

/// Run the diff command
///
/// A dry-run load that prints every difference found.
pub fn run_diff(
    store: &dyn RuleStore,
    files: &FileArgs,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let report = load_files(
        store,
        &files.files,
        &parse_options(files),
        &ReconcileOptions::dry_run(),
    )?;

    if json {
        write_json(&report, out)?;
    } else {
        write_report(&report, true, out)?;
    }

    report.ensure_success()?;
    Ok(())
}

fn write_json(report: &LoadReport, out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

fn write_report(report: &LoadReport, detailed: bool, out: &mut impl Write) -> Result<()> {
    for outcome in &report.outcomes {
        let marker = match outcome.action {
            GroupAction::Created => "+".green(),
            GroupAction::Updated => "~".yellow(),
            GroupAction::Unchanged => "=".dimmed(),
        };
        writeln!(out, "   {} {}", marker, outcome)?;

        if detailed && let Some(difference) = &outcome.difference {
            for change in difference.changes() {
                writeln!(out, "       {}", change)?;
            }
        }
    }

    if let Some(failure) = &report.failure {
        writeln!(out, "{} {}", "FAILED".red().bold(), failure)?;
        return Ok(());
    }

    let summary = format!(
        "{} created, {} updated, {} unchanged",
        report.created(),
        report.updated(),
        report.unchanged()
    );
    if report.dry_run {
        writeln!(out, "{} Dry run, nothing written: {}", "OK".green().bold(), summary)?;
    } else {
        writeln!(out, "{} Load complete: {}", "OK".green().bold(), summary)?;
    }
    Ok(())
}
