//! Load timestamps in Prometheus text exposition format
//!
//! The file is meant for a node-exporter textfile collector. It is replaced
//! atomically so a scrape never sees a half-written file.

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use rulesync_core::LoadReport;

use crate::error::Result;

pub const LAST_LOAD: &str = "cortex_last_rule_load_timestamp_seconds";
pub const LAST_SUCCESS: &str = "cortex_last_rule_load_success_timestamp_seconds";

/// The two load gauges, in seconds since the epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadGauges {
    pub last_load: f64,
    pub last_success: f64,
}

impl LoadGauges {
    /// Gauges after `report`. A failed run keeps `previous_success`.
    pub fn from_report(report: &LoadReport, previous_success: Option<f64>) -> Self {
        let last_success = match report.succeeded_at {
            Some(at) => seconds(at),
            None => previous_success.unwrap_or(0.0),
        };
        Self {
            last_load: seconds(report.attempted_at),
            last_success,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(256);
        write_gauge(&mut out, LAST_LOAD, "The timestamp of the last rule load.", self.last_load);
        write_gauge(
            &mut out,
            LAST_SUCCESS,
            "The timestamp of the last successful rule load.",
            self.last_success,
        );
        out
    }

    /// Replace the file at `path` with the rendered gauges.
    pub fn write(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(self.render().as_bytes())?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Success timestamp recorded in an existing metrics file, if any.
pub fn previous_success(path: &Path) -> Option<f64> {
    let content = fs::read_to_string(path).ok()?;
    content.lines().find_map(|line| {
        let value = line.strip_prefix(LAST_SUCCESS)?.strip_prefix(' ')?;
        value.trim().parse().ok()
    })
}

fn seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

fn write_gauge(out: &mut String, name: &str, help: &str, value: f64) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} gauge");
    let _ = writeln!(out, "{name} {value}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rulesync_core::{ReconcileOptions, Reconciler};
    use rulesync_test_utils::{MemoryRuleStore, recording_group};
    use rulesync_model::Namespace;

    fn report(fail: bool) -> LoadReport {
        let store = MemoryRuleStore::new();
        if fail {
            store.fail_write("team-a", "requests", 500);
        }
        Reconciler::new(&store, ReconcileOptions::default())
            .reconcile(&[Namespace::new("team-a", vec![recording_group("requests")])])
    }

    #[test]
    fn test_render() {
        let gauges = LoadGauges {
            last_load: 1700000000.5,
            last_success: 1690000000.0,
        };
        assert_eq!(
            gauges.render(),
            "# HELP cortex_last_rule_load_timestamp_seconds The timestamp of the last rule load.\n\
             # TYPE cortex_last_rule_load_timestamp_seconds gauge\n\
             cortex_last_rule_load_timestamp_seconds 1700000000.5\n\
             # HELP cortex_last_rule_load_success_timestamp_seconds The timestamp of the last successful rule load.\n\
             # TYPE cortex_last_rule_load_success_timestamp_seconds gauge\n\
             cortex_last_rule_load_success_timestamp_seconds 1690000000\n"
        );
    }

    #[test]
    fn test_success_sets_both_gauges() {
        let report = report(false);
        let gauges = LoadGauges::from_report(&report, Some(1.0));
        assert!(gauges.last_success >= gauges.last_load);
        assert!(gauges.last_load > 1.0);
    }

    #[test]
    fn test_failure_keeps_previous_success() {
        let gauges = LoadGauges::from_report(&report(true), Some(1690000000.0));
        assert_eq!(gauges.last_success, 1690000000.0);

        let gauges = LoadGauges::from_report(&report(true), None);
        assert_eq!(gauges.last_success, 0.0);
    }

    #[test]
    fn test_write_then_read_previous_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rulesync.prom");
        assert_eq!(previous_success(&path), None);

        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        LoadGauges {
            last_load: seconds(at),
            last_success: seconds(at),
        }
        .write(&path)
        .unwrap();

        assert_eq!(previous_success(&path), Some(at.timestamp() as f64));
    }
}
