//! Rule files on disk and canned rule groups.

use std::fs;
use std::path::{Path, PathBuf};

use rulesync_model::{PromDuration, Rule, RuleGroup};
use tempfile::TempDir;

/// The `cpu-alerts` group with a single `HighCPU` alert on `expr`, firing
/// after 5m.
pub fn cpu_alerts(expr: &str) -> RuleGroup {
    RuleGroup::new(
        "cpu-alerts",
        PromDuration::ZERO,
        vec![
            Rule::alerting("HighCPU", expr, PromDuration::from_secs(300))
                .with_label("severity", "page")
                .with_annotation("summary", "CPU usage is high"),
        ],
    )
}

/// A group holding one recording rule named `<name>:sum`.
pub fn recording_group(name: &str) -> RuleGroup {
    RuleGroup::new(
        name,
        PromDuration::from_secs(60),
        vec![Rule::recording(format!("{name}:sum"), "sum(rate(requests_total[5m]))")],
    )
}

/// YAML for [`cpu_alerts`] under `namespace`.
pub fn cpu_alerts_yaml(namespace: &str, expr: &str) -> String {
    format!(
        r#"namespace: {namespace}
groups:
  - name: cpu-alerts
    rules:
      - alert: HighCPU
        expr: {expr}
        for: 5m
        labels:
          severity: page
        annotations:
          summary: CPU usage is high
"#
    )
}

/// A temporary directory of rule files.
pub struct RuleFiles {
    dir: TempDir,
}

impl Default for RuleFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleFiles {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("RuleFiles::new: failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` and return the full path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
        path
    }
}
