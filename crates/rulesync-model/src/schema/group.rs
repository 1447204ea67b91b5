//! Rule groups and namespaces

use serde::{Deserialize, Serialize};

use super::rule::{Rule, RuleEntry};
use crate::duration::PromDuration;

/// A named, ordered collection of rules evaluated together.
///
/// Rule order is significant: later rules may read series recorded by
/// earlier ones, so it is preserved exactly as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub name: String,
    /// Evaluation period. Zero means "use the server default".
    #[serde(default, skip_serializing_if = "PromDuration::is_zero")]
    pub interval: PromDuration,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    pub fn new(name: impl Into<String>, interval: PromDuration, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            interval,
            rules,
        }
    }
}

/// A named grouping of rule groups in the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    pub groups: Vec<RuleGroup>,
}

impl Namespace {
    pub fn new(name: impl Into<String>, groups: Vec<RuleGroup>) -> Self {
        Self {
            name: name.into(),
            groups,
        }
    }

    /// Look up a group by name
    pub fn group(&self, name: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// A group as written in a rule file. Unlike [`RuleGroup`], which also
/// decodes ruler responses, unknown keys are rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GroupEntry {
    name: String,
    #[serde(default)]
    interval: PromDuration,
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

impl From<GroupEntry> for RuleGroup {
    fn from(entry: GroupEntry) -> Self {
        Self {
            name: entry.name,
            interval: entry.interval,
            rules: entry.rules.into_iter().map(|RuleEntry(rule)| rule).collect(),
        }
    }
}

/// One YAML document in a rule file.
///
/// ```yaml
/// namespace: team-a
/// groups:
///   - name: cpu-alerts
///     interval: 1m
///     rules:
///       - alert: HighCPU
///         expr: cpu > 90
///         for: 5m
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuleDocument {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}
