//! Rule definitions: recording and alerting rules
//!
//! # Example YAML
//!
//! ```yaml
//! - record: job:http_requests:rate5m
//!   expr: sum by (job) (rate(http_requests_total[5m]))
//! - alert: HighCPU
//!   expr: cpu > 90
//!   for: 5m
//!   labels:
//!     severity: page
//!   annotations:
//!     summary: CPU is above 90%
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::duration::PromDuration;

/// Label or annotation mapping. Keys are kept sorted so that iteration,
/// serialization and comparison never depend on declaration order.
pub type Labels = BTreeMap<String, String>;

/// Validation failures for a single rule entry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("rule must set exactly one of 'record' or 'alert', found both")]
    BothKinds,

    #[error("rule must set one of 'record' or 'alert'")]
    MissingKind,

    #[error("rule name must not be empty")]
    EmptyName,

    #[error("rule '{0}' has an empty 'expr'")]
    EmptyExpr(String),

    #[error("recording rule '{0}' must not set 'for'")]
    RecordingWithFor(String),

    #[error("recording rule '{0}' must not set 'annotations'")]
    RecordingWithAnnotations(String),
}

/// The two rule variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Recording,
    Alerting,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recording => write!(f, "recording"),
            Self::Alerting => write!(f, "alerting"),
        }
    }
}

/// Stores the result of `expr` under a new series name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingRule {
    pub record: String,
    pub expr: String,
    pub labels: Labels,
}

/// Fires an alert while `expr` returns results for at least `for_duration`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertingRule {
    pub alert: String,
    pub expr: String,
    pub for_duration: PromDuration,
    pub labels: Labels,
    pub annotations: Labels,
}

/// A single rule inside a rule group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleNode", into = "RuleNode")]
pub enum Rule {
    Recording(RecordingRule),
    Alerting(AlertingRule),
}

impl Rule {
    /// Build a recording rule with no labels
    pub fn recording(record: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::Recording(RecordingRule {
            record: record.into(),
            expr: expr.into(),
            labels: Labels::new(),
        })
    }

    /// Build an alerting rule with no labels or annotations
    pub fn alerting(
        alert: impl Into<String>,
        expr: impl Into<String>,
        for_duration: PromDuration,
    ) -> Self {
        Self::Alerting(AlertingRule {
            alert: alert.into(),
            expr: expr.into(),
            for_duration,
            labels: Labels::new(),
            annotations: Labels::new(),
        })
    }

    /// Add a label, returning the modified rule
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Recording(r) => r.labels.insert(key.into(), value.into()),
            Self::Alerting(r) => r.labels.insert(key.into(), value.into()),
        };
        self
    }

    /// Add an annotation to an alerting rule. Recording rules cannot carry
    /// annotations, so they are returned unchanged.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Alerting(r) = &mut self {
            r.annotations.insert(key.into(), value.into());
        }
        self
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Recording(_) => RuleKind::Recording,
            Self::Alerting(_) => RuleKind::Alerting,
        }
    }

    /// The series name for recording rules, the alert name for alerting rules
    pub fn name(&self) -> &str {
        match self {
            Self::Recording(r) => &r.record,
            Self::Alerting(r) => &r.alert,
        }
    }

    pub fn expr(&self) -> &str {
        match self {
            Self::Recording(r) => &r.expr,
            Self::Alerting(r) => &r.expr,
        }
    }

    pub fn labels(&self) -> &Labels {
        match self {
            Self::Recording(r) => &r.labels,
            Self::Alerting(r) => &r.labels,
        }
    }
}

/// Flat on-disk shape of a rule, shared by both variants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RuleNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    record: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alert: Option<String>,
    #[serde(default)]
    expr: String,
    #[serde(default, rename = "for", skip_serializing_if = "Option::is_none")]
    for_duration: Option<PromDuration>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    labels: Labels,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    annotations: Labels,
}

impl TryFrom<RuleNode> for Rule {
    type Error = RuleError;

    fn try_from(node: RuleNode) -> Result<Self, Self::Error> {
        let rule = match (node.record, node.alert) {
            (Some(_), Some(_)) => return Err(RuleError::BothKinds),
            (None, None) => return Err(RuleError::MissingKind),
            (Some(record), None) => {
                if node.for_duration.is_some_and(|d| !d.is_zero()) {
                    return Err(RuleError::RecordingWithFor(record));
                }
                if !node.annotations.is_empty() {
                    return Err(RuleError::RecordingWithAnnotations(record));
                }
                Rule::Recording(RecordingRule {
                    record,
                    expr: node.expr,
                    labels: node.labels,
                })
            }
            (None, Some(alert)) => Rule::Alerting(AlertingRule {
                alert,
                expr: node.expr,
                for_duration: node.for_duration.unwrap_or_default(),
                labels: node.labels,
                annotations: node.annotations,
            }),
        };

        if rule.name().trim().is_empty() {
            return Err(RuleError::EmptyName);
        }
        if rule.expr().trim().is_empty() {
            return Err(RuleError::EmptyExpr(rule.name().to_string()));
        }

        Ok(rule)
    }
}

/// A rule as written in a rule file. Same keys as [`RuleNode`], but a
/// misspelled key is an error rather than a silently dropped field.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntryNode {
    #[serde(default)]
    record: Option<String>,
    #[serde(default)]
    alert: Option<String>,
    #[serde(default)]
    expr: String,
    #[serde(default, rename = "for")]
    for_duration: Option<PromDuration>,
    #[serde(default)]
    labels: Labels,
    #[serde(default)]
    annotations: Labels,
}

/// A validated rule decoded from a rule file
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RuleEntryNode")]
pub(crate) struct RuleEntry(pub(crate) Rule);

impl TryFrom<RuleEntryNode> for RuleEntry {
    type Error = RuleError;

    fn try_from(node: RuleEntryNode) -> Result<Self, Self::Error> {
        Rule::try_from(RuleNode {
            record: node.record,
            alert: node.alert,
            expr: node.expr,
            for_duration: node.for_duration,
            labels: node.labels,
            annotations: node.annotations,
        })
        .map(RuleEntry)
    }
}

impl From<Rule> for RuleNode {
    fn from(rule: Rule) -> Self {
        match rule {
            Rule::Recording(r) => RuleNode {
                record: Some(r.record),
                expr: r.expr,
                labels: r.labels,
                ..RuleNode::default()
            },
            Rule::Alerting(r) => RuleNode {
                alert: Some(r.alert),
                expr: r.expr,
                for_duration: (!r.for_duration.is_zero()).then_some(r.for_duration),
                labels: r.labels,
                annotations: r.annotations,
                ..RuleNode::default()
            },
        }
    }
}
