//! Semantic comparison of rule groups
//!
//! [`compare_groups`] decides whether the copy of a group held by the remote
//! store still matches the locally declared one. Two groups are equal when
//! they have the same interval and the same rules in the same order, where
//! rules match on variant, name, normalized expression, `for` duration,
//! labels and annotations.
//!
//! Every divergence is collected into a [`Difference`] so the operator can
//! see exactly which rule and field changed.

mod expr;

use std::collections::BTreeSet;
use std::fmt;

use rulesync_model::{Labels, Rule, RuleGroup};
use serde::Serialize;

pub use expr::normalize_expr;

/// The part of a group that diverged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", content = "key", rename_all = "snake_case")]
pub enum Field {
    Name,
    Interval,
    RuleCount,
    Kind,
    RuleName,
    Expr,
    For,
    Label(String),
    Annotation(String),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Interval => write!(f, "interval"),
            Self::RuleCount => write!(f, "rule count"),
            Self::Kind => write!(f, "kind"),
            Self::RuleName => write!(f, "rule name"),
            Self::Expr => write!(f, "expr"),
            Self::For => write!(f, "for"),
            Self::Label(key) => write!(f, "label {:?}", key),
            Self::Annotation(key) => write!(f, "annotation {:?}", key),
        }
    }
}

/// A single divergence between the remote and local copy of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Index of the rule within the group, `None` for group-level fields
    pub rule: Option<usize>,
    pub field: Field,
    /// Remote value, `None` when absent remotely
    pub remote: Option<String>,
    /// Local value, `None` when absent locally
    pub local: Option<String>,
}

impl Change {
    fn group(field: Field, remote: impl ToString, local: impl ToString) -> Self {
        Self {
            rule: None,
            field,
            remote: Some(remote.to_string()),
            local: Some(local.to_string()),
        }
    }

    fn rule(index: usize, field: Field, remote: Option<String>, local: Option<String>) -> Self {
        Self {
            rule: Some(index),
            field,
            remote,
            local,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn value(v: &Option<String>) -> String {
            match v {
                Some(v) => format!("{:?}", v),
                None => "<absent>".to_string(),
            }
        }

        if let Some(index) = self.rule {
            write!(f, "rule[{}] ", index)?;
        }
        write!(
            f,
            "{}: {} -> {}",
            self.field,
            value(&self.remote),
            value(&self.local)
        )
    }
}

/// Every divergence found between two groups. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    changes: Vec<Change>,
}

impl Difference {
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, change) in self.changes.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", change)?;
        }
        Ok(())
    }
}

/// Outcome of comparing a remote group against a local one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Different(Difference),
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }

    pub fn difference(&self) -> Option<&Difference> {
        match self {
            Self::Equal => None,
            Self::Different(d) => Some(d),
        }
    }
}

/// Compare the remote copy of a group with the local declaration.
///
/// Pure and deterministic: changes are reported group-level fields first,
/// then rule by rule in order, labels and annotations by sorted key.
pub fn compare_groups(remote: &RuleGroup, local: &RuleGroup) -> Comparison {
    let mut changes = Vec::new();

    if remote.name != local.name {
        changes.push(Change::group(Field::Name, &remote.name, &local.name));
    }
    if remote.interval != local.interval {
        changes.push(Change::group(Field::Interval, remote.interval, local.interval));
    }
    if remote.rules.len() != local.rules.len() {
        changes.push(Change::group(
            Field::RuleCount,
            remote.rules.len(),
            local.rules.len(),
        ));
    }

    for (index, (r, l)) in remote.rules.iter().zip(&local.rules).enumerate() {
        compare_rules(index, r, l, &mut changes);
    }

    if changes.is_empty() {
        Comparison::Equal
    } else {
        Comparison::Different(Difference { changes })
    }
}

fn compare_rules(index: usize, remote: &Rule, local: &Rule, changes: &mut Vec<Change>) {
    if remote.kind() != local.kind() {
        changes.push(Change::rule(
            index,
            Field::Kind,
            Some(format!("{} {}", remote.kind(), remote.name())),
            Some(format!("{} {}", local.kind(), local.name())),
        ));
        return;
    }

    if remote.name() != local.name() {
        changes.push(Change::rule(
            index,
            Field::RuleName,
            Some(remote.name().to_string()),
            Some(local.name().to_string()),
        ));
    }

    if normalize_expr(remote.expr()) != normalize_expr(local.expr()) {
        changes.push(Change::rule(
            index,
            Field::Expr,
            Some(remote.expr().to_string()),
            Some(local.expr().to_string()),
        ));
    }

    if let (Rule::Alerting(r), Rule::Alerting(l)) = (remote, local)
        && r.for_duration != l.for_duration
    {
        changes.push(Change::rule(
            index,
            Field::For,
            Some(r.for_duration.to_string()),
            Some(l.for_duration.to_string()),
        ));
    }

    compare_maps(index, remote.labels(), local.labels(), Field::Label, changes);

    if let (Rule::Alerting(r), Rule::Alerting(l)) = (remote, local) {
        compare_maps(index, &r.annotations, &l.annotations, Field::Annotation, changes);
    }
}

fn compare_maps(
    index: usize,
    remote: &Labels,
    local: &Labels,
    field: fn(String) -> Field,
    changes: &mut Vec<Change>,
) {
    let keys: BTreeSet<&String> = remote.keys().chain(local.keys()).collect();
    for key in keys {
        let (r, l) = (remote.get(key), local.get(key));
        if r != l {
            changes.push(Change::rule(index, field(key.clone()), r.cloned(), l.cloned()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rulesync_model::PromDuration;

    fn cpu_group(expr: &str) -> RuleGroup {
        RuleGroup::new(
            "cpu-alerts",
            PromDuration::ZERO,
            vec![Rule::alerting("HighCPU", expr, PromDuration::from_secs(300))],
        )
    }

    #[test]
    fn test_identical_groups_are_equal() {
        assert!(compare_groups(&cpu_group("cpu > 90"), &cpu_group("cpu > 90")).is_equal());
    }

    #[test]
    fn test_whitespace_only_expr_change_is_equal() {
        assert!(compare_groups(&cpu_group("cpu > 90"), &cpu_group("cpu>90")).is_equal());
    }

    #[test]
    fn test_expr_change_is_reported() {
        let comparison = compare_groups(&cpu_group("cpu > 80"), &cpu_group("cpu > 90"));
        let difference = comparison.difference().expect("groups should differ");
        assert_eq!(
            difference.changes(),
            &[Change {
                rule: Some(0),
                field: Field::Expr,
                remote: Some("cpu > 80".to_string()),
                local: Some("cpu > 90".to_string()),
            }]
        );
    }

    #[test]
    fn test_interval_change_is_reported() {
        let remote = cpu_group("cpu > 90");
        let mut local = cpu_group("cpu > 90");
        local.interval = PromDuration::from_secs(60);

        let comparison = compare_groups(&remote, &local);
        let changes = comparison.difference().unwrap().changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, Field::Interval);
        assert_eq!(changes[0].rule, None);
        assert_eq!(changes[0].local.as_deref(), Some("1m"));
    }

    #[test]
    fn test_equivalent_intervals_are_equal() {
        let mut remote = cpu_group("cpu > 90");
        remote.interval = "60s".parse().unwrap();
        let mut local = cpu_group("cpu > 90");
        local.interval = "1m".parse().unwrap();
        assert!(compare_groups(&remote, &local).is_equal());
    }

    #[test]
    fn test_kind_change_skips_other_fields() {
        let remote = RuleGroup::new("g", PromDuration::ZERO, vec![Rule::recording("x", "up")]);
        let local = RuleGroup::new(
            "g",
            PromDuration::ZERO,
            vec![Rule::alerting("x", "down", PromDuration::ZERO)],
        );

        let comparison = compare_groups(&remote, &local);
        let changes = comparison.difference().unwrap().changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, Field::Kind);
    }

    #[test]
    fn test_extra_rule_reports_count() {
        let remote = cpu_group("cpu > 90");
        let mut local = cpu_group("cpu > 90");
        local.rules.push(Rule::recording("cpu:avg", "avg(cpu)"));

        let comparison = compare_groups(&remote, &local);
        let changes = comparison.difference().unwrap().changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, Field::RuleCount);
        assert_eq!(changes[0].remote.as_deref(), Some("1"));
        assert_eq!(changes[0].local.as_deref(), Some("2"));
    }

    #[test]
    fn test_label_added_and_removed() {
        let remote = RuleGroup::new(
            "g",
            PromDuration::ZERO,
            vec![Rule::alerting("A", "up == 0", PromDuration::ZERO).with_label("old", "1")],
        );
        let local = RuleGroup::new(
            "g",
            PromDuration::ZERO,
            vec![Rule::alerting("A", "up == 0", PromDuration::ZERO).with_label("new", "2")],
        );

        let comparison = compare_groups(&remote, &local);
        let changes = comparison.difference().unwrap().changes();
        assert_eq!(
            changes,
            &[
                Change::rule(0, Field::Label("new".into()), None, Some("2".into())),
                Change::rule(0, Field::Label("old".into()), Some("1".into()), None),
            ]
        );
    }

    #[test]
    fn test_annotation_change() {
        let remote = RuleGroup::new(
            "g",
            PromDuration::ZERO,
            vec![Rule::alerting("A", "up == 0", PromDuration::ZERO).with_annotation("summary", "a")],
        );
        let local = RuleGroup::new(
            "g",
            PromDuration::ZERO,
            vec![Rule::alerting("A", "up == 0", PromDuration::ZERO).with_annotation("summary", "b")],
        );

        let comparison = compare_groups(&remote, &local);
        assert_eq!(
            comparison.difference().unwrap().changes()[0].field,
            Field::Annotation("summary".into())
        );
    }

    #[test]
    fn test_for_change() {
        let remote = cpu_group("cpu > 90");
        let local = RuleGroup::new(
            "cpu-alerts",
            PromDuration::ZERO,
            vec![Rule::alerting("HighCPU", "cpu > 90", PromDuration::from_secs(600))],
        );

        let comparison = compare_groups(&remote, &local);
        let change = &comparison.difference().unwrap().changes()[0];
        assert_eq!(change.field, Field::For);
        assert_eq!(change.remote.as_deref(), Some("5m"));
        assert_eq!(change.local.as_deref(), Some("10m"));
    }

    #[test]
    fn test_difference_display() {
        let remote = cpu_group("cpu > 80");
        let mut local = cpu_group("cpu > 90");
        local.interval = PromDuration::from_secs(30);

        let comparison = compare_groups(&remote, &local);
        insta::assert_snapshot!(
            comparison.difference().unwrap().to_string(),
            @r#"interval: "0s" -> "30s"; rule[0] expr: "cpu > 80" -> "cpu > 90""#
        );
    }
}
