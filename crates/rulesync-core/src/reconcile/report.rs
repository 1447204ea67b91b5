//! Reports produced by a reconciliation run

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::compare::Difference;
use crate::{Error, Result};

/// What the reconciler did (or would do) with a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupAction {
    /// The group did not exist remotely and was written
    Created,
    /// The remote copy differed and was replaced
    Updated,
    /// The remote copy already matched; no write was issued
    Unchanged,
}

impl fmt::Display for GroupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Result of reconciling a single group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOutcome {
    pub namespace: String,
    pub group: String,
    pub action: GroupAction,
    /// Present when the action is [`GroupAction::Updated`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<Difference>,
}

impl fmt::Display for GroupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}/{}", self.action, self.namespace, self.group)
    }
}

/// Step at which a run was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Fetching the remote copy failed for a reason other than "not found"
    Fetch,
    /// Creating or replacing the group failed
    Write,
    /// The overall deadline passed before the group was started
    Deadline,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Write => write!(f, "write"),
            Self::Deadline => write!(f, "deadline"),
        }
    }
}

/// The group that stopped a run and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub namespace: String,
    pub group: String,
    pub stage: FailureStage,
    pub message: String,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {}/{}: {}",
            self.stage, self.namespace, self.group, self.message
        )
    }
}

/// Report from a reconciliation run
///
/// Outcomes are listed in processing order. On failure the failing group has
/// no outcome entry and everything after it was never attempted.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Whether every group was processed
    pub success: bool,
    /// Whether writes were suppressed
    pub dry_run: bool,
    pub outcomes: Vec<GroupOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<LoadFailure>,
    /// When the run started
    pub attempted_at: DateTime<Utc>,
    /// When the run finished, if it succeeded and was not a dry run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub succeeded_at: Option<DateTime<Utc>>,
}

impl LoadReport {
    pub(crate) fn start(dry_run: bool) -> Self {
        Self {
            success: false,
            dry_run,
            outcomes: Vec::new(),
            failure: None,
            attempted_at: Utc::now(),
            succeeded_at: None,
        }
    }

    /// Mark the run complete. A dry run loads nothing, so it never records
    /// a success time.
    pub(crate) fn finish(mut self) -> Self {
        self.success = true;
        if !self.dry_run {
            self.succeeded_at = Some(Utc::now());
        }
        self
    }

    pub(crate) fn abort(mut self, failure: LoadFailure) -> Self {
        self.success = false;
        self.failure = Some(failure);
        self
    }

    fn count(&self, action: GroupAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    pub fn created(&self) -> usize {
        self.count(GroupAction::Created)
    }

    pub fn updated(&self) -> usize {
        self.count(GroupAction::Updated)
    }

    pub fn unchanged(&self) -> usize {
        self.count(GroupAction::Unchanged)
    }

    /// Number of writes issued (or planned, for a dry run)
    pub fn writes(&self) -> usize {
        self.created() + self.updated()
    }

    /// Convert a failed report into [`Error::LoadFailed`].
    pub fn ensure_success(&self) -> Result<()> {
        match &self.failure {
            None => Ok(()),
            Some(failure) => Err(Error::LoadFailed {
                namespace: failure.namespace.clone(),
                group: failure.group.clone(),
                message: failure.message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(group: &str, action: GroupAction) -> GroupOutcome {
        GroupOutcome {
            namespace: "team-a".into(),
            group: group.into(),
            action,
            difference: None,
        }
    }

    #[test]
    fn test_counts() {
        let mut report = LoadReport::start(false);
        report.outcomes.push(outcome("a", GroupAction::Created));
        report.outcomes.push(outcome("b", GroupAction::Unchanged));
        report.outcomes.push(outcome("c", GroupAction::Updated));
        report.outcomes.push(outcome("d", GroupAction::Unchanged));
        let report = report.finish();

        assert!(report.success);
        assert_eq!(report.created(), 1);
        assert_eq!(report.updated(), 1);
        assert_eq!(report.unchanged(), 2);
        assert_eq!(report.writes(), 2);
        assert!(report.succeeded_at.is_some());
        assert!(report.ensure_success().is_ok());
    }

    #[test]
    fn test_dry_run_has_no_success_time() {
        let report = LoadReport::start(true).finish();

        assert!(report.success);
        assert!(report.succeeded_at.is_none());
        assert!(report.ensure_success().is_ok());
    }

    #[test]
    fn test_aborted_report_is_error() {
        let report = LoadReport::start(false).abort(LoadFailure {
            namespace: "team-a".into(),
            group: "cpu-alerts".into(),
            stage: FailureStage::Write,
            message: "status 500".into(),
        });

        assert!(!report.success);
        assert!(report.succeeded_at.is_none());
        let err = report.ensure_success().unwrap_err();
        assert!(matches!(err, Error::LoadFailed { ref group, .. } if group == "cpu-alerts"));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            outcome("cpu-alerts", GroupAction::Created).to_string(),
            "created: team-a/cpu-alerts"
        );
    }
}
