//! Reconciler implementation
//!
//! For each declared group, in declaration order:
//!
//! 1. fetch the remote copy
//! 2. compare it with the local declaration
//! 3. create or replace the group when it is missing or different
//!
//! The first fetch or write failure stops the run. Groups already written
//! stay written; nothing is rolled back.

use std::time::Instant;

use rulesync_model::{Namespace, RuleGroup};
use tracing::{debug, error, info};

use super::report::{FailureStage, GroupAction, GroupOutcome, LoadFailure, LoadReport};
use crate::compare::{Comparison, compare_groups};
use crate::store::{FetchOutcome, RuleStore, StoreError};

/// Options for a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// If true, compare but never write. Outcomes describe what would happen.
    pub dry_run: bool,
    /// Groups not started before this instant abort the run
    pub deadline: Option<Instant>,
}

impl ReconcileOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Converges a rule store onto locally declared namespaces
pub struct Reconciler<'a> {
    store: &'a dyn RuleStore,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn RuleStore, options: ReconcileOptions) -> Self {
        Self { store, options }
    }

    /// Reconcile every group of every namespace.
    ///
    /// Always returns a report. Check [`LoadReport::success`] or call
    /// [`LoadReport::ensure_success`] to learn whether the run completed.
    pub fn reconcile(&self, namespaces: &[Namespace]) -> LoadReport {
        let mut report = LoadReport::start(self.options.dry_run);

        for namespace in namespaces {
            for group in &namespace.groups {
                if let Some(deadline) = self.options.deadline
                    && Instant::now() >= deadline
                {
                    error!(
                        namespace = %namespace.name,
                        group = %group.name,
                        "deadline exceeded before group was loaded"
                    );
                    return report.abort(LoadFailure {
                        namespace: namespace.name.clone(),
                        group: group.name.clone(),
                        stage: FailureStage::Deadline,
                        message: "deadline exceeded".to_string(),
                    });
                }

                match self.reconcile_group(&namespace.name, group) {
                    Ok(outcome) => report.outcomes.push(outcome),
                    Err(failure) => {
                        error!(
                            namespace = %failure.namespace,
                            group = %failure.group,
                            stage = %failure.stage,
                            error = %failure.message,
                            "unable to load rule group"
                        );
                        return report.abort(failure);
                    }
                }
            }
        }

        info!(
            created = report.created(),
            updated = report.updated(),
            unchanged = report.unchanged(),
            dry_run = self.options.dry_run,
            "load operation successful"
        );
        report.finish()
    }

    fn reconcile_group(
        &self,
        namespace: &str,
        group: &RuleGroup,
    ) -> std::result::Result<GroupOutcome, LoadFailure> {
        let fail = |stage: FailureStage, err: StoreError| LoadFailure {
            namespace: namespace.to_string(),
            group: group.name.clone(),
            stage,
            message: err.to_string(),
        };

        let remote = match self.store.get_rule_group(namespace, &group.name) {
            Ok(FetchOutcome::Found(remote)) => Some(remote),
            Ok(FetchOutcome::NotFound) | Err(StoreError::NotFound) => None,
            Err(err) => return Err(fail(FailureStage::Fetch, err)),
        };

        let (action, difference) = match remote {
            None => {
                debug!(namespace, group = %group.name, "group does not exist");
                (GroupAction::Created, None)
            }
            Some(remote) => match compare_groups(&remote, group) {
                Comparison::Equal => {
                    info!(namespace, group = %group.name, "group already exists");
                    return Ok(GroupOutcome {
                        namespace: namespace.to_string(),
                        group: group.name.clone(),
                        action: GroupAction::Unchanged,
                        difference: None,
                    });
                }
                Comparison::Different(difference) => {
                    info!(
                        namespace,
                        group = %group.name,
                        difference = %difference,
                        "updating group"
                    );
                    (GroupAction::Updated, Some(difference))
                }
            },
        };

        if self.options.dry_run {
            debug!(namespace, group = %group.name, %action, "[dry-run] skipping write");
        } else {
            self.store
                .create_rule_group(namespace, group)
                .map_err(|err| fail(FailureStage::Write, err))?;
        }

        Ok(GroupOutcome {
            namespace: namespace.to_string(),
            group: group.name.clone(),
            action,
            difference,
        })
    }
}
