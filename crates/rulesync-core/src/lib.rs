//! Rule group comparison and reconciliation for rulesync
//!
//! This crate holds the logic that converges a remote rule store onto a set
//! of locally declared rule groups:
//!
//! - **store**: the [`RuleStore`] capability set the reconciler talks to
//! - **compare**: semantic equality between a remote and a local rule group
//! - **reconcile**: fetch, compare, and create-or-replace, group by group
//!
//! # Architecture
//!
//! ```text
//!        rule files
//!            |
//!   rulesync-model (parse)
//!            |
//!       Reconciler ---- compare_groups
//!            |
//!        RuleStore (rulesync-client, test fakes)
//! ```

pub mod compare;
pub mod error;
pub mod reconcile;
pub mod store;

pub use compare::{Change, Comparison, Difference, Field, compare_groups, normalize_expr};
pub use error::{Error, Result};
pub use reconcile::{
    FailureStage, GroupAction, GroupOutcome, LoadFailure, LoadReport, ReconcileOptions,
    Reconciler, load_files,
};
pub use store::{FetchOutcome, RuleSet, RuleStore, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_load_failed_displays_group() {
        let error = Error::LoadFailed {
            namespace: "team-a".to_string(),
            group: "cpu-alerts".to_string(),
            message: "connection refused".to_string(),
        };

        let display = error.to_string();
        assert!(
            display.contains("team-a/cpu-alerts"),
            "Error display should contain the group, got: {}",
            display
        );
        assert!(
            display.contains("connection refused"),
            "Error display should contain the cause, got: {}",
            display
        );
    }
}
