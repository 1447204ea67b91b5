//! Reconciliation of rule files against a rule store
//!
//! [`load_files`] is the entry point used by the `load` command: parse every
//! file, then hand the namespaces to a [`Reconciler`]. A parse failure is
//! returned before the store is contacted.

mod engine;
mod report;

use std::path::Path;

use rulesync_model::{ParseOptions, parse_files};

pub use engine::{ReconcileOptions, Reconciler};
pub use report::{FailureStage, GroupAction, GroupOutcome, LoadFailure, LoadReport};

use crate::Result;
use crate::store::RuleStore;

/// Parse `paths` and reconcile the result against `store`.
///
/// # Errors
///
/// Returns [`crate::Error::Parse`] if any file fails to parse. Store
/// failures are reported through the returned [`LoadReport`].
pub fn load_files<P: AsRef<Path>>(
    store: &dyn RuleStore,
    paths: &[P],
    parse: &ParseOptions,
    options: &ReconcileOptions,
) -> Result<LoadReport> {
    let namespaces = parse_files(paths, parse)?;
    tracing::debug!(
        namespaces = namespaces.len(),
        groups = namespaces.iter().map(|ns| ns.groups.len()).sum::<usize>(),
        "parsed rule files"
    );
    Ok(Reconciler::new(store, options.clone()).reconcile(&namespaces))
}
