//! Remote rule store abstraction
//!
//! The reconciler never talks HTTP itself. It drives a [`RuleStore`], which
//! the CLI backs with the Cortex ruler client and tests back with an
//! in-memory fake.

use std::collections::BTreeMap;

use rulesync_model::RuleGroup;

/// All rule groups in the store, keyed by namespace
pub type RuleSet = BTreeMap<String, Vec<RuleGroup>>;

/// Result of fetching a single rule group.
///
/// "Not found" is an expected answer that drives group creation, so it is
/// a value here rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The group exists in the store
    Found(RuleGroup),
    /// The store has no group with that namespace and name
    NotFound,
}

impl FetchOutcome {
    pub fn into_option(self) -> Option<RuleGroup> {
        match self {
            Self::Found(group) => Some(group),
            Self::NotFound => None,
        }
    }
}

/// Errors reported by a rule store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested resource does not exist
    #[error("resource not found")]
    NotFound,

    /// The store could not be reached (connection, TLS, timeout)
    #[error("unable to contact the rule store: {0}")]
    Transport(String),

    /// The store answered with an unexpected status
    #[error("rule store returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// A response body could not be decoded
    #[error("unable to decode rule store response: {0}")]
    Decode(String),

    /// A request body could not be encoded
    #[error("unable to encode rule group: {0}")]
    Encode(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Capability set of a remote rule-management service.
///
/// Calls block the current thread until the store answers; timeouts are the
/// implementation's concern.
pub trait RuleStore {
    /// Fetch one group by namespace and name.
    fn get_rule_group(&self, namespace: &str, group: &str) -> Result<FetchOutcome, StoreError>;

    /// Create the group, replacing any existing group with the same name.
    fn create_rule_group(&self, namespace: &str, group: &RuleGroup) -> Result<(), StoreError>;

    /// Delete one group. Returns [`StoreError::NotFound`] if it does not exist.
    fn delete_rule_group(&self, namespace: &str, group: &str) -> Result<(), StoreError>;

    /// List every group in every namespace.
    ///
    /// Returns [`StoreError::NotFound`] when the tenant has no rules at all.
    fn list_rules(&self) -> Result<RuleSet, StoreError>;
}

impl<S: RuleStore + ?Sized> RuleStore for &S {
    fn get_rule_group(&self, namespace: &str, group: &str) -> Result<FetchOutcome, StoreError> {
        (**self).get_rule_group(namespace, group)
    }

    fn create_rule_group(&self, namespace: &str, group: &RuleGroup) -> Result<(), StoreError> {
        (**self).create_rule_group(namespace, group)
    }

    fn delete_rule_group(&self, namespace: &str, group: &str) -> Result<(), StoreError> {
        (**self).delete_rule_group(namespace, group)
    }

    fn list_rules(&self) -> Result<RuleSet, StoreError> {
        (**self).list_rules()
    }
}
