//! In-memory [`RuleStore`] for reconciliation tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use rulesync_core::{FetchOutcome, RuleSet, RuleStore, StoreError};
use rulesync_model::RuleGroup;

/// A call received by [`MemoryRuleStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get { namespace: String, group: String },
    Create { namespace: String, group: String },
    Delete { namespace: String, group: String },
    List,
}

#[derive(Debug, Clone)]
enum Fault {
    Transport(String),
    Status(u16),
}

impl Fault {
    fn to_error(&self) -> StoreError {
        match self {
            Fault::Transport(message) => StoreError::Transport(message.clone()),
            Fault::Status(status) => StoreError::Status {
                status: *status,
                body: "injected failure".to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
struct State {
    groups: RuleSet,
    calls: Vec<StoreCall>,
    fetch_faults: HashMap<(String, String), Fault>,
    write_faults: HashMap<(String, String), Fault>,
}

/// Rule store backed by a map, with call recording and fault injection.
///
/// # Example
///
/// ```rust
/// use rulesync_test_utils::{MemoryRuleStore, cpu_alerts};
///
/// let store = MemoryRuleStore::new().with_group("team-a", cpu_alerts("cpu > 90"));
/// store.fail_write("team-a", "cpu-alerts", 500);
/// assert_eq!(store.write_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    state: Mutex<State>,
}

impl MemoryRuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a group without recording a call.
    pub fn with_group(self, namespace: &str, group: RuleGroup) -> Self {
        upsert(&mut self.lock().groups, namespace, group);
        self
    }

    /// Make fetches of the given group fail with a transport error.
    pub fn fail_fetch(&self, namespace: &str, group: &str, message: &str) {
        self.lock().fetch_faults.insert(
            (namespace.to_string(), group.to_string()),
            Fault::Transport(message.to_string()),
        );
    }

    /// Make writes of the given group fail with an HTTP status.
    pub fn fail_write(&self, namespace: &str, group: &str, status: u16) {
        self.lock()
            .write_faults
            .insert((namespace.to_string(), group.to_string()), Fault::Status(status));
    }

    /// The stored copy of a group, if any.
    pub fn group(&self, namespace: &str, group: &str) -> Option<RuleGroup> {
        self.lock()
            .groups
            .get(namespace)?
            .iter()
            .find(|g| g.name == group)
            .cloned()
    }

    /// Every group currently stored.
    pub fn snapshot(&self) -> RuleSet {
        self.lock().groups.clone()
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Number of create calls received, including failed ones.
    pub fn write_count(&self) -> usize {
        self.count(|c| matches!(c, StoreCall::Create { .. }))
    }

    /// Number of get calls received.
    pub fn fetch_count(&self) -> usize {
        self.count(|c| matches!(c, StoreCall::Get { .. }))
    }

    /// Forget recorded calls, keeping stored groups and faults.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn count(&self, pred: impl Fn(&StoreCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn upsert(groups: &mut RuleSet, namespace: &str, group: RuleGroup) {
    let entries = groups.entry(namespace.to_string()).or_default();
    match entries.iter_mut().find(|g| g.name == group.name) {
        Some(existing) => *existing = group,
        None => entries.push(group),
    }
}

impl RuleStore for MemoryRuleStore {
    fn get_rule_group(&self, namespace: &str, group: &str) -> Result<FetchOutcome, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Get {
            namespace: namespace.to_string(),
            group: group.to_string(),
        });

        let key = (namespace.to_string(), group.to_string());
        if let Some(fault) = state.fetch_faults.get(&key) {
            return Err(fault.to_error());
        }

        let found = state
            .groups
            .get(namespace)
            .and_then(|groups| groups.iter().find(|g| g.name == group))
            .cloned();
        Ok(match found {
            Some(group) => FetchOutcome::Found(group),
            None => FetchOutcome::NotFound,
        })
    }

    fn create_rule_group(&self, namespace: &str, group: &RuleGroup) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Create {
            namespace: namespace.to_string(),
            group: group.name.clone(),
        });

        let key = (namespace.to_string(), group.name.clone());
        if let Some(fault) = state.write_faults.get(&key) {
            return Err(fault.to_error());
        }

        upsert(&mut state.groups, namespace, group.clone());
        Ok(())
    }

    fn delete_rule_group(&self, namespace: &str, group: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Delete {
            namespace: namespace.to_string(),
            group: group.to_string(),
        });

        let Some(groups) = state.groups.get_mut(namespace) else {
            return Err(StoreError::NotFound);
        };
        let before = groups.len();
        groups.retain(|g| g.name != group);
        if groups.len() == before {
            return Err(StoreError::NotFound);
        }
        if groups.is_empty() {
            state.groups.remove(namespace);
        }
        Ok(())
    }

    fn list_rules(&self) -> Result<RuleSet, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::List);
        if state.groups.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(state.groups.clone())
    }
}
