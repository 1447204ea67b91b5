//! Schema definitions for rule files and remote rule groups
//!
//! - [`rule`] - recording and alerting rules
//! - [`group`] - rule groups and namespaces

mod group;
mod rule;

pub(crate) use group::RuleDocument;
pub use group::{Namespace, RuleGroup};
pub use rule::{AlertingRule, Labels, RecordingRule, Rule, RuleError, RuleKind};
