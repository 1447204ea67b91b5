//! Shared test utilities for the rulesync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`store`]: [`MemoryRuleStore`], an in-memory [`RuleStore`] that records
//!   every call and can be told to fail
//! - [`fixtures`]: rule files on disk and canned rule groups
//!
//! [`RuleStore`]: rulesync_core::RuleStore

pub mod fixtures;
pub mod store;

pub use fixtures::{RuleFiles, cpu_alerts, cpu_alerts_yaml, recording_group};
pub use store::{MemoryRuleStore, StoreCall};
