//! Rule group data model and rule file parsing for rulesync.
//!
//! This crate provides the immutable types that describe rule definitions
//! (namespaces, rule groups, recording and alerting rules) and the parser
//! that turns rule files on disk into those types.

pub mod duration;
pub mod error;
pub mod parser;
pub mod schema;

pub use duration::{DurationError, PromDuration};
pub use error::{Error, Result};
pub use parser::{ParseOptions, RuleParser, parse_files};
pub use schema::{
    AlertingRule, Labels, Namespace, RecordingRule, Rule, RuleError, RuleGroup, RuleKind,
};
