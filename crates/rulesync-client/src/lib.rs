//! Cortex ruler API client for rulesync
//!
//! [`CortexClient`] implements [`rulesync_core::RuleStore`] over the ruler
//! configuration endpoints (`/api/prom/rules`), and [`ConfigLayer`] resolves
//! where to connect from files, flags and the environment.

pub mod client;
pub mod config;
pub mod error;

pub use client::CortexClient;
pub use config::{ClientConfig, ConfigLayer, DEFAULT_TIMEOUT, default_config_path};
pub use error::{Error, Result};
