//! Command implementations for rulesync-cli

pub mod load;
pub mod rules;

use rulesync_client::{ConfigLayer, CortexClient};
use rulesync_model::ParseOptions;

use crate::cli::{ConnectionArgs, FileArgs};
use crate::error::Result;

pub use load::{run_diff, run_load};
pub use rules::{run_delete, run_get, run_lint, run_list, run_print};

/// Build a ruler client from the config file, flags and environment.
pub fn connect(args: &ConnectionArgs) -> Result<CortexClient> {
    let config = ConfigLayer::discover(args.config.as_deref())?
        .merge(args.layer())
        .resolve()?;
    tracing::debug!(
        address = %config.address,
        tenant = %config.tenant_id,
        timeout = ?config.timeout,
        "connecting to ruler"
    );
    Ok(CortexClient::new(&config)?)
}

fn parse_options(files: &FileArgs) -> ParseOptions {
    ParseOptions {
        default_namespace: files.default_namespace.clone(),
    }
}
