//! rulesync CLI
//!
//! Loads Prometheus-style rule files into a Cortex ruler, writing only the
//! groups that are missing or have changed.

mod cli;
mod commands;
mod error;
mod logging;
mod metrics;

use std::io;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, ConnectionArgs, RulesAction};
use commands::connect;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: unable to initialise logging: {}", "warning".yellow().bold(), e);
    }

    match cli.command {
        Commands::Rules { connection, action } => execute_rules(&connection, action),
    }
}

fn execute_rules(connection: &ConnectionArgs, action: RulesAction) -> Result<()> {
    let mut out = io::stdout().lock();
    match action {
        RulesAction::List => commands::run_list(&connect(connection)?, &mut out),
        RulesAction::Print => commands::run_print(&connect(connection)?, &mut out),
        RulesAction::Get { namespace, group } => {
            commands::run_get(&connect(connection)?, &namespace, &group, &mut out)
        }
        RulesAction::Delete { namespace, group } => {
            commands::run_delete(&connect(connection)?, &namespace, &group, &mut out)
        }
        RulesAction::Load(args) => commands::run_load(&connect(connection)?, &args, &mut out),
        RulesAction::Diff { files, json } => {
            commands::run_diff(&connect(connection)?, &files, json, &mut out)
        }
        RulesAction::Lint { files } => commands::run_lint(&files, &mut out),
    }
}
