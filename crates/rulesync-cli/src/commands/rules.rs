//! Read, delete, and lint commands

use std::io::Write;

use colored::Colorize;
use rulesync_core::{FetchOutcome, RuleStore, StoreError};
use rulesync_model::parse_files;

use super::parse_options;
use crate::cli::FileArgs;
use crate::error::{CliError, Result};

const NO_RULE_GROUPS: &str = "no rule groups currently exist for this user";
const NO_SUCH_GROUP: &str = "this rule group does not currently exist";

/// Print a `Namespace  Rule Group` table.
pub fn run_list(store: &dyn RuleStore, out: &mut impl Write) -> Result<()> {
    let rules = match store.list_rules() {
        Ok(rules) if !rules.is_empty() => rules,
        Ok(_) | Err(StoreError::NotFound) => {
            writeln!(out, "{}", NO_RULE_GROUPS)?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let width = rules
        .keys()
        .map(String::len)
        .chain(std::iter::once("Namespace".len()))
        .max()
        .unwrap_or_default();

    writeln!(out, "{:<width$}  {}", "Namespace", "Rule Group")?;
    for (namespace, groups) in &rules {
        for group in groups {
            writeln!(out, "{:<width$}  {}", namespace, group.name)?;
        }
    }
    Ok(())
}

/// Print every group as a YAML map of namespace to groups.
pub fn run_print(store: &dyn RuleStore, out: &mut impl Write) -> Result<()> {
    match store.list_rules() {
        Ok(rules) if !rules.is_empty() => {
            write!(out, "{}", serde_yaml::to_string(&rules)?)?;
            Ok(())
        }
        Ok(_) | Err(StoreError::NotFound) => {
            writeln!(out, "{}", NO_RULE_GROUPS)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Print one group as YAML.
pub fn run_get(
    store: &dyn RuleStore,
    namespace: &str,
    group: &str,
    out: &mut impl Write,
) -> Result<()> {
    match store.get_rule_group(namespace, group)? {
        FetchOutcome::Found(group) => write!(out, "{}", serde_yaml::to_string(&group)?)?,
        FetchOutcome::NotFound => writeln!(out, "{}", NO_SUCH_GROUP)?,
    }
    Ok(())
}

pub fn run_delete(
    store: &dyn RuleStore,
    namespace: &str,
    group: &str,
    out: &mut impl Write,
) -> Result<()> {
    match store.delete_rule_group(namespace, group) {
        Ok(()) => {
            writeln!(
                out,
                "{} Deleted rule group {}/{}",
                "OK".green().bold(),
                namespace,
                group
            )?;
            Ok(())
        }
        Err(StoreError::NotFound) => Err(CliError::user(format!(
            "rule group {}/{} does not exist",
            namespace, group
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Parse rule files without contacting the ruler.
pub fn run_lint(files: &FileArgs, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "{} Checking {} rule file(s)...",
        "=>".blue().bold(),
        files.files.len()
    )?;

    let namespaces = parse_files(&files.files, &parse_options(files))?;

    let mut groups = 0;
    let mut rules = 0;
    for namespace in &namespaces {
        for group in &namespace.groups {
            groups += 1;
            rules += group.rules.len();
            writeln!(
                out,
                "   {} {}/{} ({} rules)",
                "+".green(),
                namespace.name,
                group.name,
                group.rules.len()
            )?;
        }
    }

    writeln!(
        out,
        "{} {} namespace(s), {} group(s), {} rule(s)",
        "OK".green().bold(),
        namespaces.len(),
        groups,
        rules
    )?;
    Ok(())
}
