//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rulesync_client::ConfigLayer;
use rulesync_model::PromDuration;

/// rulesync - keep Cortex ruler rule groups in line with rule files
#[derive(Parser, Debug)]
#[command(name = "rulesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// View and edit rule groups stored in the ruler
    Rules {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(subcommand)]
        action: RulesAction,
    },
}

/// Where and how to reach the ruler
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    /// TOML file with address, tenant_id, api_key and timeout
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address of the Cortex cluster
    #[arg(long, global = true, env = "CORTEX_ADDRESS")]
    pub address: Option<String>,

    /// Tenant id, sent as X-Scope-OrgID
    #[arg(long = "id", global = true, env = "CORTEX_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// API key, sent as the basic-auth password
    #[arg(long, global = true, env = "CORTEX_API_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Per-request timeout, e.g. 10s
    #[arg(long, global = true, value_name = "DURATION")]
    pub request_timeout: Option<PromDuration>,
}

impl ConnectionArgs {
    /// Settings given on the command line or through the environment
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            address: self.address.clone(),
            tenant_id: self.tenant_id.clone(),
            api_key: self.key.clone(),
            timeout: self.request_timeout,
        }
    }
}

/// Rule group operations
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RulesAction {
    /// List namespaces and rule group names
    List,

    /// Print every rule group as YAML
    Print,

    /// Print one rule group as YAML
    Get {
        /// Namespace of the group
        namespace: String,
        /// Name of the group
        group: String,
    },

    /// Delete one rule group
    Delete {
        /// Namespace of the group
        namespace: String,
        /// Name of the group
        group: String,
    },

    /// Create or update rule groups from files
    ///
    /// Each group is compared with the ruler's copy and written only when it
    /// is missing or differs. The first failure stops the run.
    ///
    /// Examples:
    ///   rulesync rules load team-a.yaml team-b.yaml
    ///   rulesync rules load --dry-run rules/*.yaml
    Load(LoadArgs),

    /// Show how the ruler differs from the files without writing
    Diff {
        #[command(flatten)]
        files: FileArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check rule files offline
    Lint {
        #[command(flatten)]
        files: FileArgs,
    },
}

/// Rule files and namespace fallback
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct FileArgs {
    /// Rule files to read
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Namespace for documents without a `namespace` key
    #[arg(long, value_name = "NAMESPACE")]
    pub default_namespace: Option<String>,
}

/// Options for `rules load`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LoadArgs {
    #[command(flatten)]
    pub files: FileArgs,

    /// Report what would be created or updated without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Abort groups not started within this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Write load timestamps to this Prometheus textfile
    #[arg(long, value_name = "PATH")]
    pub metrics_file: Option<PathBuf>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn rules(args: &[&str]) -> (ConnectionArgs, RulesAction) {
        let cli = Cli::parse_from(args);
        let Commands::Rules { connection, action } = cli.command;
        (connection, action)
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_list() {
        let (_, action) = rules(&["rulesync", "rules", "list"]);
        assert_eq!(action, RulesAction::List);
    }

    #[test]
    fn parse_connection_after_action() {
        let (connection, action) = rules(&[
            "rulesync",
            "rules",
            "get",
            "team-a",
            "cpu-alerts",
            "--address",
            "http://cortex:9009",
            "--id",
            "team-a",
        ]);
        assert_eq!(connection.address.as_deref(), Some("http://cortex:9009"));
        assert_eq!(connection.tenant_id.as_deref(), Some("team-a"));
        assert_eq!(
            action,
            RulesAction::Get {
                namespace: "team-a".into(),
                group: "cpu-alerts".into()
            }
        );
    }

    #[test]
    fn parse_load_flags() {
        let (_, action) = rules(&[
            "rulesync",
            "rules",
            "load",
            "--dry-run",
            "--timeout",
            "30",
            "--default-namespace",
            "team-b",
            "a.yaml",
            "b.yaml",
        ]);
        let RulesAction::Load(args) = action else {
            panic!("expected load, got {action:?}");
        };
        assert!(args.dry_run);
        assert_eq!(args.timeout, Some(30));
        assert_eq!(args.files.default_namespace.as_deref(), Some("team-b"));
        assert_eq!(
            args.files.files,
            vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]
        );
    }

    #[test]
    fn parse_request_timeout_duration() {
        let (connection, _) = rules(&["rulesync", "rules", "--request-timeout", "1m30s", "list"]);
        assert_eq!(connection.request_timeout, Some(PromDuration::from_secs(90)));
    }

    #[test]
    fn load_requires_files() {
        assert!(Cli::try_parse_from(["rulesync", "rules", "load"]).is_err());
    }

    #[test]
    fn rejects_bad_request_timeout() {
        assert!(
            Cli::try_parse_from(["rulesync", "rules", "--request-timeout", "soon", "list"]).is_err()
        );
    }
}
