use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Resource path policy resolver.
///
/// Loads a ruleset document and reports what the resolver decides for
/// resource paths.
#[derive(Parser, Debug)]
#[command(name = "pathgate", version, about = "Resolve resource paths against a ruleset")]
pub struct CliArgs {
    /// Path to the ruleset document (YAML or JSON)
    #[arg(long, env = "PATHGATE_RULES")]
    pub rules: PathBuf,

    /// Application id (overrides the document's app_id)
    #[arg(long, env = "PATHGATE_APP_ID")]
    pub app_id: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve one or more resource paths
    Resolve {
        /// Resource paths to resolve
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// List registered rules and counters
    Show,
}
