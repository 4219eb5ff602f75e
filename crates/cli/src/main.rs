mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use pathgate_rules::PathResolver;

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PATHGATE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let ruleset = config::load_ruleset(&args.rules)?;
    let resolver = config::build_resolver(&ruleset, args.app_id.as_deref())?;
    info!(app_id = %resolver.app_id(), rules = resolver.len(), "resolver ready");

    match &args.command {
        Command::Resolve { paths } => {
            for path in paths {
                print_json(&resolver.resolve_rules_for(path), args.pretty)?;
            }
        }
        Command::Show => print_json(&summary(&resolver), args.pretty)?,
    }
    Ok(())
}

fn summary(resolver: &PathResolver) -> serde_json::Value {
    let rules: Vec<_> = resolver
        .iter()
        .map(|(key, rule)| json!({ "key": key, "rule": rule }))
        .collect();
    json!({
        "app_id": resolver.app_id(),
        "counts": resolver.counts(),
        "rules": rules,
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")?;
    println!("{}", out);
    Ok(())
}
