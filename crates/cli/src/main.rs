// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kiln: build ownership queries and distributed build jobs.

mod client;
mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};

use crate::commands::{audit, daemon, job};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "kiln", version, about = "Build ownership queries and distributed builds")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query target ownership and build files
    Audit(audit::AuditArgs),
    /// Create, inspect and cancel build jobs
    Job(job::JobArgs),
    /// Manage the kilnd daemon
    Daemon(daemon::DaemonArgs),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Audit(args) => audit::audit(args, cli.output),
        Commands::Job(args) => job::job(args, cli.output).await,
        Commands::Daemon(args) => daemon::daemon(args, cli.output).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(exit_error::exit_code(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn audit_owner_parses_flags() {
        let cli = Cli::try_parse_from([
            "kiln", "audit", "owner", "--graph", "g.toml", "--json", "--full", "a.java", "b.java",
        ])
        .unwrap();
        let Commands::Audit(audit::AuditArgs { command: audit::AuditCommand::Owner(args) }) =
            cli.command
        else {
            panic!("expected audit owner");
        };
        assert!(args.json && args.full);
        assert_eq!(args.paths, ["a.java", "b.java"]);
    }

    #[test]
    fn output_flag_reaches_audit() {
        let cli = Cli::try_parse_from([
            "kiln", "audit", "owner", "-g", "g.toml", "--full", "a.java", "-o", "json",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn output_flag_is_global() {
        let cli = Cli::try_parse_from(["kiln", "job", "list", "-o", "json"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
    }
}
