// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kiln audit` - Ownership and build file queries

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use kiln_owners::{render, DiskFilesystem, OwnersError, OwnersResolver, ResolverConfig};

use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(Subcommand)]
pub enum AuditCommand {
    /// Show the targets that own each path
    Owner(OwnerArgs),
    /// Show the build file governing a path
    Buildfile(BuildfileArgs),
}

#[derive(Args)]
pub struct OwnerArgs {
    /// Target graph manifest (.toml or .json)
    #[arg(long, short = 'g')]
    pub graph: PathBuf,

    /// Repository root that relative paths are resolved against
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Print the owners map as JSON (same as `-o json`)
    #[arg(long)]
    pub json: bool,

    /// With JSON output, print every bucket instead of just the owners map
    #[arg(long)]
    pub full: bool,

    /// Guess the build file for inputs that no longer exist
    #[arg(long)]
    pub guess_for_deleted: bool,

    /// Build file name (overrides KILN_BUILD_FILE)
    #[arg(long)]
    pub build_file: Option<String>,

    /// Repository paths to look up
    pub paths: Vec<String>,
}

#[derive(Args)]
pub struct BuildfileArgs {
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Build file name (overrides KILN_BUILD_FILE)
    #[arg(long)]
    pub build_file: Option<String>,

    pub path: PathBuf,
}

pub fn audit(args: AuditArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        AuditCommand::Owner(args) => print!("{}", owner(&args, format)?),
        AuditCommand::Buildfile(args) => println!("{}", buildfile(&args)?.display()),
    }
    Ok(())
}

fn resolver_config(build_file: Option<&str>) -> ResolverConfig {
    match build_file {
        Some(name) => ResolverConfig::default().build_file_name(name),
        None => ResolverConfig::from_env(),
    }
}

/// Render the ownership report for `args`.
pub fn owner(args: &OwnerArgs, format: OutputFormat) -> Result<String> {
    let json = args.json || format == OutputFormat::Json;
    if args.full && !json {
        return Err(ExitError::usage("--full needs JSON output (--json or -o json)").into());
    }
    let graph = kiln_owners::load_graph(&args.graph)
        .with_context(|| format!("loading target graph {}", args.graph.display()))?;
    let fs = DiskFilesystem::new(&args.root);
    let resolver = OwnersResolver::with_config(&fs, resolver_config(args.build_file.as_deref()));

    // Bad input is a usage problem, not a failed lookup
    let report = resolver
        .resolve(&graph, &args.paths, args.guess_for_deleted)
        .map_err(|e: OwnersError| ExitError::usage(e.to_string()))?;

    let out = match (json, args.full) {
        (true, true) => render::full_json(&report)?,
        (true, false) => render::owners_json(&report)?,
        (false, _) => return Ok(render::text(&report)),
    };
    Ok(format!("{}\n", out))
}

/// The build file governing `args.path`, relative to the root when possible.
pub fn buildfile(args: &BuildfileArgs) -> Result<PathBuf> {
    let fs = DiskFilesystem::new(&args.root);
    let resolver = OwnersResolver::with_config(&fs, resolver_config(args.build_file.as_deref()));
    let found = resolver.find_enclosing_build_file(&args.path).ok_or_else(|| {
        ExitError::not_found(format!("no build file found for {}", args.path.display()))
    })?;
    Ok(relative_to(&found, &args.root))
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
