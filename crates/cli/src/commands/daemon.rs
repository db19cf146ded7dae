// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kiln daemon` - Daemon management commands

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon (foreground or background)
    Start {
        /// Run in foreground (useful for debugging)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon
    Stop,
    /// Check daemon status
    Status,
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Start { foreground } => start(foreground).await,
        DaemonCommand::Stop => stop().await,
        DaemonCommand::Status => status(format).await,
    }
}

async fn start(foreground: bool) -> Result<()> {
    let kilnd = find_kilnd_binary();
    if foreground {
        let status = Command::new(&kilnd).status()?;
        if !status.success() {
            return Err(anyhow!("Daemon exited with status: {}", status));
        }
        return Ok(());
    }

    if let Ok(client) = DaemonClient::connect() {
        if client.ping().await.is_ok() {
            println!("Daemon already running");
            return Ok(());
        }
    }

    let mut child = Command::new(&kilnd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| anyhow!("failed to start {}: {}", kilnd.display(), e))?;
    let stdout = child.stdout.take().ok_or_else(|| anyhow!("daemon stdout unavailable"))?;
    let mut line = String::new();
    BufReader::new(stdout).read_line(&mut line)?;
    if line.trim() != "READY" {
        let status = child.wait()?;
        return Err(anyhow!("Daemon failed to start ({}); see kilnd.log", status));
    }
    println!("Daemon started");
    Ok(())
}

async fn stop() -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(client) => client,
        Err(_) => {
            println!("Daemon not running");
            return Ok(());
        }
    };
    match client.shutdown().await {
        Ok(()) => println!("Daemon stopped"),
        Err(e) if e.is_not_running() => println!("Daemon not running"),
        Err(e) => return Err(anyhow!("Failed to stop daemon: {}", e)),
    }
    Ok(())
}

async fn status(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(client) => client,
        Err(_) => return print_not_running(format),
    };
    let version = match client.hello().await {
        Ok(version) => version,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(e) => return Err(anyhow!("{}", e)),
    };
    let jobs = client.list_jobs().await.map_err(|e| anyhow!("{}", e))?;
    let active = jobs.iter().filter(|job| !job.phase.is_terminal()).count();

    let obj = serde_json::json!({
        "status": "running",
        "version": version,
        "jobs": jobs.len(),
        "jobs_active": active,
    });
    format_or_json(format, &obj, || {
        println!("Status: running");
        println!("Version: {}", version);
        println!("Jobs: {} ({} active)", jobs.len(), active);
    })
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    format_or_json(format, &serde_json::json!({ "status": "not_running" }), || {
        println!("Daemon not running")
    })
}

/// `kilnd` next to the running executable, else from `PATH`.
fn find_kilnd_binary() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("kilnd")))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from("kilnd"))
}
