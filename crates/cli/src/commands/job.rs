// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kiln job` - Distributed build jobs

use anyhow::Result;
use clap::{Args, Subcommand};
use kiln_core::BuildId;
use kiln_wire::Encoding;

use crate::client::{ClientError, DaemonClient};
use crate::exit_error::ExitError;
use crate::output::{format_or_json, job_text, jobs_table, now_ms, OutputFormat};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Register a new build job
    Create,
    /// Show a job's state
    Status {
        /// Job ID
        id: String,
    },
    /// Cancel a job
    Cancel {
        id: String,
        /// Reason recorded on the job
        #[arg(long)]
        reason: Option<String>,
    },
    /// List jobs
    List,
}

pub async fn job(args: JobArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(client_error)?;
    match args.command {
        JobCommand::Create => {
            let id = client.create_job().await.map_err(client_error)?;
            format_or_json(format, &serde_json::json!({ "id": id }), || println!("{}", id))
        }
        JobCommand::Status { id } => {
            let id = BuildId::from_string(id);
            // Job states with many workers compress well
            let client = client.with_encoding(Encoding::Compact);
            let status = client.status(id.clone()).await.map_err(client_error)?;
            let Some(job) = status.build_job.as_ref() else {
                return Err(ExitError::not_found(format!("job not found: {}", id)).into());
            };
            format_or_json(format, &status, || print!("{}", job_text(job)))
        }
        JobCommand::Cancel { id, reason } => {
            let id = BuildId::from_string(id);
            client.cancel(id.clone(), reason).await.map_err(client_error)?;
            format_or_json(format, &serde_json::json!({ "cancelled": id }), || {
                println!("Cancelled {}", id)
            })
        }
        JobCommand::List => {
            let jobs = client.list_jobs().await.map_err(client_error)?;
            format_or_json(format, &jobs, || print!("{}", jobs_table(&jobs, now_ms())))
        }
    }
}

/// Map client failures onto exit codes.
pub(crate) fn client_error(e: ClientError) -> anyhow::Error {
    if e.is_not_running() {
        ExitError::unavailable(e.to_string()).into()
    } else {
        e.into()
    }
}
