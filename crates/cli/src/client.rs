// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the kilnd socket.

use std::path::{Path, PathBuf};
use std::time::Duration;

use kiln_core::BuildId;
use kiln_daemon::env::ipc_timeout;
use kiln_daemon::Config;
use kiln_wire::{
    read_message_timeout, write_message_timeout, BuildStatusResponse, Encoding, JobSummary,
    ProtocolError, Request, Response,
};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running (no socket at {0})")]
    DaemonNotRunning(PathBuf),

    #[error("could not determine state directory: {0}")]
    Config(#[from] kiln_daemon::LifecycleError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Rejected(String),

    #[error("daemon error: {0}")]
    Daemon(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ClientError {
    /// The daemon is absent or went away mid-request.
    pub fn is_not_running(&self) -> bool {
        match self {
            ClientError::DaemonNotRunning(_) => true,
            ClientError::Protocol(ProtocolError::ConnectionClosed) => true,
            ClientError::Protocol(ProtocolError::Io(e)) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::NotFound
            ),
            _ => false,
        }
    }
}

/// One request per connection, answered in the same encoding.
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
    encoding: Encoding,
}

impl DaemonClient {
    /// Client for the user-level daemon. Fails when no socket exists.
    pub fn connect() -> Result<Self, ClientError> {
        let config = Config::load()?;
        Self::at(&config.socket_path)
    }

    pub fn at(socket_path: &Path) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning(socket_path.to_path_buf()));
        }
        Ok(Self {
            socket_path: socket_path.to_path_buf(),
            timeout: ipc_timeout(),
            encoding: Encoding::Json,
        })
    }

    /// Ask for compressed payloads; useful for large job states.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(ProtocolError::Io)?;
        let (mut reader, mut writer) = stream.into_split();
        write_message_timeout(&mut writer, request, self.encoding, self.timeout).await?;
        let (response, _): (Response, Encoding) =
            read_message_timeout(&mut reader, self.timeout).await?;
        Ok(response)
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Rejected { reason } => Err(ClientError::Rejected(reason)),
            Response::Error { message } => Err(ClientError::Daemon(message)),
            other => Err(ClientError::Unexpected(format!("{:?}", other))),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: kiln_wire::PROTOCOL_VERSION.to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn create_job(&self) -> Result<BuildId, ClientError> {
        match self.send(&Request::CreateJob).await? {
            Response::JobCreated { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self, id: BuildId) -> Result<BuildStatusResponse, ClientError> {
        match self.send(&Request::Status { id }).await? {
            Response::Status(status) => Ok(status),
            other => Self::reject(other),
        }
    }

    pub async fn cancel(&self, id: BuildId, reason: Option<String>) -> Result<(), ClientError> {
        match self.send(&Request::Cancel { id, reason }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>, ClientError> {
        match self.send(&Request::ListJobs).await? {
            Response::Jobs { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
