// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Each connection carries one request and one response. The response is
//! written in the encoding the request arrived in.

use std::collections::BTreeMap;
use std::sync::Arc;

use kiln_adapters::{ArtifactCache, Fingerprint};
use kiln_core::Clock;
use kiln_engine::{Distributor, JobRegistry, RegistryError, WorkUnit};
use kiln_wire::{
    read_message_timeout, write_message_timeout, Encoding, JobSummary, ProtocolError, Request,
    Response, PROTOCOL_VERSION,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::env::ipc_timeout;

/// Shared daemon context for all request handlers.
pub struct ListenCtx<C: Clock, A: ArtifactCache> {
    pub registry: Arc<JobRegistry<C>>,
    pub distributor: Distributor<A>,
    pub shutdown: Arc<Notify>,
}

impl<C: Clock, A: ArtifactCache> ListenCtx<C, A> {
    pub fn new(registry: Arc<JobRegistry<C>>, cache: A, shutdown: Arc<Notify>) -> Self {
        Self { registry, distributor: Distributor::new(cache), shutdown }
    }
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Listener task for accepting socket connections.
pub struct Listener<C: Clock, A: ArtifactCache> {
    unix: UnixListener,
    ctx: Arc<ListenCtx<C, A>>,
}

impl<C: Clock, A: ArtifactCache> Listener<C, A> {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx<C, A>>) -> Self {
        Self { unix, ctx }
    }

    /// Accept connections until `token` is cancelled, one task per connection.
    pub async fn run(self, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => {
                        let ctx = Arc::clone(&self.ctx);
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            if let Err(e) = handle_connection(reader, writer, &ctx).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!("Unix accept error: {}", e),
                },
            }
        }
        debug!("listener stopped");
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => debug!("Client disconnected"),
        ConnectionError::Protocol(ProtocolError::Timeout) => warn!("Connection timeout"),
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection.
///
/// The handler races client disconnect detection; a client that hangs up
/// first gets no response and the handler is dropped.
pub async fn handle_connection<R, W, C, A>(
    mut reader: R,
    mut writer: W,
    ctx: &ListenCtx<C, A>,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    C: Clock,
    A: ArtifactCache,
{
    let (request, encoding): (Request, Encoding) =
        read_message_timeout(&mut reader, ipc_timeout()).await?;

    // Status polling is frequent
    if matches!(request, Request::Status { .. } | Request::ListJobs | Request::Ping) {
        debug!(request = ?request, %encoding, "received query");
    } else {
        info!(request = ?request, %encoding, "received request");
    }

    let response = tokio::select! {
        response = handle_request(request, ctx) => response,
        _ = detect_client_disconnect(&mut reader) => {
            debug!("Client disconnected, cancelling handler");
            return Ok(());
        }
    };

    debug!("Sending response: {:?}", response);
    write_message_timeout(&mut writer, &response, encoding, ipc_timeout()).await?;

    // Signal only once the client has its answer
    if response == Response::ShuttingDown {
        ctx.shutdown.notify_one();
    }
    Ok(())
}

/// Completes when the client closes its end (reads return EOF).
async fn detect_client_disconnect<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

/// Handle a single request and return a response.
pub async fn handle_request<C: Clock, A: ArtifactCache>(
    request: Request,
    ctx: &ListenCtx<C, A>,
) -> Response {
    let registry = &ctx.registry;
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::CreateJob => match registry.create_job() {
            Ok(id) => Response::JobCreated { id },
            Err(e) => reject(e),
        },

        Request::Distribute { id, units, workers } => {
            let Some(coordinator) = registry.get(&id) else {
                return reject(RegistryError::UnknownJob(id));
            };
            let plan: Vec<WorkUnit> = units
                .into_iter()
                .map(|unit| WorkUnit::new(unit.target, Fingerprint::new(unit.fingerprint)))
                .collect();
            match ctx.distributor.distribute(&coordinator, &plan, &workers).await {
                Ok(summary) => Response::Distributed {
                    cached: summary.cached.len(),
                    assignments: summary
                        .assignments
                        .iter()
                        .map(|(worker, targets)| (worker.clone(), targets.len()))
                        .collect::<BTreeMap<_, _>>(),
                },
                Err(e) => Response::Rejected { reason: e.to_string() },
            }
        }

        Request::Report { id, worker, report } => match registry.ingest(&id, &worker, &report) {
            Ok(phase) => Response::Accepted { phase },
            Err(e) => reject(e),
        },

        Request::Cancel { id, reason } => match registry.cancel(&id, reason) {
            Ok(()) => Response::Ok,
            Err(e) => reject(e),
        },

        Request::Status { id } => Response::Status(registry.snapshot(&id)),

        Request::ListJobs => Response::Jobs {
            jobs: registry.list().iter().map(|job| JobSummary::from(job.as_ref())).collect(),
        },

        Request::Shutdown => Response::ShuttingDown,
    }
}

/// Unknown jobs and capacity are errors; everything else leaves the job
/// untouched and is a rejection.
fn reject(e: RegistryError) -> Response {
    match e {
        RegistryError::UnknownJob(_) | RegistryError::Exhausted { .. } => {
            Response::Error { message: e.to_string() }
        }
        _ => Response::Rejected { reason: e.to_string() },
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
