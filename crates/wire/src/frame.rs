// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Framing: `[u32 BE payload length][u8 encoding tag][payload]`.

use std::time::Duration;

use kiln_core::ValidationError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::{decode, encode, Encoding};

/// Largest payload accepted in one frame.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Errors that can occur in protocol communication
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("unknown encoding tag {0}")]
    UnknownEncoding(u8),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("timeout")]
    Timeout,

    #[error("invalid status: {0}")]
    Invalid(#[from] ValidationError),
}

/// Write one frame holding an already encoded payload.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    encoding: Encoding,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::TooLarge { size: payload.len(), max: MAX_FRAME_LEN });
    }
    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_u8(encoding.tag()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame, returning its encoding and raw payload.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<(Encoding, Vec<u8>), ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::TooLarge { size: len, max: MAX_FRAME_LEN });
    }
    let encoding = Encoding::from_tag(reader.read_u8().await?)?;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok((encoding, payload))
}

/// Encode `value` and write it as one frame.
pub async fn write_message<W: AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    value: &T,
    encoding: Encoding,
) -> Result<(), ProtocolError> {
    let payload = encode(value, encoding)?;
    write_frame(writer, encoding, &payload).await
}

/// Read one frame and decode it with the encoding its header names.
///
/// Returns the encoding too, so a server can answer in kind.
pub async fn read_message<R: AsyncRead + Unpin, T: DeserializeOwned>(
    reader: &mut R,
) -> Result<(T, Encoding), ProtocolError> {
    let (encoding, payload) = read_frame(reader).await?;
    Ok((decode(&payload, encoding)?, encoding))
}

/// [`read_message`] bounded by `timeout`.
pub async fn read_message_timeout<R: AsyncRead + Unpin, T: DeserializeOwned>(
    reader: &mut R,
    timeout: Duration,
) -> Result<(T, Encoding), ProtocolError> {
    tokio::time::timeout(timeout, read_message(reader)).await.map_err(|_| ProtocolError::Timeout)?
}

/// [`write_message`] bounded by `timeout`.
pub async fn write_message_timeout<W: AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    value: &T,
    encoding: Encoding,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    tokio::time::timeout(timeout, write_message(writer, value, encoding))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
