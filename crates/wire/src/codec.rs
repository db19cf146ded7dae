// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload encodings.
//!
//! The caller picks an [`Encoding`]; each one is a pure encode/decode pair
//! over serde. `Compact` is zstd-compressed JSON for large job states.

use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::frame::{ProtocolError, MAX_FRAME_LEN};
use crate::status::BuildStatusResponse;

/// zstd level for compact payloads
const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    #[default]
    Json,
    Compact,
}

impl Encoding {
    /// Byte identifying the encoding in a frame header.
    pub fn tag(self) -> u8 {
        match self {
            Encoding::Json => 1,
            Encoding::Compact => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, ProtocolError> {
        match tag {
            1 => Ok(Encoding::Json),
            2 => Ok(Encoding::Compact),
            other => Err(ProtocolError::UnknownEncoding(other)),
        }
    }
}

kiln_core::simple_display! {
    Encoding {
        Json => "json",
        Compact => "compact",
    }
}

pub fn encode<T: Serialize>(value: &T, encoding: Encoding) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(value)?;
    match encoding {
        Encoding::Json => Ok(json),
        Encoding::Compact => Ok(zstd::encode_all(json.as_slice(), COMPRESSION_LEVEL)?),
    }
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8], encoding: Encoding) -> Result<T, ProtocolError> {
    match encoding {
        Encoding::Json => Ok(serde_json::from_slice(bytes)?),
        Encoding::Compact => {
            // Bound the inflated size, not just the frame
            let mut json = Vec::new();
            zstd::stream::read::Decoder::new(bytes)?
                .take(MAX_FRAME_LEN as u64 + 1)
                .read_to_end(&mut json)?;
            if json.len() > MAX_FRAME_LEN {
                return Err(ProtocolError::TooLarge { size: json.len(), max: MAX_FRAME_LEN });
            }
            Ok(serde_json::from_slice(&json)?)
        }
    }
}

/// Decode a status envelope and check the job inside it.
pub fn decode_status(bytes: &[u8], encoding: Encoding) -> Result<BuildStatusResponse, ProtocolError> {
    let status: BuildStatusResponse = decode(bytes, encoding)?;
    status.validate()?;
    Ok(status)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
