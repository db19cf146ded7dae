// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol between the kiln daemon, its CLI and build workers.
//!
//! Frame format: 4-byte length prefix (big-endian), 1-byte encoding tag,
//! then the payload. Payloads are JSON, optionally zstd-compressed.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod frame;
mod request;
mod response;
mod status;

pub use codec::{decode, decode_status, encode, Encoding};
pub use frame::{
    read_frame, read_message, read_message_timeout, write_frame, write_message,
    write_message_timeout, ProtocolError, MAX_FRAME_LEN,
};
pub use request::{PlanUnit, Request};
pub use response::{JobSummary, Response};
pub use status::BuildStatusResponse;

/// Protocol version exchanged in `Hello`.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
#[path = "messages_tests.rs"]
mod messages_tests;
