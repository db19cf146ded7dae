// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_core::{BuildId, BuildJob, BuildSlaveStatus, JobPhase, ValidationError, WorkerId};

fn big_job() -> BuildJob {
    let mut job = BuildJob::new(BuildId::from_string("bld-big"), 1);
    for i in 0..200 {
        let worker = WorkerId::new(format!("worker-{:03}", i));
        job.slaves.insert(worker.clone(), BuildSlaveStatus::new(worker, Default::default(), 1));
    }
    job.phase = JobPhase::Distributing;
    job
}

#[yare::parameterized(
    json    = { Encoding::Json },
    compact = { Encoding::Compact },
)]
fn status_decodes_in_either_encoding(encoding: Encoding) {
    let status = BuildStatusResponse::of(big_job());
    let bytes = encode(&status, encoding).unwrap();
    assert_eq!(decode_status(&bytes, encoding).unwrap(), status);
}

#[test]
fn json_encoding_is_plain_json() {
    let bytes = encode(&BuildStatusResponse::empty(), Encoding::Json).unwrap();
    assert_eq!(bytes, b"{}");
}

#[test]
fn compact_encoding_shrinks_repetitive_state() {
    let status = BuildStatusResponse::of(big_job());
    let json = encode(&status, Encoding::Json).unwrap();
    let compact = encode(&status, Encoding::Compact).unwrap();
    assert!(compact.len() < json.len() / 2, "{} vs {}", compact.len(), json.len());
}

#[test]
fn mismatched_encoding_fails() {
    let bytes = encode(&BuildStatusResponse::empty(), Encoding::Json).unwrap();
    assert!(decode::<BuildStatusResponse>(&bytes, Encoding::Compact).is_err());
}

#[test]
fn compact_payload_inflating_past_frame_limit_is_rejected() {
    let oversized = "x".repeat(MAX_FRAME_LEN + 1024);
    let bytes = encode(&oversized, Encoding::Compact).unwrap();
    assert!(bytes.len() < MAX_FRAME_LEN);

    let err = decode::<String>(&bytes, Encoding::Compact).unwrap_err();
    assert!(matches!(err, ProtocolError::TooLarge { max: MAX_FRAME_LEN, .. }), "{:?}", err);
}

#[test]
fn decode_status_rejects_inconsistent_job() {
    let json = br#"{"buildJob":{"id":"","phase":"created","created_at_ms":1}}"#;
    let err = decode_status(json, Encoding::Json).unwrap_err();
    assert!(matches!(err, ProtocolError::Invalid(ValidationError::EmptyId)));
}

#[yare::parameterized(
    json    = { Encoding::Json },
    compact = { Encoding::Compact },
)]
fn tags_round_trip(encoding: Encoding) {
    assert_eq!(Encoding::from_tag(encoding.tag()).unwrap(), encoding);
}

#[test]
fn unknown_tag_is_rejected() {
    assert!(matches!(Encoding::from_tag(9), Err(ProtocolError::UnknownEncoding(9))));
}
