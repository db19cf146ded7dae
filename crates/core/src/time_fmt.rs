// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact elapsed-time formatting for status output.

/// Format seconds as the largest whole unit: `"42s"`, `"5m"`, `"3h"`, `"2d"`.
pub fn format_elapsed(secs: u64) -> String {
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s => format!("{}d", s / 86_400),
    }
}

/// Like [`format_elapsed`] for a millisecond duration.
pub fn format_elapsed_ms(ms: u64) -> String {
    format_elapsed(ms / 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        zero    = { 0,       "0s" },
        seconds = { 59,      "59s" },
        minute  = { 60,      "1m" },
        hours   = { 7_200,   "2h" },
        days    = { 259_200, "3d" },
    )]
    fn elapsed(secs: u64, expected: &str) {
        assert_eq!(format_elapsed(secs), expected);
    }

    #[test]
    fn elapsed_ms_truncates() {
        assert_eq!(format_elapsed_ms(1_999), "1s");
    }
}
