#![no_main]
// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz target for selection.
//!
//! Input is split at the first newline into a path and a JSON document.
//! Selection must not panic, must be repeatable, and lenient selection must
//! never report a no-match error.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_path_select

use libfuzzer_sys::fuzz_target;
use quarry::{Error, JsonPath, Settings};
use serde_json::Value;
use std::time::Duration;

const MAX_RESULTS: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Some((path_text, doc_text)) = text.split_once('\n') else {
        return;
    };
    let Ok(path) = JsonPath::parse(path_text) else {
        return;
    };
    let Ok(doc) = serde_json::from_str::<Value>(doc_text) else {
        return;
    };

    let lenient = Settings::new().with_regex_match_timeout(Duration::from_secs(1));
    let first: Vec<_> = path.select(&doc, &lenient).take(MAX_RESULTS).collect();
    let second: Vec<_> = path.select(&doc, &lenient).take(MAX_RESULTS).collect();
    assert_eq!(first.len(), second.len());

    for item in &first {
        if let Err(err) = item {
            assert!(
                matches!(
                    err,
                    Error::StepZero | Error::RegexTimeout { .. } | Error::InvalidRegex { .. }
                ),
                "lenient selection raised {err:?}"
            );
        }
    }

    let strict = lenient.with_error_when_no_match(true);
    let _ = path.select(&doc, &strict).take(MAX_RESULTS).count();
});
