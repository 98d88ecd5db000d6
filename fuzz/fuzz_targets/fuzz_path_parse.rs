#![no_main]
// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz target for path parsing.
//!
//! Arbitrary text must either parse or produce an error positioned inside
//! the input, and parsing twice must agree.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_path_parse

use libfuzzer_sys::fuzz_target;
use quarry::JsonPath;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    match JsonPath::parse(text) {
        Ok(path) => {
            let again = JsonPath::parse(text).expect("second parse of accepted path failed");
            assert_eq!(path.filters(), again.filters());
        }
        Err(err) => {
            assert!(
                err.position() <= text.len(),
                "error position {} past end of {:?}",
                err.position(),
                text
            );
            assert!(JsonPath::parse(text).is_err());
        }
    }
});
