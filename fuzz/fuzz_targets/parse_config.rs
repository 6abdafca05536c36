//! Fuzz harness for harness configuration documents
//!
//! This harness tests the robustness of the document decode path and the
//! name filter against malformed input.
//! Target: configuration JSON + harness identifiers

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    // Ensure the input is valid UTF-8
    let input = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return, // Skip non-UTF-8 input
    };

    // Decoding may fail - we just want to ensure it doesn't panic.
    if let Ok(doc) = serde_json::from_str::<Value>(input) {
        // Anything that decoded must resolve the standard command paths
        // without panicking, found or not.
        let _ = harnman_fieldpath::get(&doc, "fuzz.fuzz_cmd");
        let _ = harnman_fieldpath::get(&doc, "build.build_cmd");
        let _ = harnman_fieldpath::get(&doc, "coverage.coverage_cmd");
    }

    // The name filter is total over arbitrary strings.
    let _ = harnman_name::is_valid(input);
});
