//! Fuzz harness for dotted field path traversal
//!
//! This harness drives get/set/delete with arbitrary paths over arbitrary
//! documents.
//! Target: harnman-fieldpath

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::{Value, json};

fuzz_target!(|data: &[u8]| {
    // Ensure the input is valid UTF-8
    let input = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return, // Skip non-UTF-8 input
    };

    // First line is the field path, the rest is the document.
    let (path, doc_text) = match input.split_once('\n') {
        Some(parts) => parts,
        None => (input, "{}"),
    };
    if path.is_empty() {
        return;
    }

    let mut doc: Value = serde_json::from_str(doc_text).unwrap_or_else(|_| json!({}));

    // get/delete may fail but must not panic.
    let _ = harnman_fieldpath::get(&doc, path);
    let _ = harnman_fieldpath::delete(&mut doc, path);

    // set is total, and what was set must be readable back.
    harnman_fieldpath::set(&mut doc, path, json!("sentinel"));
    let read_back = harnman_fieldpath::get(&doc, path).expect("set value must be readable");
    assert_eq!(read_back, &json!("sentinel"));
});
