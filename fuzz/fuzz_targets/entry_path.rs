//! Fuzz target for EntryPath::new with arbitrary string input.
//!
//! This target exercises path validation with malformed or adversarial path
//! strings, as found in zip, pak and tar directories.
//!
//! Run with: cargo +nightly fuzz run entry_path
//!
//! Properties checked on every accepted path:
//! - No `.` or `..` segments
//! - Not absolute, no backslashes
//! - No empty segments or NUL bytes
//! - Parsing is idempotent

#![no_main]

use arcmgr::EntryPath;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(path) = EntryPath::new(input) else {
        return;
    };
    let normalized = path.as_str();

    assert!(!normalized.starts_with('/'), "absolute path accepted: {:?}", normalized);
    assert!(!normalized.contains('\\'), "backslash kept: {:?}", normalized);
    assert!(!normalized.contains('\0'), "NUL byte accepted: {:?}", normalized);
    for segment in path.components() {
        assert!(!segment.is_empty(), "empty segment in {:?}", normalized);
        assert!(segment != "." && segment != "..", "dot segment in {:?}", normalized);
    }

    let reparsed = EntryPath::new(normalized).expect("normalized path must reparse");
    assert_eq!(reparsed, path);
});
