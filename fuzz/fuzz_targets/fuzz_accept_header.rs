//! Fuzz target for `Accept` header parsing.
//!
//! Tests that the preference parser handles arbitrary input without panicking
//! and always yields at least one media type.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let header = String::from_utf8_lossy(data);
    let types = arbor_core::parse_accept(&header);

    // An empty or fully rejected header still accepts something
    assert!(!types.is_empty());
    for media_type in &types {
        assert!(!media_type.is_empty());
        assert_eq!(media_type, &media_type.to_ascii_lowercase());
    }
});
