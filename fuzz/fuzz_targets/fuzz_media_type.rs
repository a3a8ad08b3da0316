//! Fuzz target for media type resolution.
//!
//! Tests that registry lookups and content negotiation handle arbitrary
//! media types and `Accept` headers without panicking.

#![no_main]

use arbor_core::{Method, Request};
use arbor_mime::{JsonProcessor, MimeRegistry};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    let mut registry = MimeRegistry::new();
    registry.register(Arc::new(JsonProcessor::new()), Some(&["application/json", "text/*"]));

    let _ = registry.resolve(&input);
    let _ = registry.resolve_with_type(&input);

    let request = Request::builder(Method::Get, "/")
        .header("Accept", input.to_string())
        .build();
    let _ = registry.negotiate(request.accepted_types());
});
