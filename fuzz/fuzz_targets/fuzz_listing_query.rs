//! Fuzz target for listing query parameters.
//!
//! Tests that offset/limit/sort/search/expand parsing handles arbitrary query
//! strings without panicking and never exceeds the configured limit cap.

#![no_main]

use arbor_core::{Method, Request};
use arbor_dispatch::ListingQuery;
use libfuzzer_sys::fuzz_target;

const MAX_LIMIT: usize = 50;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let request = Request::builder(Method::Get, "/items/").query_string(raw).build();

    if let Ok(query) = ListingQuery::from_request(&request, Some(MAX_LIMIT)) {
        assert!(query.limit.is_some_and(|limit| limit <= MAX_LIMIT));
    }
    let _ = ListingQuery::from_request(&request, None);
});
