//! Fuzz target for the JSON codec.
//!
//! Tests that the JSON processor handles arbitrary request bodies without
//! panicking, and that anything it accepts can be written back out.

#![no_main]

use arbor_core::Processor;
use arbor_mime::JsonProcessor;
use futures::executor::block_on;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let processor = JsonProcessor::new();

    let Ok(representation) = block_on(processor.parse(data, "application/json")) else {
        return;
    };

    let response = block_on(processor.serialize(None, &representation, None))
        .expect("parsed representation should serialize");
    let body = response.body().expect("serialized response carries a body");
    let reparsed = block_on(processor.parse(body, "application/json"))
        .expect("serialized representation should parse");
    assert_eq!(representation.fields(), reparsed.fields());
});
