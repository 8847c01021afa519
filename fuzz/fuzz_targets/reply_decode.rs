//! Fuzz target for booking reply bodies
//!
//! Arbitrary HTTP response bodies through the create and cancel reply
//! decoders. Bodies come from an untrusted backend.
//!
//! The fuzzer should NEVER panic on malformed JSON.

#![no_main]

use libfuzzer_sys::fuzz_target;
use taxi_proto::{CancelBookingReply, CreateBookingReply};

fuzz_target!(|data: &[u8]| {
    let _ = CreateBookingReply::from_json(data);

    let _ = CancelBookingReply::from_json(data);
});
