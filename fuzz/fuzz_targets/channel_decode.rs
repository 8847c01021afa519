//! Fuzz target for ChannelMessage::decode
//!
//! This fuzzer feeds arbitrary text to the Phoenix frame decoder to find:
//! - Parser crashes or panics
//! - Frames that decode but cannot be re-encoded
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use taxi_proto::{ChannelMessage, PushEvent};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(message) = ChannelMessage::decode(text) else {
        return;
    };

    // Anything we accept we can send back
    let encoded = message.encode().expect("decoded frame must re-encode");
    let again = ChannelMessage::decode(&encoded).expect("re-encoded frame must decode");
    assert_eq!(again.topic, message.topic);
    assert_eq!(again.event, message.event);

    let _ = message.reply();
    let _ = PushEvent::from_message(&message);
});
