//! Fuzz target: inbound lamp-command handling
//!
//! Feeds arbitrary topic/payload bytes through `InboundMessage::new` and
//! `LampCommand::parse`, asserting that parsing never panics and that only
//! the two exact payloads are accepted.
//!
//! cargo fuzz run fuzz_lamp_command

#![no_main]

use libfuzzer_sys::fuzz_target;
use lightnode::app::commands::{InboundMessage, LampCommand, MAX_PAYLOAD_LEN};

fuzz_target!(|data: &[u8]| {
    let split = data.first().map_or(0, |b| usize::from(*b)).min(data.len());
    let (topic, payload) = data.split_at(split);
    let topic = core::str::from_utf8(topic).unwrap_or("nelson_iot/led_cmd");

    match InboundMessage::new(topic, payload) {
        Some(msg) => {
            assert!(msg.payload.len() <= MAX_PAYLOAD_LEN);
            if let Some(cmd) = LampCommand::parse(&msg.payload) {
                let expected: &[u8] = match cmd {
                    LampCommand::On => b"ON",
                    LampCommand::Off => b"OFF",
                };
                assert_eq!(msg.payload.as_slice(), expected);
            }
        }
        None => assert!(payload.len() > MAX_PAYLOAD_LEN || topic.len() > 64),
    }
});
