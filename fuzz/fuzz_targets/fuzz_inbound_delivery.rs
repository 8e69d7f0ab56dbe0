//! Fuzz target: MQTT inbox under arbitrary deliveries
//!
//! Drives the inbox with arbitrary topics, payloads and link edges, then
//! drains it through the transport, verifying:
//! - No panics, including for oversized topics and payloads
//! - Never more than `INBOX_DEPTH` messages are buffered
//! - Every delivery is either buffered or counted as dropped
//!
//! cargo fuzz run fuzz_inbound_delivery

#![no_main]

use irrigator::adapters::mqtt::{MqttTransport, INBOX_DEPTH};
use irrigator::app::ports::{InboundMessage, TransportPort};
use irrigator::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut transport) = MqttTransport::connect(&SystemConfig::default(), "fuzz") else {
        return;
    };
    let inbox = transport.sim_inbox();

    let mut delivered = 0u32;
    let mut rest = data;
    while let Some((&op, tail)) = rest.split_first() {
        let len = usize::from(op >> 2).min(tail.len());
        let (chunk, next) = tail.split_at(len);
        rest = next;

        match op & 0b11 {
            0 => inbox.on_connected(),
            1 => inbox.on_disconnected(),
            _ => {
                let split = chunk.len() / 2;
                let topic = String::from_utf8_lossy(&chunk[..split]);
                inbox.on_message(&topic, &chunk[split..]);
                delivered += 1;
            }
        }
    }

    let mut buffered = 0u32;
    while let Some(msg) = transport.try_receive() {
        assert!(InboundMessage::new(&msg.topic, &msg.payload).is_some());
        buffered += 1;
    }
    assert!(buffered as usize <= INBOX_DEPTH);
    assert_eq!(buffered + inbox.dropped(), delivered);
});
