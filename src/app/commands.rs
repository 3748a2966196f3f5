//! Inbound commands to the node service.
//!
//! The transport queues raw [`InboundMessage`]s; the control loop turns
//! the ones addressed to the lamp-command topic into [`LampCommand`]s.

/// Largest payload kept from an inbound message. Anything longer cannot be
/// a lamp command and is dropped at the transport.
pub const MAX_PAYLOAD_LEN: usize = 64;

/// A message received from the broker, queued for the control loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: heapless::String<64>,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD_LEN>,
}

impl InboundMessage {
    /// `None` if the topic or payload exceed the fixed capacities.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = heapless::String::new();
        t.push_str(topic).ok()?;
        let p = heapless::Vec::from_slice(payload).ok()?;
        Some(Self {
            topic: t,
            payload: p,
        })
    }
}

/// Lamp commands accepted on the command topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampCommand {
    On,
    Off,
}

impl LampCommand {
    /// Exactly `ON` or `OFF`, case-sensitive. Anything else is `None`.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        match payload {
            b"ON" => Some(Self::On),
            b"OFF" => Some(Self::Off),
            _ => None,
        }
    }
}
