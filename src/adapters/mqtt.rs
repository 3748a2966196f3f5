//! MQTT broker session adapter.
//!
//! Implements [`TransportPort`]. Inbound messages are never handled in the
//! client's event callback: they are copied into a bounded
//! [`embassy_sync::channel::Channel`] and drained by the control loop via
//! [`TransportPort::try_receive`].
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` with a receiver thread
//!   feeding a static channel. Each session owns its [`SessionState`], so
//!   a receiver thread left over from a replaced client cannot mark the
//!   current session as down.
//! - **all other targets**: [`SimMqttTransport`], an in-memory broker that
//!   records publishes and lets tests inject messages and failures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embassy_sync::channel::Channel;

/// Inbound messages buffered between two loop iterations.
pub const INBOX_DEPTH: usize = 8;

/// Connected flag of one broker session, shared between the transport and
/// that session's receiver. A new session gets a new flag.
#[derive(Debug, Clone, Default)]
pub struct SessionState(Arc<AtomicBool>);

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, up: bool) {
        self.0.store(up, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp_impl {
    use core::fmt::Write;

    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
    };
    use log::{info, warn};

    use super::{Channel, SessionState, INBOX_DEPTH};
    use crate::app::commands::{InboundMessage, MAX_PAYLOAD_LEN};
    use crate::app::ports::TransportPort;
    use crate::error::CommsError;

    static INBOX: Channel<CriticalSectionRawMutex, InboundMessage, INBOX_DEPTH> = Channel::new();

    const CONNECT_TIMEOUT_MS: u32 = 10_000;
    const CONNECT_POLL_MS: u32 = 50;

    struct Session {
        client: EspMqttClient<'static>,
        state: SessionState,
    }

    pub struct MqttTransport {
        url: heapless::String<96>,
        session: Option<Session>,
    }

    impl MqttTransport {
        pub fn new(host: &str, port: u16) -> Self {
            let mut url = heapless::String::new();
            let _ = write!(url, "mqtt://{}:{}", host, port);
            Self { url, session: None }
        }

        fn spawn_receiver(mut conn: EspMqttConnection, state: SessionState) -> Result<(), CommsError> {
            std::thread::Builder::new()
                .name("mqtt-rx".into())
                .stack_size(6 * 1024)
                .spawn(move || {
                    while let Ok(event) = conn.next() {
                        match event.payload() {
                            EventPayload::Connected(_) => state.set_connected(true),
                            EventPayload::Disconnected => state.set_connected(false),
                            EventPayload::Received {
                                topic: Some(topic),
                                data,
                                details: Details::Complete,
                                ..
                            } => {
                                if data.len() > MAX_PAYLOAD_LEN {
                                    warn!("MQTT: dropping {} byte payload on {}", data.len(), topic);
                                    continue;
                                }
                                match InboundMessage::new(topic, data) {
                                    Some(msg) => {
                                        if INBOX.try_send(msg).is_err() {
                                            warn!("MQTT: inbox full, dropping message on {}", topic);
                                        }
                                    }
                                    None => warn!("MQTT: topic too long, dropping message"),
                                }
                            }
                            _ => {}
                        }
                    }
                    // The connection ends when its client is dropped.
                    state.set_connected(false);
                })
                .map(|_| ())
                .map_err(|_| CommsError::MqttConnectFailed)
        }
    }

    impl TransportPort for MqttTransport {
        fn connect(&mut self, client_id: &str) -> Result<(), CommsError> {
            self.session = None;

            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                ..Default::default()
            };
            let (client, conn) = EspMqttClient::new(self.url.as_str(), &conf)
                .map_err(|_| CommsError::MqttConnectFailed)?;
            let state = SessionState::new();
            Self::spawn_receiver(conn, state.clone())?;

            let mut waited = 0;
            while !state.is_connected() {
                if waited >= CONNECT_TIMEOUT_MS {
                    return Err(CommsError::MqttConnectFailed);
                }
                FreeRtos::delay_ms(CONNECT_POLL_MS);
                waited += CONNECT_POLL_MS;
            }
            info!("MQTT: session up on {}", self.url);
            self.session = Some(Session { client, state });
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.session.as_ref().is_some_and(|s| s.state.is_connected())
        }

        /// The ESP-IDF client services keep-alive on its own task.
        fn pump(&mut self) {}

        fn try_receive(&mut self) -> Option<InboundMessage> {
            INBOX.try_receive().ok()
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
            let session = self.session.as_mut().ok_or(CommsError::MqttPublishFailed)?;
            session
                .client
                .publish(topic, QoS::AtMostOnce, false, payload)
                .map(|_| ())
                .map_err(|_| CommsError::MqttPublishFailed)
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
            let session = self.session.as_mut().ok_or(CommsError::MqttSubscribeFailed)?;
            session
                .client
                .subscribe(topic, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|_| CommsError::MqttSubscribeFailed)
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp_impl::MqttTransport;

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim_impl {
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use log::{debug, warn};

    use super::{Channel, SessionState, INBOX_DEPTH};
    use crate::app::commands::InboundMessage;
    use crate::app::ports::TransportPort;
    use crate::error::CommsError;

    /// One recorded publish.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Published {
        pub topic: String,
        pub payload: Vec<u8>,
    }

    /// In-memory broker session.
    pub struct SimMqttTransport {
        inbox: Channel<NoopRawMutex, InboundMessage, INBOX_DEPTH>,
        session: SessionState,
        connect_failures_left: u32,
        fail_publish: bool,
        client_ids: Vec<String>,
        subscriptions: Vec<String>,
        published: Vec<Published>,
        pumps: u32,
    }

    impl Default for SimMqttTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SimMqttTransport {
        pub fn new() -> Self {
            Self {
                inbox: Channel::new(),
                session: SessionState::new(),
                connect_failures_left: 0,
                fail_publish: false,
                client_ids: Vec::new(),
                subscriptions: Vec::new(),
                published: Vec::new(),
                pumps: 0,
            }
        }

        /// Refuse the next `n` connection attempts.
        pub fn refuse_connects(&mut self, n: u32) {
            self.connect_failures_left = n;
        }

        pub fn fail_publishes(&mut self, fail: bool) {
            self.fail_publish = fail;
        }

        /// Broker drops the session; subscriptions are forgotten.
        pub fn drop_session(&mut self) {
            self.session.set_connected(false);
            self.subscriptions.clear();
        }

        /// Deliver a message as if the broker had pushed it, subscribed or
        /// not. Returns `false` if it was dropped (oversized or inbox full).
        pub fn inject(&mut self, topic: &str, payload: &[u8]) -> bool {
            if !self.subscriptions.iter().any(|s| s == topic) {
                debug!("MQTT(sim): delivering {} outside subscriptions", topic);
            }
            match InboundMessage::new(topic, payload) {
                Some(msg) => self.inbox.try_send(msg).is_ok(),
                None => false,
            }
        }

        pub fn client_ids(&self) -> &[String] {
            &self.client_ids
        }

        pub fn subscriptions(&self) -> &[String] {
            &self.subscriptions
        }

        pub fn published(&self) -> &[Published] {
            &self.published
        }

        pub fn published_on<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a Published> {
            self.published.iter().filter(move |p| p.topic == topic)
        }

        pub fn pumps(&self) -> u32 {
            self.pumps
        }
    }

    impl TransportPort for SimMqttTransport {
        fn connect(&mut self, client_id: &str) -> Result<(), CommsError> {
            self.client_ids.push(client_id.to_owned());
            if self.connect_failures_left > 0 {
                self.connect_failures_left -= 1;
                warn!("MQTT(sim): refusing {}", client_id);
                return Err(CommsError::MqttConnectFailed);
            }
            self.session = SessionState::new();
            self.session.set_connected(true);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.session.is_connected()
        }

        fn pump(&mut self) {
            self.pumps += 1;
        }

        fn try_receive(&mut self) -> Option<InboundMessage> {
            self.inbox.try_receive().ok()
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
            if !self.session.is_connected() || self.fail_publish {
                return Err(CommsError::MqttPublishFailed);
            }
            self.published.push(Published {
                topic: topic.to_owned(),
                payload: payload.to_vec(),
            });
            Ok(())
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
            if !self.session.is_connected() {
                return Err(CommsError::MqttSubscribeFailed);
            }
            self.subscriptions.push(topic.to_owned());
            Ok(())
        }
    }

}

#[cfg(not(target_os = "espidf"))]
pub use sim_impl::{Published, SimMqttTransport};
