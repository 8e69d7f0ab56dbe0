//! MQTT transport adapter.
//!
//! Implements [`TransportPort`] over the ESP-IDF MQTT client.
//!
//! The client runs its own task and reports through a callback.  The
//! callback never touches controller state: it only pushes into an
//! [`Inbox`] — a bounded message channel, a link-edge channel and a
//! connected flag — which the control loop drains on its next poll.
//!
//! ```text
//!  esp-mqtt task ──callback──▶ Inbox ──try_receive──▶ Controller (loop)
//! ```
//!
//! Reconnection is the client's job (`reconnect_timeout`); after each
//! reconnect the controller sees a fresh [`LinkEvent::Up`] and
//! re-subscribes.  Deliveries that overflow the channel are dropped with a
//! warning.
//!
//! Host builds replace the client with an in-memory broker session that
//! records publishes and subscriptions.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::ports::{InboundMessage, LinkEvent, TransportError, TransportPort};
use crate::config::SystemConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EspMqttEvent, EventPayload, MqttClientConfiguration, QoS,
};

/// Commands buffered between two loop polls.
pub const INBOX_DEPTH: usize = 8;
const LINK_DEPTH: usize = 4;

// ───────────────────────────────────────────────────────────────
// Inbox — the only state shared with the client task
// ───────────────────────────────────────────────────────────────

pub struct Inbox {
    messages: Channel<CriticalSectionRawMutex, InboundMessage, INBOX_DEPTH>,
    links: Channel<CriticalSectionRawMutex, LinkEvent, LINK_DEPTH>,
    connected: AtomicBool,
    dropped: AtomicU32,
}

impl Inbox {
    pub const fn new() -> Self {
        Self {
            messages: Channel::new(),
            links: Channel::new(),
            connected: AtomicBool::new(false),
            dropped: AtomicU32::new(0),
        }
    }

    pub fn on_connected(&self) {
        if !self.connected.swap(true, Ordering::AcqRel) {
            self.push_link(LinkEvent::Up);
        }
    }

    pub fn on_disconnected(&self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            self.push_link(LinkEvent::Down);
        }
    }

    pub fn on_message(&self, topic: &str, payload: &[u8]) {
        let Some(msg) = InboundMessage::new(topic, payload) else {
            warn!(
                "MQTT: dropping oversized message on '{}' ({} bytes)",
                topic,
                payload.len()
            );
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        if self.messages.try_send(msg).is_err() {
            warn!("MQTT: inbox full, dropping message on '{}'", topic);
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn push_link(&self, edge: LinkEvent) {
        // A full edge queue means the loop is far behind; the connected
        // flag still holds the current truth.
        if self.links.try_send(edge).is_err() {
            warn!("MQTT: link edge {:?} dropped", edge);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Transport
// ───────────────────────────────────────────────────────────────

pub struct MqttTransport {
    inbox: Arc<Inbox>,
    #[cfg(target_os = "espidf")]
    client: EspMqttClient<'static>,
    #[cfg(not(target_os = "espidf"))]
    published: Vec<(String, Vec<u8>)>,
    #[cfg(not(target_os = "espidf"))]
    subscriptions: Vec<String>,
}

impl MqttTransport {
    /// Start the client.  Returns immediately; the first connection is
    /// reported later as a [`LinkEvent::Up`].
    #[cfg(target_os = "espidf")]
    pub fn connect(config: &SystemConfig, client_id: &str) -> Result<Self, TransportError> {
        let inbox = Arc::new(Inbox::new());
        let cb_inbox = Arc::clone(&inbox);

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            reconnect_timeout: Some(core::time::Duration::from_millis(u64::from(
                config.reconnect_delay_ms,
            ))),
            ..Default::default()
        };

        let client = EspMqttClient::new_cb(
            &config.broker_url,
            &conf,
            move |event: EspMqttEvent<'_>| match event.payload() {
                EventPayload::Connected(_) => cb_inbox.on_connected(),
                EventPayload::Disconnected => cb_inbox.on_disconnected(),
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    details: Details::Complete,
                    ..
                } => cb_inbox.on_message(topic, data),
                EventPayload::Received { .. } => {
                    warn!("MQTT: fragmented message ignored");
                }
                EventPayload::Error(e) => warn!("MQTT: client error {:?}", e),
                _ => {}
            },
        )
        .map_err(|e| {
            warn!("MQTT: client start failed: {}", e);
            TransportError::NotConnected
        })?;

        log::info!("MQTT: client '{}' started for {}", client_id, config.broker_url);
        Ok(Self { inbox, client })
    }

    /// Simulation: an idle session; call [`Self::sim_inbox`] to drive it.
    #[cfg(not(target_os = "espidf"))]
    pub fn connect(config: &SystemConfig, client_id: &str) -> Result<Self, TransportError> {
        log::info!("MQTT(sim): client '{}' for {}", client_id, config.broker_url);
        Ok(Self {
            inbox: Arc::new(Inbox::new()),
            published: Vec::new(),
            subscriptions: Vec::new(),
        })
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    /// Simulation: shared handle standing in for the client task.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_inbox(&self) -> Arc<Inbox> {
        Arc::clone(&self.inbox)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn published(&self) -> &[(String, Vec<u8>)] {
        &self.published
    }

    /// Live session flag as last set by the client task.
    pub fn is_connected(&self) -> bool {
        self.inbox.is_connected()
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }
}

impl TransportPort for MqttTransport {
    fn poll_link(&mut self) -> Option<LinkEvent> {
        self.inbox.links.try_receive().ok()
    }

    fn try_receive(&mut self) -> Option<InboundMessage> {
        self.inbox.messages.try_receive().ok()
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        #[cfg(target_os = "espidf")]
        {
            self.client
                .publish(topic, QoS::AtMostOnce, false, payload)
                .map(|_| ())
                .map_err(|e| {
                    warn!("MQTT: publish to '{}' failed: {}", topic, e);
                    TransportError::PublishFailed
                })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.published.push((topic.to_owned(), payload.to_vec()));
            Ok(())
        }
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        #[cfg(target_os = "espidf")]
        {
            self.client
                .subscribe(topic, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|e| {
                    warn!("MQTT: subscribe to '{}' failed: {}", topic, e);
                    TransportError::SubscribeFailed
                })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            if !self.subscriptions.iter().any(|t| t == topic) {
                self.subscriptions.push(topic.to_owned());
            }
            Ok(())
        }
    }
}
