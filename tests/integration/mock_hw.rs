//! Mock adapters for integration tests.
//!
//! Each mock records what the controller asked of it so tests can assert on
//! the full history without touching GPIO, I²C or a broker.

use std::collections::{HashMap, VecDeque};

use irrigator::app::events::AppEvent;
use irrigator::app::ports::{
    ActuatorPort, DisplayError, DisplayPort, EventSink, InboundMessage, LinkEvent, SensorPort,
    StorageError, StoragePort, TransportError, TransportPort,
};
use irrigator::app::status::StatusFrame;
use irrigator::control::{ZoneId, ZONE_COUNT};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetPump { zone: ZoneId, on: bool },
    Alert,
}

// ── MockHw ────────────────────────────────────────────────────

/// Probes return whatever `raw` holds; relays drive `line` unless the
/// zone is marked stuck.
pub struct MockHw {
    pub raw: [u16; ZONE_COUNT],
    pub line: [bool; ZONE_COUNT],
    pub stuck: [bool; ZONE_COUNT],
    pub calls: Vec<ActuatorCall>,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockHw {
    pub fn new(raw: [u16; ZONE_COUNT]) -> Self {
        Self {
            raw,
            line: [false; ZONE_COUNT],
            stuck: [false; ZONE_COUNT],
            calls: Vec::new(),
            reads: 0,
        }
    }

    pub fn alerts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == ActuatorCall::Alert)
            .count()
    }

    /// Last commanded state per zone.
    pub fn commanded(&self) -> [bool; ZONE_COUNT] {
        ZoneId::ALL.map(|zone| {
            self.calls
                .iter()
                .rev()
                .find_map(|c| match c {
                    ActuatorCall::SetPump { zone: z, on } if *z == zone => Some(*on),
                    _ => None,
                })
                .unwrap_or(false)
        })
    }
}

impl SensorPort for MockHw {
    fn read_moisture_raw(&mut self, zone: ZoneId) -> u16 {
        self.reads += 1;
        self.raw[zone.index()]
    }
}

impl ActuatorPort for MockHw {
    fn set_pump(&mut self, zone: ZoneId, on: bool) {
        self.calls.push(ActuatorCall::SetPump { zone, on });
        if !self.stuck[zone.index()] {
            self.line[zone.index()] = on;
        }
    }

    fn pump_line(&self, zone: ZoneId) -> bool {
        self.line[zone.index()]
    }

    fn sound_alert(&mut self) {
        self.calls.push(ActuatorCall::Alert);
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub frames: Vec<StatusFrame>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockDisplay {
    /// Lines of the most recent frame, owned.
    pub fn last_lines(&self) -> Option<[String; 3]> {
        self.frames
            .last()
            .map(|f| f.lines().map(str::to_owned))
    }
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, frame: &StatusFrame) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::BusError);
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum BrokerOp {
    Publish { topic: String, payload: Vec<u8> },
    Subscribe(String),
}

/// In-memory broker session.  Tests push link edges and deliveries, then
/// inspect `ops`.
#[derive(Default)]
pub struct MockTransport {
    pub connected: bool,
    pub links: VecDeque<LinkEvent>,
    pub inbox: VecDeque<InboundMessage>,
    pub ops: Vec<BrokerOp>,
    pub rejected: u32,
}

#[allow(dead_code)]
impl MockTransport {
    /// Simulate the client reporting a (re)connection.
    pub fn bring_up(&mut self) {
        self.connected = true;
        self.links.push_back(LinkEvent::Up);
    }

    pub fn take_down(&mut self) {
        self.connected = false;
        self.links.push_back(LinkEvent::Down);
    }

    pub fn deliver(&mut self, topic: &str, payload: &str) {
        if let Some(msg) = InboundMessage::new(topic, payload.as_bytes()) {
            self.inbox.push_back(msg);
        }
    }

    pub fn published_to(&self, topic: &str) -> Vec<Vec<u8>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BrokerOp::Publish { topic: t, payload } if t == topic => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn subscribe_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, BrokerOp::Subscribe(_)))
            .count()
    }
}

impl TransportPort for MockTransport {
    fn poll_link(&mut self) -> Option<LinkEvent> {
        self.links.pop_front()
    }

    fn try_receive(&mut self) -> Option<InboundMessage> {
        self.inbox.pop_front()
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            self.rejected += 1;
            return Err(TransportError::NotConnected);
        }
        self.ops.push(BrokerOp::Publish {
            topic: topic.to_owned(),
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if !self.connected {
            self.rejected += 1;
            return Err(TransportError::NotConnected);
        }
        self.ops.push(BrokerOp::Subscribe(topic.to_owned()));
        Ok(())
    }
}

// ── MemStorage ────────────────────────────────────────────────

#[derive(Default)]
pub struct MemStorage {
    store: HashMap<String, Vec<u8>>,
    pub writes: u32,
}

#[allow(dead_code)]
impl MemStorage {
    pub fn with(namespace: &str, key: &str, data: &[u8]) -> Self {
        let mut s = Self::default();
        s.store.insert(format!("{}::{}", namespace, key), data.to_vec());
        s
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<&[u8]> {
        self.store
            .get(&format!("{}::{}", namespace, key))
            .map(Vec::as_slice)
    }
}

impl StoragePort for MemStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&format!("{}::{}", namespace, key)) {
            Some(v) if v.len() > buf.len() => Err(StorageError::IoError),
            Some(v) => {
                buf[..v.len()].copy_from_slice(v);
                Ok(v.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.writes += 1;
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
