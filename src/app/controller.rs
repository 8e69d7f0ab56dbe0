//! Controller — the hexagonal core.
//!
//! [`Controller`] owns the [`ControlState`] and the [`ThresholdStore`] and is
//! their only writer.  Every other concern reaches it through port traits
//! passed in at call sites, so the whole cycle runs against mock adapters.
//!
//! ```text
//!  TransportPort ──▶ ┌─────────────────────────┐ ──▶ ActuatorPort
//!     SensorPort ──▶ │       Controller        │ ──▶ DisplayPort
//!                    │ ControlState · Decider  │ ──▶ TransportPort
//!                    └─────────────────────────┘ ──▶ EventSink
//! ```
//!
//! Two triggers drive it: message delivery and the cycle tick.  [`poll`]
//! drains all pending deliveries before it checks the tick, so a decision
//! always sees every command that arrived before it.
//!
//! [`poll`]: Controller::poll

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::{
    decide, moisture_percent, ControlState, Decision, Mode, Outcome, StatusLabel, Threshold,
    ThresholdStore, ZoneId,
};
use crate::scheduler::CycleTimer;

use super::commands::Command;
use super::events::AppEvent;
use super::ports::{
    ActuatorPort, DisplayPort, EventSink, InboundMessage, LinkEvent, SensorPort, StoragePort,
    TransportPort,
};
use super::status::StatusFrame;
use super::telemetry::TelemetrySnapshot;

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller<S> {
    state: ControlState,
    store: ThresholdStore<S>,
    timer: CycleTimer,
    topic_control: String,
    topic_data: String,
    topic_status: String,
    status_message: String,
    sensor_raw_min: u16,
    sensor_raw_max: u16,
    /// Broker session state as of the last [`LinkEvent`] drained.
    online: bool,
}

impl<S: StoragePort> Controller<S> {
    /// Build the controller, loading the threshold from `store`.
    ///
    /// A persisted value outside (0, 100) is replaced by the default.
    pub fn new(config: &SystemConfig, store: ThresholdStore<S>) -> Self {
        let raw = store.load();
        let threshold = Threshold::new(raw).unwrap_or_else(|| {
            warn!("Controller: persisted threshold {} out of range, using default", raw);
            Threshold::DEFAULT
        });

        Self {
            state: ControlState::new(threshold),
            store,
            timer: CycleTimer::new(config.cycle_interval_ms),
            topic_control: config.topic_control.clone(),
            topic_data: config.topic_data.clone(),
            topic_status: config.topic_status.clone(),
            status_message: config.status_message.clone(),
            sensor_raw_min: config.sensor_raw_min,
            sensor_raw_max: config.sensor_raw_max,
            online: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started(self.state.threshold()));
        info!(
            "Controller started (threshold={}, cycle={}ms)",
            self.state.threshold(),
            self.timer.period_ms()
        );
    }

    /// One pass of the cooperative loop: link edges, then every pending
    /// message, then the cycle tick if it is due.  Returns `true` if a
    /// cycle ran.
    pub fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        display: &mut impl DisplayPort,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> bool {
        while let Some(edge) = transport.poll_link() {
            match edge {
                LinkEvent::Up => self.on_link_up(transport, sink),
                LinkEvent::Down => {
                    self.online = false;
                    warn!("Controller: broker link lost");
                    sink.emit(&AppEvent::Link(false));
                }
            }
        }

        while let Some(msg) = transport.try_receive() {
            self.handle_message(&msg, sink);
        }

        if self.timer.poll(now_ms) {
            self.run_cycle(hw, display, transport, sink);
            true
        } else {
            false
        }
    }

    // ── Link handling ─────────────────────────────────────────

    /// Announce presence, then (re)subscribe to the command topic.
    pub fn on_link_up(&mut self, transport: &mut impl TransportPort, sink: &mut impl EventSink) {
        info!("Controller: broker link up");
        self.online = true;
        sink.emit(&AppEvent::Link(true));

        if let Err(e) = transport.publish(&self.topic_status, self.status_message.as_bytes()) {
            warn!("Controller: status publish failed: {}", e);
        }
        match transport.subscribe(&self.topic_control) {
            Ok(()) => info!("Controller: listening on '{}'", self.topic_control),
            Err(e) => warn!("Controller: subscribe to '{}' failed: {}", self.topic_control, e),
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Parse and apply one delivered message.
    pub fn handle_message(&mut self, msg: &InboundMessage, sink: &mut impl EventSink) -> Outcome {
        if msg.topic.as_str() != self.topic_control {
            debug!("Controller: ignoring message on '{}'", msg.topic);
            return Outcome::Ignored;
        }
        self.handle_command(Command::parse_bytes(&msg.payload), sink)
    }

    /// Apply a command and run its persistence effect.
    pub fn handle_command(&mut self, cmd: Command, sink: &mut impl EventSink) -> Outcome {
        let before = self.state.mode();
        let outcome = self.state.apply(&cmd);

        match outcome {
            Outcome::Ignored => {
                debug!("Controller: ignored {:?}", cmd);
                sink.emit(&AppEvent::CommandIgnored(cmd));
            }
            Outcome::ThresholdChanged(t) => {
                self.store.save(i32::from(t.get()));
                sink.emit(&AppEvent::ThresholdChanged(t));
            }
            Outcome::ZoneIntentSet { zone, on, .. } => {
                sink.emit(&AppEvent::ManualIntent { zone, on });
            }
            Outcome::AutoResumed { .. } => {}
        }

        let after = self.state.mode();
        if before != after {
            sink.emit(&AppEvent::ModeChanged {
                from: before,
                to: after,
            });
        }
        outcome
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Read probes → decide → actuate → alert → display → publish.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        display: &mut impl DisplayPort,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> Decision {
        // 1. Probes
        let moisture_pct = ZoneId::ALL.map(|zone| {
            let raw = hw.read_moisture_raw(zone);
            moisture_percent(raw, self.sensor_raw_min, self.sensor_raw_max)
        });

        // 2. Decide (pure)
        let decision = decide(&self.state, moisture_pct);

        // 3. Actuate
        for zone in ZoneId::ALL {
            hw.set_pump(zone, decision.zone(zone).actuator_on);
        }

        // 4. One shared tone per cycle while any zone is AUTO-ON
        if decision.labels().contains(&StatusLabel::AutoOn) {
            hw.sound_alert();
            sink.emit(&AppEvent::AlertSounded);
        }

        // 5. Display
        let frame = StatusFrame::build(self.state.mode(), moisture_pct, &decision);
        if let Err(e) = display.render(&frame) {
            warn!("Controller: display render failed: {}", e);
        }

        // 6. Telemetry from the physical line levels.  Gated on the drained
        //    link edge so nothing goes out ahead of the status/subscribe pair.
        let snapshot = TelemetrySnapshot {
            moisture_pct,
            actuator_on: ZoneId::ALL.map(|zone| hw.pump_line(zone)),
            threshold: self.state.threshold(),
        };
        sink.emit(&AppEvent::Telemetry(snapshot));

        if self.online {
            if let Err(e) = transport.publish(&self.topic_data, &snapshot.encode()) {
                warn!("Controller: telemetry publish failed: {}", e);
            }
        } else {
            debug!("Controller: offline, telemetry not published");
        }

        decision
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn threshold(&self) -> Threshold {
        self.state.threshold()
    }

    /// Whether the last link edge seen was `Up`.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.timer.fired()
    }

    pub fn store(&self) -> &ThresholdStore<S> {
        &self.store
    }
}
