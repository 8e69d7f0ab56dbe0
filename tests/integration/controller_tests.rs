//! Integration tests for the message → state → cycle → actuators pipeline.
//!
//! The probe range is set to 0–100 so a raw reading equals its percentage.

use crate::mock_hw::{
    ActuatorCall, BrokerOp, MemStorage, MockDisplay, MockHw, MockTransport, RecordingSink,
};

use irrigator::app::ports::LinkEvent;

use irrigator::app::controller::Controller;
use irrigator::app::events::AppEvent;
use irrigator::config::SystemConfig;
use irrigator::control::threshold::{THRESHOLD_KEY, THRESHOLD_NAMESPACE};
use irrigator::control::{Mode, ThresholdStore, ZoneId};

const CONTROL: &str = "riku/garden/control";
const DATA: &str = "riku/garden/full_data";
const STATUS: &str = "riku/garden/status";

fn config() -> SystemConfig {
    SystemConfig {
        sensor_raw_min: 0,
        sensor_raw_max: 100,
        ..Default::default()
    }
}

struct Rig {
    ctl: Controller<MemStorage>,
    hw: MockHw,
    display: MockDisplay,
    transport: MockTransport,
    sink: RecordingSink,
    now: u64,
    period: u64,
}

impl Rig {
    fn new(moisture: [u16; 2]) -> Self {
        Self::with_storage(moisture, MemStorage::default())
    }

    fn with_storage(moisture: [u16; 2], storage: MemStorage) -> Self {
        let cfg = config();
        let mut sink = RecordingSink::default();
        let mut ctl = Controller::new(&cfg, ThresholdStore::new(storage));
        ctl.start(&mut sink);
        let mut rig = Self {
            ctl,
            hw: MockHw::new(moisture),
            display: MockDisplay::default(),
            transport: MockTransport::default(),
            sink,
            now: 0,
            period: u64::from(cfg.cycle_interval_ms),
        };

        // Session already up and subscribed.
        rig.transport.bring_up();
        rig.poll();
        rig.transport.ops.clear();
        rig
    }

    /// Poll without letting the cycle come due.
    fn poll(&mut self) -> bool {
        self.ctl.poll(
            self.now,
            &mut self.hw,
            &mut self.display,
            &mut self.transport,
            &mut self.sink,
        )
    }

    /// Advance past one period and poll.
    fn tick(&mut self) -> bool {
        self.now += self.period + 1;
        self.poll()
    }

    fn send(&mut self, payload: &str) {
        self.transport.deliver(CONTROL, payload);
    }

    fn telemetry(&self) -> Vec<String> {
        self.transport
            .published_to(DATA)
            .into_iter()
            .map(|p| String::from_utf8(p).unwrap())
            .collect()
    }

    fn stored_threshold(&self) -> Option<i32> {
        self.ctl
            .store()
            .storage()
            .raw(THRESHOLD_NAMESPACE, THRESHOLD_KEY)
            .map(|b| i32::from_le_bytes(b.try_into().unwrap()))
    }
}

// ── Reference scenarios ───────────────────────────────────────

#[test]
fn auto_start_waters_dry_zone_and_publishes_exact_json() {
    let mut rig = Rig::new([25, 40]);
    assert_eq!(rig.ctl.mode(), Mode::Auto);
    assert_eq!(rig.ctl.threshold().get(), 30);

    assert!(rig.tick());

    assert_eq!(rig.hw.commanded(), [true, false]);
    assert_eq!(
        rig.telemetry(),
        [r#"{"s1":25,"s2":40,"p1":"ON","p2":"OFF","lim":30}"#]
    );
    assert_eq!(
        rig.display.last_lines().unwrap(),
        ["--- AUTO MODE ---", "Plant A: 25% AUTO-ON", "Plant B: 40% OFF"]
    );
}

#[test]
fn raised_threshold_applies_on_next_cycle_and_persists() {
    let mut rig = Rig::new([40, 50]);
    rig.send("45");

    assert!(rig.tick());

    assert_eq!(rig.ctl.threshold().get(), 45);
    assert_eq!(rig.stored_threshold(), Some(45));
    assert_eq!(rig.hw.commanded(), [true, false]);
    assert_eq!(
        rig.telemetry(),
        [r#"{"s1":40,"s2":50,"p1":"ON","p2":"OFF","lim":45}"#]
    );
}

#[test]
fn manual_intents_are_inert_after_auto_resumes() {
    let mut rig = Rig::new([10, 10]);
    rig.send("Pompa 2 Hidup");
    rig.send("Otomatis");

    rig.tick();

    assert_eq!(rig.ctl.mode(), Mode::Auto);
    assert_eq!(rig.hw.commanded(), [true, true]);
    let lines = rig.display.last_lines().unwrap();
    assert_eq!(lines[1], "Plant A: 10% AUTO-ON");
    assert_eq!(lines[2], "Plant B: 10% AUTO-ON");
}

#[test]
fn unrecognized_input_changes_nothing() {
    let mut rig = Rig::new([50, 50]);
    rig.send("foo");
    rig.send("0");
    rig.send("100");
    rig.send("pompa 1 hidup");
    rig.poll();

    assert_eq!(rig.ctl.mode(), Mode::Auto);
    assert_eq!(rig.ctl.threshold().get(), 30);
    assert_eq!(rig.stored_threshold(), None);
    assert_eq!(rig.ctl.store().storage().writes, 0);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::CommandIgnored(_))),
        4
    );
}

// ── Manual mode ───────────────────────────────────────────────

#[test]
fn manual_mode_follows_intents_regardless_of_moisture() {
    let mut rig = Rig::new([0, 0]);
    rig.send("Pompa 1 Hidup");
    rig.tick();

    assert_eq!(rig.ctl.mode(), Mode::Manual);
    assert_eq!(rig.hw.commanded(), [true, false]);
    assert_eq!(
        rig.display.last_lines().unwrap(),
        ["--- MANUAL MODE ---", "Plant A: 0% MAN-ON", "Plant B: 0% MAN-OFF"]
    );

    // Soil soaked: manual intent still wins.
    rig.hw.raw = [100, 100];
    rig.tick();
    assert_eq!(rig.hw.commanded(), [true, false]);

    rig.send("Pompa 1 Mati");
    rig.send("Pompa 2 Hidup");
    rig.tick();
    assert_eq!(rig.hw.commanded(), [false, true]);
}

#[test]
fn entering_manual_emits_one_mode_change() {
    let mut rig = Rig::new([50, 50]);
    rig.send("Pompa 1 Hidup");
    rig.send("Pompa 2 Hidup");
    rig.send("Otomatis");
    rig.send("Otomatis");
    rig.poll();

    let changes: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ModeChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(changes, [(Mode::Auto, Mode::Manual), (Mode::Manual, Mode::Auto)]);
}

#[test]
fn threshold_change_in_manual_keeps_manual() {
    let mut rig = Rig::new([10, 10]);
    rig.send("Pompa 1 Mati");
    rig.send("60");
    rig.tick();

    assert_eq!(rig.ctl.mode(), Mode::Manual);
    assert_eq!(rig.hw.commanded(), [false, false]);
    assert!(rig.telemetry()[0].ends_with(r#""lim":60}"#));
}

// ── Ordering ──────────────────────────────────────────────────

#[test]
fn commands_are_applied_before_the_cycle_they_precede() {
    let mut rig = Rig::new([20, 20]);
    rig.tick();
    assert_eq!(rig.hw.commanded(), [true, true]);

    // Arrives in the same poll that runs the next cycle.
    rig.send("15");
    rig.tick();
    assert_eq!(rig.hw.commanded(), [false, false]);
    assert!(rig.telemetry()[1].ends_with(r#""lim":15}"#));
}

#[test]
fn commands_never_trigger_a_publish() {
    let mut rig = Rig::new([50, 50]);
    rig.send("Pompa 1 Hidup");
    rig.send("45");
    assert!(!rig.poll());

    assert!(rig.transport.ops.is_empty());
    assert!(rig.display.frames.is_empty());
}

#[test]
fn cycle_runs_once_per_period() {
    let mut rig = Rig::new([50, 50]);
    rig.now = rig.period;
    assert!(!rig.poll(), "period not yet exceeded");
    rig.now += 1;
    assert!(rig.poll());
    assert!(!rig.poll());
    assert_eq!(rig.ctl.cycle_count(), 1);
}

// ── Transport ─────────────────────────────────────────────────

#[test]
fn link_up_announces_then_subscribes() {
    let mut rig = Rig::new([50, 50]);
    rig.transport.connected = false;
    rig.transport.bring_up();
    rig.poll();

    assert_eq!(
        rig.transport.ops,
        [
            BrokerOp::Publish {
                topic: STATUS.into(),
                payload: b"System Online".to_vec(),
            },
            BrokerOp::Subscribe(CONTROL.into()),
        ]
    );
}

#[test]
fn every_reconnect_resubscribes() {
    let mut rig = Rig::new([50, 50]);
    rig.transport.bring_up();
    rig.poll();
    rig.transport.take_down();
    rig.poll();
    rig.transport.bring_up();
    rig.poll();

    assert_eq!(rig.transport.subscribe_count(), 2);
    assert_eq!(rig.transport.published_to(STATUS).len(), 2);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Link(false))),
        1
    );
}

#[test]
fn telemetry_waits_for_the_link_up_edge() {
    let mut rig = Rig::new([50, 50]);
    rig.transport.take_down();
    rig.poll();

    // Client task reconnected, but its edge lands after this poll drained
    // the link queue.
    rig.transport.connected = true;
    rig.tick();
    assert!(rig.transport.ops.is_empty());

    rig.transport.links.push_back(LinkEvent::Up);
    rig.tick();
    assert_eq!(rig.transport.ops.len(), 3);
    assert_eq!(
        rig.transport.ops[..2],
        [
            BrokerOp::Publish {
                topic: STATUS.into(),
                payload: b"System Online".to_vec(),
            },
            BrokerOp::Subscribe(CONTROL.into()),
        ]
    );
    assert!(matches!(&rig.transport.ops[2], BrokerOp::Publish { topic, .. } if topic == DATA));
}

#[test]
fn offline_cycles_actuate_but_do_not_publish() {
    let mut rig = Rig::new([10, 90]);
    rig.transport.take_down();
    rig.tick();

    assert!(!rig.ctl.is_online());
    assert_eq!(rig.hw.commanded(), [true, false]);
    assert_eq!(rig.display.frames.len(), 1);
    assert!(rig.transport.ops.is_empty());
    assert_eq!(rig.transport.rejected, 0, "publish must not even be attempted");
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))),
        1
    );
}

#[test]
fn messages_on_other_topics_are_ignored() {
    let mut rig = Rig::new([50, 50]);
    rig.transport.deliver(STATUS, "Pompa 1 Hidup");
    rig.transport.deliver("riku/garden/other", "45");
    rig.poll();

    assert_eq!(rig.ctl.mode(), Mode::Auto);
    assert_eq!(rig.ctl.threshold().get(), 30);
}

// ── Telemetry reflects the physical line ──────────────────────

#[test]
fn telemetry_reports_line_level_not_label() {
    let mut rig = Rig::new([10, 90]);
    rig.hw.stuck[ZoneId::A.index()] = true;
    rig.hw.stuck[ZoneId::B.index()] = true;
    rig.hw.line[ZoneId::B.index()] = true;
    rig.tick();

    // Zone A commanded on but stuck low; zone B commanded off but stuck high.
    assert_eq!(rig.hw.commanded(), [true, false]);
    assert_eq!(
        rig.telemetry(),
        [r#"{"s1":10,"s2":90,"p1":"OFF","p2":"ON","lim":30}"#]
    );
    assert_eq!(rig.display.last_lines().unwrap()[1], "Plant A: 10% AUTO-ON");
}

// ── Alert ─────────────────────────────────────────────────────

#[test]
fn alert_repeats_every_cycle_while_a_zone_is_auto_on() {
    let mut rig = Rig::new([10, 90]);
    rig.tick();
    rig.tick();
    assert_eq!(rig.hw.alerts(), 2);

    // Both dry: still one shared tone per cycle.
    rig.hw.raw = [10, 10];
    rig.tick();
    assert_eq!(rig.hw.alerts(), 3);

    // Both recovered: silence.
    rig.hw.raw = [90, 90];
    rig.tick();
    assert_eq!(rig.hw.alerts(), 3);

    rig.hw.raw = [90, 10];
    rig.tick();
    assert_eq!(rig.hw.alerts(), 4);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::AlertSounded)),
        4
    );
}

#[test]
fn manual_watering_never_alerts() {
    let mut rig = Rig::new([0, 0]);
    rig.send("Pompa 1 Hidup");
    rig.send("Pompa 2 Hidup");
    rig.tick();
    rig.tick();
    assert_eq!(rig.hw.alerts(), 0);
    assert!(!rig.hw.calls.contains(&ActuatorCall::Alert));
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn persisted_threshold_is_loaded_at_start() {
    let storage = MemStorage::with(THRESHOLD_NAMESPACE, THRESHOLD_KEY, &55i32.to_le_bytes());
    let mut rig = Rig::with_storage([50, 60], storage);
    assert_eq!(rig.ctl.threshold().get(), 55);
    assert!(matches!(
        rig.sink.events[0],
        AppEvent::Started(t) if t.get() == 55
    ));

    rig.tick();
    assert_eq!(rig.hw.commanded(), [true, false]);
}

#[test]
fn out_of_range_persisted_threshold_falls_back_to_default() {
    for bad in [0i32, 100, -7, 1000] {
        let storage = MemStorage::with(THRESHOLD_NAMESPACE, THRESHOLD_KEY, &bad.to_le_bytes());
        let rig = Rig::with_storage([50, 50], storage);
        assert_eq!(rig.ctl.threshold().get(), 30, "stored {bad}");
    }
}

#[test]
fn truncated_persisted_value_falls_back_to_default() {
    let storage = MemStorage::with(THRESHOLD_NAMESPACE, THRESHOLD_KEY, &[45]);
    let rig = Rig::with_storage([50, 50], storage);
    assert_eq!(rig.ctl.threshold().get(), 30);
}

#[test]
fn last_threshold_wins_in_storage() {
    let mut rig = Rig::new([50, 50]);
    rig.send("20");
    rig.send("80");
    rig.send("0");
    rig.poll();

    assert_eq!(rig.ctl.threshold().get(), 80);
    assert_eq!(rig.stored_threshold(), Some(80));
    assert_eq!(rig.ctl.store().storage().writes, 2);
}

// ── Display ───────────────────────────────────────────────────

#[test]
fn display_failure_does_not_stop_the_cycle() {
    let mut rig = Rig::new([10, 90]);
    rig.display.fail = true;
    assert!(rig.tick());

    assert_eq!(rig.hw.commanded(), [true, false]);
    assert_eq!(rig.telemetry().len(), 1);
}
