//! End-to-end tests over the real adapters backed by the simulated
//! peripheral bank: ADC probes, relay GPIO, the in-memory broker session
//! and the NVS stand-in.  Only the display is mocked.

use crate::mock_hw::{MockDisplay, RecordingSink};

use irrigator::adapters::hardware::HardwareAdapter;
use irrigator::adapters::mqtt::MqttTransport;
use irrigator::adapters::nvs::NvsAdapter;
use irrigator::adapters::time::MonotonicClock;
use irrigator::app::controller::Controller;
use irrigator::config::SystemConfig;
use irrigator::control::{Mode, ThresholdStore, ZoneId};
use irrigator::drivers::buzzer::BuzzerDriver;
use irrigator::drivers::hw_init::sim;
use irrigator::drivers::relay::RelayDriver;
use irrigator::pins;
use irrigator::sensors::{sim_set_moisture_raw, SensorHub};

struct Stack {
    ctl: Controller<NvsAdapter>,
    hw: HardwareAdapter,
    display: MockDisplay,
    transport: MqttTransport,
    sink: RecordingSink,
    cfg: SystemConfig,
    now: u64,
}

impl Stack {
    fn boot() -> Self {
        let nvs = NvsAdapter::new().unwrap();
        let cfg = nvs.load_or_seed();
        let hw = HardwareAdapter::new(
            SensorHub::from_pins(),
            [
                RelayDriver::new(pins::RELAY_A_GPIO),
                RelayDriver::new(pins::RELAY_B_GPIO),
            ],
            BuzzerDriver::new(cfg.alert_duration_ms),
            MonotonicClock::new(),
        );
        let transport = MqttTransport::connect(&cfg, "Riku-Dual-cafe").unwrap();
        let mut sink = RecordingSink::default();
        let mut ctl = Controller::new(&cfg, ThresholdStore::new(nvs));
        ctl.start(&mut sink);
        Self {
            ctl,
            hw,
            display: MockDisplay::default(),
            transport,
            sink,
            cfg,
            now: 0,
        }
    }

    fn poll(&mut self) -> bool {
        self.ctl.poll(
            self.now,
            &mut self.hw,
            &mut self.display,
            &mut self.transport,
            &mut self.sink,
        )
    }

    fn tick(&mut self) -> bool {
        self.now += u64::from(self.cfg.cycle_interval_ms) + 1;
        self.poll()
    }

    fn relay_lines(&self) -> [bool; 2] {
        [
            sim::gpio_level(pins::RELAY_A_GPIO),
            sim::gpio_level(pins::RELAY_B_GPIO),
        ]
    }

    fn telemetry(&self) -> Vec<&[u8]> {
        self.transport
            .published()
            .iter()
            .filter(|(t, _)| *t == self.cfg.topic_data)
            .map(|(_, p)| p.as_slice())
            .collect()
    }
}

#[test]
fn dry_probe_drives_relay_and_publishes() {
    let _g = sim::lock();
    sim_set_moisture_raw(ZoneId::A, 400);
    sim_set_moisture_raw(ZoneId::B, 4000);

    let mut s = Stack::boot();
    s.transport.sim_inbox().on_connected();
    s.poll();
    assert_eq!(s.transport.subscriptions(), [s.cfg.topic_control.clone()]);

    assert!(s.tick());
    assert_eq!(s.relay_lines(), [true, false]);
    assert!(s.hw.buzzer().is_sounding());
    assert_eq!(
        s.telemetry(),
        [br#"{"s1":9,"s2":97,"p1":"ON","p2":"OFF","lim":30}"#.as_slice()]
    );
}

#[test]
fn broker_commands_switch_to_manual() {
    let _g = sim::lock();
    sim_set_moisture_raw(ZoneId::A, 4000);
    sim_set_moisture_raw(ZoneId::B, 4000);

    let mut s = Stack::boot();
    let inbox = s.transport.sim_inbox();
    inbox.on_connected();
    inbox.on_message(&s.cfg.topic_control, b"Pompa 2 Hidup");

    s.tick();
    assert_eq!(s.ctl.mode(), Mode::Manual);
    assert_eq!(s.relay_lines(), [false, true]);

    inbox.on_message(&s.cfg.topic_control, b"Otomatis");
    s.tick();
    assert_eq!(s.ctl.mode(), Mode::Auto);
    assert_eq!(s.relay_lines(), [false, false]);
}

#[test]
fn threshold_command_reaches_nvs() {
    let _g = sim::lock();
    let mut s = Stack::boot();
    let inbox = s.transport.sim_inbox();
    inbox.on_connected();
    inbox.on_message(&s.cfg.topic_control, b"72");
    s.poll();

    assert_eq!(s.ctl.threshold().get(), 72);
    assert_eq!(s.ctl.store().load(), 72);
}

#[test]
fn welded_relay_is_reported_as_its_real_level() {
    let _g = sim::lock();
    sim_set_moisture_raw(ZoneId::A, 4000);
    sim_set_moisture_raw(ZoneId::B, 4000);
    sim::stick_gpio(pins::RELAY_B_GPIO, true);

    let mut s = Stack::boot();
    s.transport.sim_inbox().on_connected();
    s.tick();

    assert_eq!(
        s.telemetry(),
        [br#"{"s1":97,"s2":97,"p1":"OFF","p2":"ON","lim":30}"#.as_slice()]
    );
}

#[test]
fn offline_session_keeps_irrigating() {
    let _g = sim::lock();
    sim_set_moisture_raw(ZoneId::A, 0);
    sim_set_moisture_raw(ZoneId::B, 0);

    let mut s = Stack::boot();
    s.tick();
    assert_eq!(s.relay_lines(), [true, true]);
    assert!(s.transport.published().is_empty());

    // Commands sent while offline never arrive; the session starts clean.
    let inbox = s.transport.sim_inbox();
    inbox.on_connected();
    s.tick();
    assert_eq!(s.telemetry().len(), 1);
}
