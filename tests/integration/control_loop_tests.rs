//! Integration tests for the ControlLoop against the simulated broker.

use crate::mock_hw::{FixedSensors, ManualClock, MockLamp, NoopDelay, RecordingSink, fast_config};

use lightnode::adapters::mqtt::SimMqttTransport;
use lightnode::app::control_loop::{ControlLoop, NodeIo};
use lightnode::app::events::AppEvent;
use lightnode::app::ports::TransportPort;
use lightnode::config::{NodeConfig, ReportPolicy, SensorMode};
use lightnode::error::{CommsError, Error};
use serde_json::Value;

type TestLoop =
    ControlLoop<ManualClock, SimMqttTransport, FixedSensors, MockLamp, RecordingSink, NoopDelay>;

fn make_loop(config: NodeConfig) -> TestLoop {
    make_loop_with(config, SimMqttTransport::new())
}

fn make_loop_with(config: NodeConfig, transport: SimMqttTransport) -> TestLoop {
    let io = NodeIo {
        clock: ManualClock::at(0),
        transport,
        sensors: FixedSensors::default(),
        lamp: MockLamp::default(),
        sink: RecordingSink::default(),
        delay: NoopDelay::default(),
    };
    ControlLoop::new(config, io)
}

fn step(node: &mut TestLoop, to_ms: u32) {
    node.io().clock.set(to_ms);
    node.run_once().expect("loop iteration");
}

fn lamp_topic() -> String {
    NodeConfig::default().topics.lamp_command.as_str().to_owned()
}

// ── Session ───────────────────────────────────────────────────

#[test]
fn first_iteration_connects_and_subscribes() {
    let mut node = make_loop(fast_config());
    step(&mut node, 0);

    let t = &node.io().transport;
    assert!(t.is_connected());
    assert_eq!(t.subscriptions(), &["nelson_iot/led_cmd".to_owned()]);

    let id = &t.client_ids()[0];
    let (prefix, suffix) = id.split_once('-').unwrap();
    assert_eq!(prefix, "ESP32Sim");
    assert!((1..=4).contains(&suffix.len()));
    assert!(!suffix.chars().any(|c| c.is_ascii_lowercase()));
    let value = u16::from_str_radix(suffix, 16).unwrap();
    assert!(value < 0xFFFF);
    assert!(suffix == "0" || !suffix.starts_with('0'));
    assert!(t.pumps() >= 1);
}

#[test]
fn lamp_starts_off() {
    let node = make_loop(fast_config());
    assert_eq!(node.io().lamp.writes, vec![false]);
}

#[test]
fn dropped_session_reconnects_with_backoff_and_resubscribes() {
    let mut node = make_loop(fast_config());
    step(&mut node, 0);

    node.io_mut().transport.drop_session();
    node.io_mut().transport.refuse_connects(2);
    step(&mut node, 1);

    let t = &node.io().transport;
    assert!(t.is_connected());
    assert_eq!(t.client_ids().len(), 4);
    assert_eq!(t.subscriptions().len(), 1);
    assert_eq!(node.io().delay.total_ms, 2 * 5_000);
}

#[test]
fn bounded_reconnect_gives_up() {
    let mut cfg = fast_config();
    cfg.mqtt_max_reconnect_attempts = Some(3);
    let mut transport = SimMqttTransport::new();
    transport.refuse_connects(u32::MAX);
    let mut node = make_loop_with(cfg, transport);

    let err = node.run_once().unwrap_err();
    assert_eq!(err, Error::Comms(CommsError::ReconnectExhausted));
    assert_eq!(node.io().transport.client_ids().len(), 3);
    // No wait after the last attempt.
    assert_eq!(node.io().delay.total_ms, 2 * 5_000);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn on_and_off_commands_drive_lamp_and_accounting() {
    let mut node = make_loop(fast_config());
    step(&mut node, 0);
    let topic = lamp_topic();

    assert!(node.io_mut().transport.inject(&topic, b"ON"));
    step(&mut node, 0);
    assert!(node.io().lamp.is_on());
    assert!(node.service().lamp_on());

    assert!(node.io_mut().transport.inject(&topic, b"OFF"));
    step(&mut node, 120_000);

    assert!(!node.io().lamp.is_on());
    assert_eq!(node.service_mut().accumulated_on_ms(120_000), 120_000);
    assert!((node.service_mut().current_kwh(120_000) - 0.0003).abs() < 1e-12);
}

#[test]
fn unknown_payloads_and_foreign_topics_are_ignored() {
    let mut node = make_loop(fast_config());
    step(&mut node, 0);
    let topic = lamp_topic();

    node.io_mut().transport.inject(&topic, b"on");
    node.io_mut().transport.inject(&topic, b"TOGGLE");
    node.io_mut().transport.inject("nelson_iot/other", b"ON");
    step(&mut node, 0);

    assert_eq!(node.io().lamp.writes, vec![false]);
    assert!(!node.service().lamp_on());
    let ignored = node
        .io()
        .sink
        .count(|e| matches!(e, AppEvent::CommandIgnored));
    assert_eq!(ignored, 2);
}

// ── Outbound ──────────────────────────────────────────────────

#[test]
fn sensor_message_published_after_strictly_more_than_interval() {
    let mut node = make_loop(fast_config());
    step(&mut node, 1_000);
    assert_eq!(node.io().transport.published_on("nelson_iot/sensores").count(), 0);

    step(&mut node, 1_001);
    let published: Vec<_> = node
        .io()
        .transport
        .published_on("nelson_iot/sensores")
        .collect();
    assert_eq!(published.len(), 1);
    let v: Value = serde_json::from_slice(&published[0].payload).unwrap();
    assert_eq!(v["movimento"], 1);
    assert_eq!(v["luminosidade"], 3000);
}

#[test]
fn simulated_clock_ticks_once_per_sample() {
    let mut node = make_loop(fast_config());
    for now in 0..=100_000u32 {
        step(&mut node, now);
    }
    let sensors = &node.io().sensors;
    assert_eq!(sensors.samples, 99);
    assert_eq!(sensors.minute_ticks, sensors.samples);
    // 99 minutes after 00:00.
    assert_eq!(node.service().sim_time(), (1, 39));
}

#[test]
fn physical_mode_clock_runs_independently_of_sampling() {
    let mut cfg = fast_config();
    cfg.sensor_mode = SensorMode::Physical;
    cfg.sim_minute_ms = 100;
    let mut node = make_loop(cfg);
    for now in (0..=1_000u32).step_by(100) {
        step(&mut node, now);
    }
    assert_eq!(node.io().sensors.minute_ticks, 10);
    assert_eq!(node.io().sensors.samples, 0);
}

#[test]
fn sensor_publish_failure_does_not_stop_the_loop() {
    let mut node = make_loop(fast_config());
    step(&mut node, 0);
    node.io_mut().transport.fail_publishes(true);
    step(&mut node, 2_000);
    assert_eq!(node.io().sensors.samples, 1);
    assert!(node.io().transport.published().is_empty());
}

#[test]
fn hourly_report_published_on_consumption_topic() {
    let mut cfg = fast_config();
    cfg.sim_minute_ms = 10;
    cfg.sample_interval_ms = 10;
    let mut node = make_loop(cfg);

    for i in 0..=60u32 {
        step(&mut node, i * 11);
    }

    let reports: Vec<_> = node
        .io()
        .transport
        .published_on("nelson_iot/consumo")
        .collect();
    assert_eq!(reports.len(), 1);
    let v: Value = serde_json::from_slice(&reports[0].payload).unwrap();
    for key in ["consumo_kwh", "consumo_wh", "media_dia_wh", "total_dia_wh", "tempo_ligado_min"] {
        assert!(v[key].is_number(), "missing {}", key);
    }
    assert_eq!(v["led_estado"], "OFF");
    assert_eq!(node.service().sim_time(), (1, 0));
}

#[test]
fn fixed_interval_reports_follow_wall_clock() {
    let mut cfg = fast_config();
    cfg.sim_minute_ms = 60_000;
    cfg.report_policy = ReportPolicy::FixedInterval { interval_ms: 60_000 };
    let mut node = make_loop(cfg);

    for now in [0, 30_000, 59_999, 60_000, 90_000, 120_000] {
        step(&mut node, now);
    }

    assert_eq!(node.io().transport.published_on("nelson_iot/consumo").count(), 2);
}

#[test]
fn report_is_dropped_not_retried_when_publish_fails() {
    let mut cfg = fast_config();
    cfg.report_policy = ReportPolicy::FixedInterval { interval_ms: 100 };
    let mut node = make_loop(cfg);
    step(&mut node, 0);

    node.io_mut().transport.fail_publishes(true);
    step(&mut node, 100);
    node.io_mut().transport.fail_publishes(false);
    step(&mut node, 150);

    assert_eq!(node.io().transport.published_on("nelson_iot/consumo").count(), 0);
    assert_eq!(
        node.io().sink.count(|e| matches!(e, AppEvent::Report(_))),
        1
    );
}
