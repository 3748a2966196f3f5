//! Full-day runs of the ControlLoop with the simulated environment.
//!
//! These drive the loop one sampling period at a time (1001 ms, just past
//! the 1000 ms interval) and check what actually reaches the broker.

use crate::mock_hw::{ManualClock, MockLamp, NoopDelay, RecordingSink};

use lightnode::adapters::mqtt::SimMqttTransport;
use lightnode::app::control_loop::{ControlLoop, NodeIo};
use lightnode::config::NodeConfig;
use lightnode::sensors::SimulatedSource;
use serde_json::Value;

type SimLoop =
    ControlLoop<ManualClock, SimMqttTransport, SimulatedSource, MockLamp, RecordingSink, NoopDelay>;

const PERIOD_MS: u32 = 1_001;
const SENSOR_TOPIC: &str = "nelson_iot/sensores";
const REPORT_TOPIC: &str = "nelson_iot/consumo";

fn sim_loop(seed: u64) -> SimLoop {
    let mut config = NodeConfig::default();
    config.rng_seed = Some(seed);
    let io = NodeIo {
        clock: ManualClock::at(0),
        transport: SimMqttTransport::new(),
        sensors: SimulatedSource::new(config.rng_seed),
        lamp: MockLamp::default(),
        sink: RecordingSink::default(),
        delay: NoopDelay::default(),
    };
    let mut node = ControlLoop::new(config, io);
    node.run_once().expect("first iteration");
    node
}

fn step(node: &mut SimLoop, to_ms: u32) {
    node.io().clock.set(to_ms);
    node.run_once().expect("loop iteration");
}

fn minute_of_day(node: &SimLoop) -> u32 {
    let (h, m) = node.service().sim_time();
    u32::from(h) * 60 + u32::from(m)
}

fn held_ticks(node: &SimLoop) -> u16 {
    node.io().sensors.simulator().presence_memory().remaining_ticks()
}

fn payloads(node: &SimLoop, topic: &str) -> Vec<Value> {
    node.io()
        .transport
        .published_on(topic)
        .map(|p| serde_json::from_slice(&p.payload).unwrap())
        .collect()
}

#[test]
fn presence_memory_counts_down_once_per_published_reading() {
    let mut node = sim_loop(7);
    let mut now = 0;
    let mut held = 0;
    let mut redrawn = 0;

    for _ in 0..1_440 {
        let minute_before = minute_of_day(&node);
        let memory_before = held_ticks(&node);
        let readings_before = node.io().transport.published_on(SENSOR_TOPIC).count();

        now += PERIOD_MS;
        step(&mut node, now);

        let transport = &node.io().transport;
        assert_eq!(transport.published_on(SENSOR_TOPIC).count(), readings_before + 1);
        assert_eq!((minute_of_day(&node) + 1_440 - minute_before) % 1_440, 1);

        let last = transport.published_on(SENSOR_TOPIC).last().unwrap();
        let reading: Value = serde_json::from_slice(&last.payload).unwrap();
        let presence = reading["movimento"].as_u64().unwrap();
        let memory = held_ticks(&node);
        match memory_before {
            0 => {}
            1 => {
                // Memory ran out on this tick, so the reading is a fresh draw.
                redrawn += 1;
                if presence == 1 {
                    assert!((15..45).contains(&memory), "new hold {}", memory);
                } else {
                    assert_eq!(memory, 0);
                }
            }
            m => {
                held += 1;
                assert_eq!(presence, 1);
                assert_eq!(memory, m - 1);
            }
        }
    }

    assert!(held > 0);
    assert!(redrawn > 0);
}

#[test]
fn published_hourly_figures_add_up_to_the_midnight_day_total() {
    let mut node = sim_loop(11);
    let lamp_topic = NodeConfig::default().topics.lamp_command.as_str().to_owned();
    let mut now = 0;

    for minute in 1..=1_440u32 {
        // Lamp on for the first 20 minutes of every third hour.
        match minute % 180 {
            1 => assert!(node.io_mut().transport.inject(&lamp_topic, b"ON")),
            21 => assert!(node.io_mut().transport.inject(&lamp_topic, b"OFF")),
            _ => {}
        }
        now += PERIOD_MS;
        step(&mut node, now);
    }

    let reports = payloads(&node, REPORT_TOPIC);
    assert_eq!(reports.len(), 24);
    assert_eq!(node.service().sim_time(), (0, 0));

    let wh = |r: &Value, key: &str| r[key].as_f64().unwrap();
    let hourly_sum: f64 = reports.iter().map(|r| wh(r, "consumo_wh")).sum();
    let midnight = &reports[23];
    let day_total = wh(midnight, "total_dia_wh");

    // Eight 20-minute windows of a 9 W lamp.
    let expected = 8.0 * 20.0 * f64::from(PERIOD_MS) * 9.0 / 3_600_000.0;
    assert!((day_total - expected).abs() < 1e-3, "day total {}", day_total);

    // Each published figure carries at most half a unit of the 4th decimal.
    assert!(
        (hourly_sum - day_total).abs() <= 25.0 * 0.000_05,
        "sum {} vs total {}",
        hourly_sum,
        day_total
    );
    assert!((wh(midnight, "media_dia_wh") - day_total / 24.0).abs() <= 1e-4);
    assert_eq!(node.service().daily_kwh(), 0.0);
}
