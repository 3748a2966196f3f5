//! Integration tests for the NodeService → energy → report pipeline.

use crate::mock_hw::{FixedSensors, MockLamp, RecordingSink, fast_config};

use lightnode::app::commands::LampCommand;
use lightnode::app::events::AppEvent;
use lightnode::app::service::{LightingNodeState, NodeService};
use lightnode::config::NodeConfig;
use lightnode::report::ConsumptionReport;

const EPS: f64 = 1e-12;

fn make_service(config: &NodeConfig) -> (NodeService, MockLamp, FixedSensors, RecordingSink) {
    let mut svc = NodeService::new(config, 0);
    let mut sink = RecordingSink::default();
    svc.start(&mut sink);
    (svc, MockLamp::default(), FixedSensors::default(), sink)
}

#[test]
fn nine_watt_lamp_for_two_minutes_is_0_0003_kwh() {
    let cfg = NodeConfig::default();
    let (mut svc, mut lamp, _, mut sink) = make_service(&cfg);

    svc.handle_command(LampCommand::On, 0, &mut lamp, &mut sink);
    svc.handle_command(LampCommand::Off, 120_000, &mut lamp, &mut sink);

    assert!((svc.current_kwh(500_000) - 0.0003).abs() < EPS);
    assert_eq!(svc.accumulated_on_ms(500_000), 120_000);
    assert_eq!(lamp.writes, vec![true, false]);
}

#[test]
fn consumption_is_folded_while_lamp_stays_on() {
    let cfg = NodeConfig::default();
    let (mut svc, mut lamp, _, mut sink) = make_service(&cfg);
    svc.handle_command(LampCommand::On, 1_000, &mut lamp, &mut sink);

    let a = svc.current_kwh(61_000);
    let b = svc.current_kwh(121_000);
    assert!((a - 0.00015).abs() < EPS);
    assert!((b - 0.0003).abs() < EPS);
}

#[test]
fn off_while_off_changes_nothing_but_drives_output() {
    let cfg = NodeConfig::default();
    let (mut svc, mut lamp, _, mut sink) = make_service(&cfg);

    svc.handle_command(LampCommand::Off, 5_000, &mut lamp, &mut sink);

    assert!(!svc.lamp_on());
    assert_eq!(svc.accumulated_on_ms(10_000), 0);
    assert_eq!(lamp.writes, vec![false]);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LampChanged { .. })), 0);
}

#[test]
fn repeated_on_does_not_restart_interval() {
    let cfg = NodeConfig::default();
    let (mut svc, mut lamp, _, mut sink) = make_service(&cfg);
    svc.handle_command(LampCommand::On, 0, &mut lamp, &mut sink);
    svc.handle_command(LampCommand::On, 30_000, &mut lamp, &mut sink);
    assert_eq!(svc.accumulated_on_ms(60_000), 60_000);
    assert_eq!(sink.count(|e| *e == AppEvent::LampChanged { on: true }), 1);
}

#[test]
fn one_report_per_hour_under_repeated_polling() {
    let cfg = fast_config();
    let (mut svc, _, mut sensors, mut sink) = make_service(&cfg);

    let mut reports = 0;
    for now in 1..=180u32 {
        svc.advance_clock(now, &mut sensors);
        for _ in 0..5 {
            if svc.poll_report(now, &mut sink, |_| {}).is_some() {
                reports += 1;
            }
        }
    }
    assert_eq!(reports, 3);
    assert_eq!(sensors.minute_ticks, 180);
    assert_eq!(svc.sim_time(), (3, 0));
}

#[test]
fn a_full_day_conserves_energy_and_closes_at_midnight() {
    let cfg = fast_config();
    let (mut svc, mut lamp, mut sensors, mut sink) = make_service(&cfg);

    let mut reports: Vec<ConsumptionReport> = Vec::new();
    for now in 1..=1440u32 {
        // On for the first 20 minutes of every hour.
        match now % 60 {
            1 => svc.handle_command(LampCommand::On, now, &mut lamp, &mut sink),
            21 => svc.handle_command(LampCommand::Off, now, &mut lamp, &mut sink),
            _ => {}
        }
        svc.advance_clock(now, &mut sensors);
        if let Some(r) = svc.poll_report(now, &mut sink, |_| {}) {
            reports.push(r);
        }
    }

    assert_eq!(reports.len(), 24);
    let last = reports.last().unwrap();
    assert!(last.closes_day);
    assert_eq!(last.hour, 0);
    assert!(reports[..23].iter().all(|r| !r.closes_day));

    let sum_period: f64 = reports.iter().map(|r| r.metrics.period_kwh).sum();
    assert!((sum_period - last.metrics.cumulative_kwh).abs() < 1e-9);
    assert!((sum_period - last.metrics.daily_kwh).abs() < 1e-9);
    assert!((last.metrics.daily_avg_wh - last.daily_total_wh() / 24.0).abs() < 1e-9);

    // Closed after hand-off.
    assert_eq!(svc.daily_kwh(), 0.0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::DayClosed { .. })), 1);
}

#[test]
fn midnight_hand_off_sees_whole_day_before_reset() {
    let cfg = fast_config();
    let state = LightingNodeState::new(&cfg, 0).with_time_of_day(23, 30);
    let mut svc = NodeService::from_state(&cfg, state);
    let (mut lamp, mut sensors, mut sink) =
        (MockLamp::default(), FixedSensors::default(), RecordingSink::default());
    svc.handle_command(LampCommand::On, 0, &mut lamp, &mut sink);

    for now in 1..=30u32 {
        svc.advance_clock(now, &mut sensors);
    }

    let mut daily_in_hand_off = 0.0;
    let report = svc
        .poll_report(30, &mut sink, |r| daily_in_hand_off = r.metrics.daily_kwh)
        .expect("midnight report");
    assert!(report.closes_day);
    assert!(daily_in_hand_off > 0.0);
    assert_eq!(svc.daily_kwh(), 0.0);

    // Event order: report first, then the closeout.
    let tail: Vec<_> = sink.events.iter().rev().take(2).collect();
    assert!(matches!(tail[0], AppEvent::DayClosed { .. }));
    assert!(matches!(tail[1], AppEvent::Report(_)));
}

#[test]
fn cumulative_survives_day_closeout() {
    let cfg = fast_config();
    let state = LightingNodeState::new(&cfg, 0).with_time_of_day(23, 0);
    let mut svc = NodeService::from_state(&cfg, state);
    let (mut lamp, mut sensors, mut sink) =
        (MockLamp::default(), FixedSensors::default(), RecordingSink::default());
    svc.handle_command(LampCommand::On, 0, &mut lamp, &mut sink);

    for now in 1..=60u32 {
        svc.advance_clock(now, &mut sensors);
    }
    let midnight = svc.poll_report(60, &mut sink, |_| {}).unwrap();
    for now in 61..=120u32 {
        svc.advance_clock(now, &mut sensors);
    }
    let one_am = svc.poll_report(120, &mut sink, |_| {}).unwrap();

    assert!(one_am.metrics.cumulative_kwh > midnight.metrics.cumulative_kwh);
    assert!((one_am.metrics.daily_kwh - one_am.metrics.period_kwh).abs() < EPS);
}

#[test]
fn counter_wrap_between_commands() {
    let cfg = NodeConfig::default();
    let mut svc = NodeService::new(&cfg, u32::MAX - 59_999);
    let (mut lamp, mut sink) = (MockLamp::default(), RecordingSink::default());
    svc.handle_command(LampCommand::On, u32::MAX - 59_999, &mut lamp, &mut sink);
    svc.handle_command(LampCommand::Off, 60_000, &mut lamp, &mut sink);
    assert_eq!(svc.accumulated_on_ms(60_000), 120_000);
}
