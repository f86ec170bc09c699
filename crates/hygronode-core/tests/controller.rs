//! End-to-end tests for the duty-cycle controller.
//!
//! Every test drives a [`Controller`] built from the in-memory mocks, with
//! tokio's clock paused so sample periods and retry delays elapse instantly.

use std::time::Duration;

use hygronode_core::{
    AssociationPolicy, Controller, Decision, Error, FixedClock, MessageKind, MockDisplay,
    MockSensor, MockTransport, NodeConfig, PolicyConfig, Reading, SensorFault, TransmitOutcome,
    TransmitReason,
};

const EPOCH: i64 = 1_700_000_000;

type TestNode = Controller<MockSensor, MockDisplay, MockTransport, FixedClock>;

/// Log output is shown for failing tests; set `RUST_LOG=debug` for decisions.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn node_with(config: NodeConfig, sensor: MockSensor) -> TestNode {
    init_tracing();
    Controller::new(config, sensor, MockDisplay::new(), MockTransport::new())
        .unwrap()
        .with_clock(FixedClock::new(EPOCH))
}

fn node(sensor: MockSensor) -> TestNode {
    node_with(NodeConfig::default(), sensor)
}

fn quiet_config() -> NodeConfig {
    NodeConfig::default().policy(PolicyConfig::default().initial_budget(0))
}

fn reading(temperature_c: i32, humidity_percent: u8) -> Reading {
    Reading::new(temperature_c, humidity_percent).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_boot_budget_transmits_first_ten_cycles() {
    let mut node = node(MockSensor::new(reading(21, 45)));
    node.boot().await.unwrap();

    let mut decisions = Vec::new();
    for _ in 0..12 {
        decisions.push(node.run_cycle().await.decision);
    }

    for decision in &decisions[..10] {
        assert_eq!(*decision, Decision::Transmit(TransmitReason::Budget));
    }
    assert_eq!(decisions[10], Decision::Skip);
    assert_eq!(decisions[11], Decision::Skip);
    assert_eq!(node.stats().transmissions, 10);
    assert_eq!(node.stats().skips, 2);
    assert_eq!(node.transport().sent_payloads().len(), 20);
}

#[tokio::test(start_paused = true)]
async fn test_boot_joins_network_and_sleeps_radio() {
    let mut node = node(MockSensor::new(reading(21, 45)));
    node.boot().await.unwrap();

    assert!(node.display().is_initialized());
    assert_eq!(node.reading(), Some(&reading(21, 45)));
    assert_eq!(node.transport().wake_count(), 1);
    assert_eq!(node.transport().sleep_count(), 1);
    assert!(node.transport().sent_payloads().is_empty());
    assert!(!node.transport().is_awake());
}

#[tokio::test(start_paused = true)]
async fn test_boot_survives_missing_sensor() {
    let mut node = node(MockSensor::absent());

    let start = tokio::time::Instant::now();
    node.boot().await.unwrap();

    // One initial probe plus ten retries, one second apart.
    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(node.sensor().sample_count(), 11);
    assert!(node.reading().is_none());
    assert_eq!(node.stats().sensor_faults, 1);
}

#[tokio::test]
async fn test_display_init_failure_is_fatal() {
    let mut node = Controller::new(
        NodeConfig::default(),
        MockSensor::new(reading(21, 45)),
        MockDisplay::broken(),
        MockTransport::new(),
    )
    .unwrap();

    let err = node.boot().await.unwrap_err();
    assert!(matches!(err, Error::DisplayInit(_)));
    assert!(node.transport().events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_bounded_boot_association_failure_is_not_fatal() {
    let config = NodeConfig::default()
        .boot_association(AssociationPolicy::bounded(2, Duration::from_secs(5)));
    let mut node = Controller::new(
        config,
        MockSensor::new(reading(21, 45)),
        MockDisplay::new(),
        MockTransport::new().with_association_failures(u32::MAX),
    )
    .unwrap();

    node.boot().await.unwrap();
    assert_eq!(node.stats().association_attempts, 2);
    assert_eq!(node.transport().sleep_count(), 1);
}

#[tokio::test]
async fn test_payloads_are_exact_and_parse_back() {
    let mut node = node(MockSensor::new(reading(23, 41)));
    node.run_cycle().await;

    assert_eq!(
        node.transport().sent_payloads(),
        vec![
            r#"{ "id": "1", "epoch": "1700000000", "type": "humidity", "data": "41"}"#,
            r#"{ "id": "1", "epoch": "1700000000", "type": "temperature", "data": "23"}"#,
        ]
    );

    let messages = node.transport().sent_messages().unwrap();
    assert_eq!(messages[0].kind, MessageKind::Humidity);
    assert_eq!(messages[0].data, 41);
    assert_eq!(messages[1].kind, MessageKind::Temperature);
    assert_eq!(messages[1].data, 23);
    for message in &messages {
        assert_eq!(message.id, "1");
        assert_eq!(message.epoch, EPOCH);
    }
}

#[tokio::test]
async fn test_payloads_go_to_multicast_group() {
    let mut node = node(MockSensor::new(reading(23, 41)));
    node.run_cycle().await;

    for event in node.transport().events() {
        if let hygronode_core::TransportEvent::Sent { target, .. } = event {
            assert_eq!(target.to_string(), "239.0.10.1:10000");
        }
    }
}

#[tokio::test]
async fn test_epoch_follows_clock() {
    let mut node = node(MockSensor::new(reading(23, 41)));
    node.run_cycle().await;
    node.clock_mut().advance(60);
    node.run_cycle().await;

    let epochs: Vec<_> = node
        .transport()
        .sent_messages()
        .unwrap()
        .iter()
        .map(|m| m.epoch)
        .collect();
    assert_eq!(epochs, vec![EPOCH, EPOCH, EPOCH + 60, EPOCH + 60]);
}

#[tokio::test]
async fn test_sensor_failure_keeps_previous_reading() {
    let sensor = MockSensor::new(reading(30, 30))
        .then(reading(22, 45))
        .then_fail(SensorFault::Timeout);
    let mut node = node(sensor);

    let first = node.run_cycle().await;
    let second = node.run_cycle().await;

    assert!(first.sampled);
    assert!(!second.sampled);
    assert_eq!(second.humidity, Some(45));
    assert_eq!(node.reading(), Some(&reading(22, 45)));
    assert_eq!(node.stats().sensor_faults, 1);

    let payloads = node.transport().sent_payloads();
    assert_eq!(payloads.len(), 4);
    assert_eq!(payloads[2], payloads[0]);
}

#[tokio::test(start_paused = true)]
async fn test_no_reading_sends_nothing_but_cycles_radio() {
    let mut node = node(MockSensor::absent());
    node.boot().await.unwrap();
    node.transport_mut().clear();

    let report = node.run_cycle().await;

    assert_eq!(report.decision, Decision::Transmit(TransmitReason::Budget));
    assert_eq!(report.outcome, TransmitOutcome::NoReading);
    assert!(node.transport().sent_payloads().is_empty());
    assert_eq!(node.transport().wake_count(), 1);
    assert_eq!(node.transport().sleep_count(), 1);
}

#[tokio::test]
async fn test_send_failure_drops_rest_and_sleeps() {
    let mut node = node(MockSensor::new(reading(22, 45)));
    node.transport_mut().fail_sends(1);

    let report = node.run_cycle().await;

    assert_eq!(report.outcome, TransmitOutcome::SendFailed { sent: 0 });
    assert!(node.transport().sent_payloads().is_empty());
    assert_eq!(node.transport().sleep_count(), 1);
    assert!(!node.transport().is_awake());
    assert_eq!(node.stats().send_failures, 1);

    // The next event is unaffected.
    let report = node.run_cycle().await;
    assert_eq!(report.outcome, TransmitOutcome::Sent);
}

#[tokio::test(start_paused = true)]
async fn test_bounded_association_failure_skips_sends() {
    let config = NodeConfig::default()
        .association(AssociationPolicy::bounded(3, Duration::from_millis(500)));
    let mut node = node_with(config, MockSensor::new(reading(22, 45)));
    node.transport_mut().fail_associations(u32::MAX);

    let start = tokio::time::Instant::now();
    let report = node.run_cycle().await;

    assert_eq!(report.outcome, TransmitOutcome::AssociationFailed { attempts: 3 });
    assert_eq!(start.elapsed(), Duration::from_millis(1000));
    assert!(node.transport().sent_payloads().is_empty());
    assert_eq!(node.transport().sleep_count(), 1);
    assert!(!node.transport().is_awake());
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_association_waits_for_network() {
    let mut node = node(MockSensor::new(reading(22, 45)));
    node.transport_mut().fail_associations(4);

    let start = tokio::time::Instant::now();
    let report = node.run_cycle().await;

    assert_eq!(report.outcome, TransmitOutcome::Sent);
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(node.stats().association_attempts, 5);
}

#[tokio::test]
async fn test_skip_leaves_radio_untouched() {
    let mut node = node_with(quiet_config(), MockSensor::new(reading(22, 45)));
    let report = node.run_cycle().await;

    assert_eq!(report.outcome, TransmitOutcome::Skipped);
    assert!(node.transport().events().is_empty());
}

#[tokio::test]
async fn test_radio_always_returns_to_sleep() {
    let sensor = MockSensor::with_humidity_sequence([60, 45, 35, 45, 55, 45, 45, 45, 45, 45, 45]);
    let mut node = node_with(quiet_config(), sensor);

    for _ in 0..11 {
        node.run_cycle().await;
        assert_eq!(
            node.transport().wake_count(),
            node.transport().sleep_count()
        );
        assert!(!node.transport().is_awake());
    }
}

#[tokio::test]
async fn test_hysteresis_through_controller() {
    let sensor = MockSensor::with_humidity_sequence([45, 35, 45, 55, 45, 45, 45, 45, 45, 45, 45]);
    let mut node = node_with(quiet_config(), sensor);

    let mut decisions = Vec::new();
    for _ in 0..11 {
        decisions.push(node.run_cycle().await.decision);
    }

    use TransmitReason::*;
    assert_eq!(
        decisions,
        vec![
            Decision::Skip,
            Decision::Transmit(BelowLow),
            Decision::Transmit(DeadZoneOn),
            Decision::Transmit(AboveHigh),
            Decision::Transmit(Budget),
            Decision::Transmit(Budget),
            Decision::Transmit(Budget),
            Decision::Transmit(Budget),
            Decision::Transmit(Budget),
            Decision::Skip,
            Decision::Skip,
        ]
    );
    assert!(!node.policy().humidifier_on());
}

#[tokio::test]
async fn test_high_readings_always_transmit() {
    let sensor = MockSensor::with_humidity_sequence([60, 60, 45, 35, 45, 60]);
    let mut node = node_with(quiet_config(), sensor);

    let mut decisions = Vec::new();
    for _ in 0..6 {
        decisions.push(node.run_cycle().await.decision);
    }

    assert_eq!(decisions[0], Decision::Transmit(TransmitReason::AboveHigh));
    assert!(decisions.iter().all(|d| d.is_transmit()));
    assert!(!node.policy().humidifier_on());
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_after_quiet_stretch() {
    let sensor = MockSensor::new(reading(21, 45));
    let mut node = node_with(quiet_config(), sensor);

    let start = tokio::time::Instant::now();
    let last = node.run_for(21).await.unwrap();

    assert_eq!(last.decision, Decision::Transmit(TransmitReason::Periodic));
    assert_eq!(node.stats().transmissions, 1);
    assert_eq!(node.stats().skips, 20);
    assert_eq!(start.elapsed(), Duration::from_secs(20 * 60));
}

#[tokio::test]
async fn test_run_for_zero_cycles_does_nothing() {
    let mut node = node(MockSensor::new(reading(21, 45)));
    assert!(node.run_for(0).await.is_none());
    assert_eq!(node.stats().cycles, 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_until_stops_between_cycles() {
    let mut node = node_with(quiet_config(), MockSensor::new(reading(21, 45)));

    node.run_until(tokio::time::sleep(Duration::from_secs(150))).await;

    // Cycles at t = 0, 60 and 120 s.
    assert_eq!(node.stats().cycles, 3);
    assert!(!node.transport().is_awake());
}

#[tokio::test]
async fn test_frames_show_activity_sequence() {
    let mut node = node_with(quiet_config(), MockSensor::new(reading(22, 35)));
    node.run_cycle().await;

    let icons: Vec<_> = node.display().frames().iter().map(|f| f.icons).collect();
    assert!(icons[0].sensing);
    assert!(!icons[1].sensing && !icons[1].network);
    assert!(icons[2].network && !icons[2].transmitting);
    assert!(icons[3].transmitting);
    assert!(icons[4].network && !icons[4].transmitting);
    assert!(!icons[5].network);
    assert_eq!(icons.len(), 6);

    let last = node.display().last().unwrap().compose();
    assert_eq!(last.to_string(), "[Humidity] 35% [Temperature] 71F");
}
