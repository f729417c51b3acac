//! End-to-end tests for the synchronization engine

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use twinsync_core::{
    EngineConfig, RequestId, TwinBinding, TwinSyncEngine, TwinValue, ValueKind,
};

type Sent = Arc<Mutex<Vec<(String, String)>>>;

/// Transport that records every submitted fragment and accepts it
fn recording_transport() -> (Sent, impl FnMut(&TwinBinding, &str) -> bool) {
    let sent: Sent = Arc::new(Mutex::new(Vec::new()));
    let sink = sent.clone();
    let transport = move |binding: &TwinBinding, fragment: &str| {
        sink.lock()
            .unwrap()
            .push((binding.name().to_string(), fragment.to_string()));
        true
    };
    (sent, transport)
}

#[test]
fn test_integer_desired_update_full_path() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();

    let bindings = vec![
        TwinBinding::new("P", ValueKind::Integer).with_handler(move |binding| {
            handler_calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(binding.value(), Some(&TwinValue::Integer(42)));
            Ok(())
        }),
    ];
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(bindings, transport);
    engine.open();

    let updated =
        engine.handle_desired_update(br#"{"desired":{"P":{"value":42}}}"#, RequestId(5));

    assert_eq!(updated, 1);
    assert_eq!(engine.binding("P").unwrap().value(), Some(&TwinValue::Integer(42)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *sent.lock().unwrap(),
        vec![("P".to_string(), r#"{"P":42}"#.to_string())]
    );
    assert_eq!(engine.find_by_request_id(RequestId(5)).unwrap().name(), "P");
}

#[test]
fn test_unwrapped_document_matches_wrapped() {
    let (wrapped_sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![TwinBinding::new("P", ValueKind::Integer)],
        transport,
    );
    engine.open();
    assert_eq!(
        engine.handle_desired_update(br#"{"desired":{"P":{"value":42}}}"#, RequestId(1)),
        1
    );

    let (bare_sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![TwinBinding::new("P", ValueKind::Integer)],
        transport,
    );
    engine.open();
    assert_eq!(
        engine.handle_desired_update(br#"{"P":{"value":42}}"#, RequestId(1)),
        1
    );

    assert_eq!(*wrapped_sent.lock().unwrap(), *bare_sent.lock().unwrap());
}

#[test]
fn test_wrong_typed_value_is_ignored() {
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![TwinBinding::new("Q", ValueKind::Boolean)],
        transport,
    );
    engine.open();

    let updated =
        engine.handle_desired_update(br#"{"desired":{"Q":{"value":"true"}}}"#, RequestId(1));

    assert_eq!(updated, 0);
    assert_eq!(engine.binding("Q").unwrap().value(), Some(&TwinValue::Boolean(false)));
    assert!(sent.lock().unwrap().is_empty());
}

#[test]
fn test_malformed_payload_drops_message() {
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![TwinBinding::new("P", ValueKind::Integer)],
        transport,
    );
    engine.open();

    // Truncated document
    assert_eq!(
        engine.handle_desired_update(br#"{"desired":{"P":{"val"#, RequestId(1)),
        0
    );
    // Empty payload
    assert_eq!(engine.handle_desired_update(b"", RequestId(2)), 0);
    // Root is not an object
    assert_eq!(engine.handle_desired_update(b"[1,2,3]", RequestId(3)), 0);

    assert_eq!(engine.binding("P").unwrap().value(), Some(&TwinValue::Integer(0)));
    assert!(sent.lock().unwrap().is_empty());
}

#[test]
fn test_string_report_round_trip() {
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![TwinBinding::new("Mode", ValueKind::String)],
        transport,
    );
    engine.open();

    let accepted = engine
        .report_state("Mode", TwinValue::from("on"), RequestId(9))
        .unwrap();

    assert!(accepted);
    assert_eq!(
        *sent.lock().unwrap(),
        vec![("Mode".to_string(), r#"{"Mode":"on"}"#.to_string())]
    );
    // String state is not retained past the report
    assert_eq!(
        engine.binding("Mode").unwrap().value(),
        Some(&TwinValue::String(String::new()))
    );
}

#[test]
fn test_string_desired_update_clears_slot_after_report() {
    let observed = Arc::new(Mutex::new(None));
    let seen = observed.clone();

    let bindings = vec![
        TwinBinding::new("Label", ValueKind::String).with_handler(move |binding| {
            *seen.lock().unwrap() = binding.value().and_then(|v| v.as_str().map(String::from));
            Ok(())
        }),
    ];
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(bindings, transport);
    engine.open();

    engine.handle_desired_update(br#"{"desired":{"Label":{"value":"front door"}}}"#, RequestId(1));

    // The handler saw the incoming value, the report carried it, and the
    // slot was cleared once the fragment was built
    assert_eq!(observed.lock().unwrap().as_deref(), Some("front door"));
    assert_eq!(
        *sent.lock().unwrap(),
        vec![("Label".to_string(), r#"{"Label":"front door"}"#.to_string())]
    );
    assert_eq!(
        engine.binding("Label").unwrap().value(),
        Some(&TwinValue::String(String::new()))
    );
}

#[test]
fn test_request_id_is_overwritten_not_queued() {
    let (_sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![TwinBinding::new("P", ValueKind::Integer)],
        transport,
    );
    engine.open();

    engine.report_state("P", TwinValue::Integer(1), RequestId(10)).unwrap();
    engine.report_state("P", TwinValue::Integer(2), RequestId(11)).unwrap();

    assert_eq!(engine.find_by_request_id(RequestId(11)).unwrap().name(), "P");
    assert!(engine.find_by_request_id(RequestId(10)).is_none());
}

#[test]
fn test_dotted_names_address_nested_objects() {
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![TwinBinding::new("hvac.setpoint", ValueKind::Integer)],
        transport,
    );
    engine.open();

    let updated = engine.handle_desired_update(
        br#"{"desired":{"hvac":{"setpoint":{"value":20}}}}"#,
        RequestId(1),
    );

    assert_eq!(updated, 1);
    assert_eq!(
        engine.binding("hvac.setpoint").unwrap().value(),
        Some(&TwinValue::Integer(20))
    );
    assert_eq!(
        *sent.lock().unwrap(),
        vec![(
            "hvac.setpoint".to_string(),
            r#"{"hvac.setpoint":20}"#.to_string()
        )]
    );
}

#[test]
fn test_one_document_updates_every_matching_binding() {
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![
            TwinBinding::new("A", ValueKind::Integer),
            TwinBinding::new("B", ValueKind::Boolean),
            TwinBinding::new("C", ValueKind::Float),
        ],
        transport,
    );
    engine.open();

    let updated = engine.handle_desired_update(
        br#"{"desired":{"A":{"value":7},"C":{"value":2.5}}}"#,
        RequestId(1),
    );

    assert_eq!(updated, 2);
    assert_eq!(engine.binding("A").unwrap().value(), Some(&TwinValue::Integer(7)));
    assert_eq!(engine.binding("B").unwrap().value(), Some(&TwinValue::Boolean(false)));
    assert_eq!(engine.binding("C").unwrap().value(), Some(&TwinValue::from(2.5)));
    assert_eq!(sent.lock().unwrap().len(), 2);
}

#[test]
fn test_handler_error_does_not_abort_processing() {
    let bindings = vec![
        TwinBinding::new("A", ValueKind::Integer)
            .with_handler(|_| Err(anyhow::anyhow!("handler exploded"))),
        TwinBinding::new("B", ValueKind::Integer),
    ];
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(bindings, transport);
    engine.open();

    let updated = engine.handle_desired_update(
        br#"{"desired":{"A":{"value":1},"B":{"value":2}}}"#,
        RequestId(1),
    );

    // The failing handler neither vetoes its own update nor blocks B's
    assert_eq!(updated, 2);
    assert_eq!(engine.binding("A").unwrap().value(), Some(&TwinValue::Integer(1)));
    assert_eq!(engine.binding("B").unwrap().value(), Some(&TwinValue::Integer(2)));
    assert_eq!(sent.lock().unwrap().len(), 2);
}

#[test]
fn test_unknown_kind_binding_never_reaches_applier() {
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![TwinBinding::new("Broken", ValueKind::Unknown)],
        transport,
    );
    assert_eq!(engine.open(), 0);

    let updated =
        engine.handle_desired_update(br#"{"desired":{"Broken":{"value":1}}}"#, RequestId(1));

    assert_eq!(updated, 0);
    assert!(sent.lock().unwrap().is_empty());
}

#[test]
fn test_auto_report_disabled() {
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::with_config(
        vec![TwinBinding::new("P", ValueKind::Integer)],
        transport,
        EngineConfig {
            auto_report: false,
            ..EngineConfig::default()
        },
    );
    engine.open();

    let updated =
        engine.handle_desired_update(br#"{"desired":{"P":{"value":42}}}"#, RequestId(1));

    // State still applied, nothing echoed
    assert_eq!(updated, 1);
    assert_eq!(engine.binding("P").unwrap().value(), Some(&TwinValue::Integer(42)));
    assert!(sent.lock().unwrap().is_empty());
}

#[test]
fn test_oversized_payload_is_dropped() {
    let (sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::with_config(
        vec![TwinBinding::new("P", ValueKind::Integer)],
        transport,
        EngineConfig {
            max_payload_bytes: Some(8),
            ..EngineConfig::default()
        },
    );
    engine.open();

    let updated =
        engine.handle_desired_update(br#"{"desired":{"P":{"value":42}}}"#, RequestId(1));

    assert_eq!(updated, 0);
    assert_eq!(engine.binding("P").unwrap().value(), Some(&TwinValue::Integer(0)));
    assert!(sent.lock().unwrap().is_empty());
}

#[test]
fn test_acknowledge_resolves_the_reporting_binding() {
    let (_sent, transport) = recording_transport();
    let mut engine = TwinSyncEngine::new(
        vec![TwinBinding::new("P", ValueKind::Integer)],
        transport,
    );
    engine.open();
    engine.report_state("P", TwinValue::Integer(3), RequestId(21)).unwrap();

    assert_eq!(engine.acknowledge(RequestId(21), 200).unwrap().name(), "P");
    assert!(engine.acknowledge(RequestId(99), 200).is_none());
}
