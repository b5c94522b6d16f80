//! Waiting, debouncing and throttling against a configured dispatcher.

mod common;

use std::time::Duration;

use common::TestHarness;
use morais_events::{EventError, ListenerOptions, debounce_emit, throttle_emit, wait_for_event};
use morais_test::{RecordingListener, payload};
use serde_json::json;

#[tokio::test(start_paused = true)]
async fn wait_for_event_times_out_and_cleans_up() {
    let harness = TestHarness::new();

    let timeout = Some(Duration::from_millis(50));
    let result = wait_for_event(&harness.dispatcher, "ready", timeout).await;

    assert!(matches!(
        result,
        Err(EventError::Timeout { ref event, timeout_ms: 50 }) if event == "ready"
    ));
    assert_eq!(harness.dispatcher.listener_count("ready"), 0);
    assert!(harness.dispatcher.event_names().is_empty());
}

#[tokio::test]
async fn wait_for_event_resolves_with_emitted_value() {
    let harness = TestHarness::new();
    let dispatcher = harness.dispatcher.clone();

    let waiter = tokio::spawn(async move {
        wait_for_event(&dispatcher, "ready", Some(Duration::from_secs(5))).await
    });
    while !harness.dispatcher.has_listeners("ready") {
        tokio::task::yield_now().await;
    }

    assert!(harness.dispatcher.emit("ready", payload("go")));
    assert_eq!(waiter.await.unwrap().unwrap(), json!("go"));
    assert_eq!(harness.dispatcher.listener_count("ready"), 0);
}

#[tokio::test]
async fn wait_for_event_sees_emission_before_first_poll() {
    let harness = TestHarness::new();

    let ready = wait_for_event(&harness.dispatcher, "ready", Some(Duration::from_millis(50)));
    assert!(harness.dispatcher.emit("ready", payload("go")));

    assert_eq!(ready.await.unwrap(), json!("go"));
    assert!(!harness.dispatcher.has_listeners("ready"));
}

#[tokio::test(start_paused = true)]
async fn debounce_emits_last_call_once() {
    let harness = TestHarness::new();
    let log = RecordingListener::new();
    harness
        .dispatcher
        .on("search", log.callback(), ListenerOptions::new())
        .unwrap();

    let search = debounce_emit(&harness.dispatcher, "search", Duration::from_millis(300)).unwrap();
    for (i, query) in ["s", "sa", "sau", "saud", "saude"].into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        search.call(payload(query));
    }

    tokio::time::sleep(Duration::from_millis(299)).await;
    assert_eq!(log.count(), 0);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(log.count(), 1);
    assert_eq!(log.last_args(), Some(payload("saude")));
    assert!(!search.is_pending());
}

#[tokio::test(start_paused = true)]
async fn throttle_drops_calls_inside_window() {
    let harness = TestHarness::new();
    let log = RecordingListener::new();
    harness
        .dispatcher
        .on("scroll", log.callback(), ListenerOptions::new())
        .unwrap();

    let scroll = throttle_emit(&harness.dispatcher, "scroll", Duration::from_millis(100));
    assert_eq!(scroll.call(payload(1)), Some(true));
    assert_eq!(scroll.call(payload(2)), None);

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(scroll.call(payload(3)), Some(true));

    assert_eq!(log.count(), 2);
    assert_eq!(log.last_args(), Some(payload(3)));
}
