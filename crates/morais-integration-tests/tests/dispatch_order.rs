//! Delivery order, one-shot listeners and subscription handles.

mod common;

use common::TestHarness;
use morais_events::{Callback, ListenerOptions};
use morais_test::{RecordingListener, noop_callback, payload};

#[test]
fn priorities_run_highest_first_with_same_payload() {
    let harness = TestHarness::new();
    let log = RecordingListener::new();

    for (label, priority) in [("p1", 1), ("p5", 5), ("p0", 0)] {
        harness
            .dispatcher
            .on(
                "score",
                log.labeled(label).callback(),
                ListenerOptions::new().with_priority(priority),
            )
            .unwrap();
    }

    assert!(harness.dispatcher.emit("score", payload(42)));

    assert_eq!(log.labels(), vec!["p5", "p1", "p0"]);
    assert!(log.calls().iter().all(|call| call.args == payload(42)));
}

#[test]
fn once_listener_fires_exactly_once() {
    let harness = TestHarness::new();
    let log = RecordingListener::new();

    harness
        .dispatcher
        .once("ready", log.callback(), ListenerOptions::new())
        .unwrap();

    assert!(harness.dispatcher.emit("ready", payload(true)));
    assert!(!harness.dispatcher.emit("ready", payload(true)));
    assert_eq!(log.count(), 1);
    assert_eq!(harness.dispatcher.listener_count("ready"), 0);
}

#[test]
fn unsubscribe_twice_is_harmless() {
    let harness = TestHarness::new();
    let log = RecordingListener::new();
    let subscription = harness
        .dispatcher
        .on("tick", log.callback(), ListenerOptions::new())
        .unwrap();

    assert!(subscription.unsubscribe());
    assert!(!subscription.unsubscribe());
    assert!(!harness.dispatcher.emit("tick", vec![]));
    assert_eq!(log.count(), 0);
}

#[test]
fn off_during_emit_does_not_skip_snapshot() {
    let harness = TestHarness::new();
    let log = RecordingListener::new();
    let sibling = log.labeled("sibling").callback();

    let dispatcher = harness.dispatcher.clone();
    let target = sibling.clone();
    let remover = Callback::new(move |event| {
        dispatcher.off(event.name(), &target);
        Ok(())
    });

    harness
        .dispatcher
        .on(
            "lesson:completed",
            log.labeled("first").callback(),
            ListenerOptions::new().with_priority(2),
        )
        .unwrap();
    harness
        .dispatcher
        .on(
            "lesson:completed",
            remover.clone(),
            ListenerOptions::new().with_priority(1),
        )
        .unwrap();
    harness
        .dispatcher
        .on("lesson:completed", sibling, ListenerOptions::new())
        .unwrap();

    harness.dispatcher.emit("lesson:completed", vec![]);
    assert_eq!(log.labels(), vec!["first", "sibling"]);

    harness.dispatcher.emit("lesson:completed", vec![]);
    assert_eq!(log.labels(), vec!["first", "sibling", "first"]);

    // The remover captures the dispatcher; break the cycle.
    assert!(harness.dispatcher.off("lesson:completed", &remover));
}

#[test]
fn emit_without_listeners_returns_false() {
    let harness = TestHarness::new();
    assert!(!harness.dispatcher.emit("nobody-listens", payload(1)));
}

#[test]
fn remove_all_listeners_clears_event_names() {
    let harness = TestHarness::new();
    for event in ["a", "b", "quiz:answered"] {
        harness
            .dispatcher
            .on(event, noop_callback(), ListenerOptions::new())
            .unwrap();
    }

    assert_eq!(harness.dispatcher.remove_all_listeners(None), 3);
    assert!(harness.dispatcher.event_names().is_empty());
}

#[test]
fn namespaced_listener_ignores_bare_event() {
    let harness = TestHarness::new();
    let log = RecordingListener::new();
    let auth = harness.dispatcher.namespace("auth");

    auth.on("login", log.callback(), ListenerOptions::new()).unwrap();

    assert!(!harness.dispatcher.emit("login", morais_test::login("ana")));
    assert_eq!(log.count(), 0);

    assert!(
        harness
            .dispatcher
            .namespace("auth")
            .emit("login", morais_test::login("ana"))
    );
    assert_eq!(log.last_args(), Some(morais_test::login("ana")));
    assert_eq!(log.calls()[0].event, "auth:login");
}
