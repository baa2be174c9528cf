//! Behaviour of the public `Dispatcher` API end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use typebus::{DispatchError, Dispatcher, Event, ListenerError, ListenerOptions};

struct Data;
impl Event for Data {
    const NAME: &'static str = "data";
    type Payload = String;
}

struct Test;
impl Event for Test {
    const NAME: &'static str = "test";
    type Payload = String;
}

fn text(s: &str) -> String {
    s.to_string()
}

/// Records payloads it was called with.
#[derive(Clone, Default)]
struct Spy(Arc<Mutex<Vec<String>>>);

impl Spy {
    fn listener(&self) -> impl Fn(&String) -> Result<(), ListenerError> + Send + Sync + 'static {
        let calls = Arc::clone(&self.0);
        move |p| {
            calls.lock().unwrap().push(p.clone());
            Ok(())
        }
    }

    fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[test]
fn test_listener_receives_payload() {
    let bus = Dispatcher::new();
    let spy = Spy::default();
    bus.on(Data, spy.listener());

    bus.emit(Data, &text("test")).unwrap();
    assert_eq!(spy.calls(), vec!["test"]);
}

#[test]
fn test_listener_ignores_other_events() {
    let bus = Dispatcher::new();
    let spy = Spy::default();
    bus.on(Data, spy.listener());

    bus.emit(Test, &text("testing")).unwrap();
    assert!(spy.calls().is_empty());
}

#[test]
fn test_removed_listener_is_not_invoked() {
    let bus = Dispatcher::new();
    let spy = Spy::default();
    let id = bus.on(Data, spy.listener());

    bus.emit(Data, &text("test")).unwrap();
    assert!(bus.off(Data, id));
    bus.emit(Data, &text("test")).unwrap();
    assert_eq!(spy.calls().len(), 1);
}

#[test]
fn test_priority_scenario() {
    let bus = Dispatcher::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let o = Arc::clone(&order);
    bus.on(Data, move |_| {
        o.lock().unwrap().push("A");
        Ok(())
    });
    let o = Arc::clone(&order);
    bus.on_with(
        Data,
        move |_| {
            o.lock().unwrap().push("B");
            Ok(())
        },
        ListenerOptions::new().with_priority(5),
    );

    bus.emit(Data, &text("x")).unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["B", "A"]);
}

#[tokio::test(start_paused = true)]
async fn test_async_listener_is_awaited() {
    let bus = Dispatcher::new();
    let spy = Spy::default();
    let calls = Arc::clone(&spy.0);
    bus.on_async(Data, move |p| {
        let calls = Arc::clone(&calls);
        async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            calls.lock().unwrap().push(p);
            Ok(())
        }
    });

    bus.emit_async(Data, &text("test")).await.unwrap();
    assert_eq!(spy.calls(), vec!["test"]);
}

#[tokio::test(start_paused = true)]
async fn test_async_listeners_overlap() {
    let bus = Dispatcher::new();
    bus.on_async(Data, |_| async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    });
    bus.on_async(Data, |_| async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    });

    let start = tokio::time::Instant::now();
    bus.emit_async(Data, &text("x")).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(300), "{elapsed:?}");
}

#[test]
fn test_remove_all_listeners_for_event() {
    let bus = Dispatcher::new();
    let (a, b) = (Spy::default(), Spy::default());
    bus.on(Data, a.listener());
    bus.on(Data, b.listener());

    bus.remove_all_listeners_for(Data);
    bus.emit(Data, &text("test")).unwrap();

    assert!(a.calls().is_empty());
    assert!(b.calls().is_empty());
    assert!(!bus.has_listeners(Data));
}

#[test]
fn test_remove_all_listeners() {
    let bus = Dispatcher::new();
    let (a, b) = (Spy::default(), Spy::default());
    bus.on(Data, a.listener());
    bus.on(Test, b.listener());

    bus.remove_all_listeners();
    bus.emit(Data, &text("test")).unwrap();
    bus.emit(Test, &text("test")).unwrap();

    assert!(a.calls().is_empty());
    assert!(b.calls().is_empty());
    assert!(bus.event_names().is_empty());
}

#[tokio::test]
async fn test_failures_do_not_escape_without_abort() {
    let bus = Dispatcher::new();
    bus.on(Data, |_| Err(ListenerError::fail("test")));

    assert_eq!(bus.emit(Data, &text("test")).unwrap().len(), 1);
    assert_eq!(bus.emit_async(Data, &text("test")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_abort_fails_both_emission_paths() {
    let bus = Dispatcher::new();
    let second = Spy::default();
    bus.on_with(
        Data,
        |_| Err(ListenerError::fail("test error")),
        ListenerOptions::new().abort_all_on_error(),
    );
    bus.on(Data, second.listener());

    let err = bus.emit(Data, &text("test")).unwrap_err();
    assert!(matches!(err, DispatchError::Aborted { event: "data", .. }));
    assert_eq!(err.to_string(), "emission of 'data' aborted: test error");
    assert!(second.calls().is_empty());

    assert!(bus.emit_async(Data, &text("test")).await.is_err());
}

#[test]
fn test_global_error_handler_is_called() {
    let bus = Dispatcher::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    bus.set_error_handler(move |_, event, _| {
        assert_eq!(event, "data");
        c.fetch_add(1, Ordering::SeqCst);
    });
    bus.on(Data, |_| Err(ListenerError::fail("test")));

    bus.emit(Data, &text("test")).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_emit_returns_errors_in_order() {
    let bus = Dispatcher::new();
    bus.on(Data, |_| Err(ListenerError::fail("test")));
    bus.on(Data, |_| Err(ListenerError::fail("test2")));

    let errors = bus.emit(Data, &text("test")).unwrap();
    let messages: Vec<&str> = errors.iter().map(ListenerError::as_message).collect();
    assert_eq!(messages, vec!["test", "test2"]);
}

#[test]
fn test_contained_error_scenario() {
    let bus = Dispatcher::new();
    let second = Spy::default();
    bus.on(Data, |_| Err(ListenerError::fail("boom")));
    bus.on(Data, second.listener());

    let errors = bus.emit(Data, &text("x")).unwrap();
    assert_eq!(errors, vec![ListenerError::fail("boom")]);
    assert_eq!(second.calls(), vec!["x"]);
}

#[test]
fn test_on_error_receives_error_and_payload() {
    let bus = Dispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    bus.on_with(
        Data,
        |_| Err(ListenerError::fail("test")),
        ListenerOptions::new().with_on_error(move |err, payload: &String| {
            s.lock().unwrap().push((err.clone(), payload.clone()));
        }),
    );

    bus.emit(Data, &text("test")).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(ListenerError::fail("test"), text("test"))]
    );
}

#[test]
fn test_on_error_runs_before_abort() {
    let bus = Dispatcher::new();
    let hooked = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hooked);
    bus.on_with(
        Data,
        |_| Err(ListenerError::fail("test")),
        ListenerOptions::new()
            .abort_all_on_error()
            .with_on_error(move |_, _| {
                h.fetch_add(1, Ordering::SeqCst);
            }),
    );

    assert!(bus.emit(Data, &text("test")).is_err());
    assert_eq!(hooked.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dispatchers_are_independent() {
    let (one, two) = (Dispatcher::new(), Dispatcher::new());
    let spy = Spy::default();
    one.on(Data, spy.listener());

    two.emit(Data, &text("x")).unwrap();
    assert!(spy.calls().is_empty());
    assert_eq!(two.listener_count(Data), 0);
    assert_eq!(one.listener_count(Data), 1);
}
