use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use flutter_greeter::{
    bridge::{PortId, ERROR_PREFIX},
    conf, Executor, PortBridge, Request,
};
use futures::{channel::mpsc, future};

use crate::ChannelSink;

type Received = mpsc::UnboundedReceiver<(PortId, String)>;

fn bridge(
    refuse: bool,
) -> (PortBridge<ChannelSink>, Received, Arc<AtomicUsize>) {
    let executor = Executor::new(&conf::Executor::default()).unwrap();
    let (sink, rx, posts) = ChannelSink::new(refuse);
    (PortBridge::new(sink, executor), rx, posts)
}

/// Drains all the messages received so far.
fn drain(rx: &mut Received) -> Vec<(PortId, String)> {
    let mut out = Vec::new();
    while let Ok(Some(msg)) = rx.try_next() {
        out.push(msg);
    }
    out
}

fn say_hi(name: &str) -> Request {
    Request::SayHi { name: name.into() }
}

fn say_hi_with_duration(name: &str, duration: &str) -> Request {
    Request::SayHiWithDuration {
        name: name.into(),
        duration: duration.into(),
    }
}

#[tokio::test]
async fn delivers_greeting_to_named_port() {
    let (bridge, mut rx, _) = bridge(false);

    assert!(bridge.dispatch(42, say_hi("Alice")).await.unwrap());

    assert_eq!(drain(&mut rx), vec![(42, "Hi Alice!".to_owned())]);
}

#[tokio::test]
async fn delivers_error_instead_of_greeting() {
    let (bridge, mut rx, _) = bridge(false);

    for (port, dur) in [(1, "abc"), (2, "10"), (3, "10y"), (4, "")].iter() {
        assert!(bridge
            .dispatch(*port, say_hi_with_duration("Bob", dur))
            .await
            .unwrap());
    }

    let messages = drain(&mut rx);
    assert_eq!(messages.len(), 4);
    for (_, msg) in &messages {
        assert!(msg.starts_with(ERROR_PREFIX), "not an error: {}", msg);
        assert!(!msg.contains("Hi Bob!"));
    }
    assert_eq!(messages[0].1, r#"Error: time: invalid duration "abc""#);
    assert_eq!(
        messages[1].1,
        r#"Error: time: missing unit in duration "10""#,
    );
    assert_eq!(
        messages[2].1,
        r#"Error: time: unknown unit "y" in duration "10y""#,
    );
    assert_eq!(messages[3].1, r#"Error: time: invalid duration """#);
}

#[tokio::test]
async fn delivers_only_after_duration_elapses() {
    let (bridge, mut rx, _) = bridge(false);
    let start = Instant::now();

    let delivery = bridge.dispatch(7, say_hi_with_duration("Carol", "300ms"));
    assert!(start.elapsed() < Duration::from_millis(300));
    assert!(drain(&mut rx).is_empty());

    assert!(delivery.await.unwrap());

    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(drain(&mut rx), vec![(7, "Hi Carol!".to_owned())]);
}

#[tokio::test]
async fn delivers_exactly_one_message_per_request() {
    let (bridge, mut rx, posts) = bridge(false);

    let deliveries: Vec<_> = (0..20)
        .map(|port| {
            let req = match port % 3 {
                0 => say_hi("Dave"),
                1 => say_hi_with_duration("Dave", "20ms"),
                _ => say_hi_with_duration("Dave", "twenty"),
            };
            bridge.dispatch(port, req)
        })
        .collect();
    let delivered = future::try_join_all(deliveries).await.unwrap();

    assert!(delivered.into_iter().all(|d| d));
    assert_eq!(posts.load(Ordering::SeqCst), 20);
    let mut per_port = HashMap::new();
    for (port, _) in drain(&mut rx) {
        *per_port.entry(port).or_insert(0) += 1;
    }
    assert_eq!(per_port.len(), 20);
    assert!(per_port.values().all(|count| *count == 1));
}

#[tokio::test]
async fn runs_requests_concurrently() {
    let (bridge, mut rx, _) = bridge(false);
    let start = Instant::now();

    let deliveries: Vec<_> = (0..5)
        .map(|port| {
            bridge.dispatch(port, say_hi_with_duration("Eve", "300ms"))
        })
        .collect();
    future::try_join_all(deliveries).await.unwrap();

    assert!(start.elapsed() < Duration::from_millis(5 * 300));
    assert_eq!(drain(&mut rx).len(), 5);
}

#[tokio::test]
async fn does_not_retry_refused_message() {
    let (bridge, mut rx, posts) = bridge(true);

    assert!(!bridge.dispatch(9, say_hi("Frank")).await.unwrap());

    assert_eq!(posts.load(Ordering::SeqCst), 1);
    assert!(drain(&mut rx).is_empty());
}
