//! Integration tests for the IPC layer
//!
//! These tests verify:
//! - Nested composite transactions flush as one ordered batch
//! - Correlated queries over a real loopback UDP socket
//! - Inbound command routing from the receive loop
//! - Polling watcher cancellation

mod common;

use avatar_config_sync::ipc::names::{query, receive, send};
use avatar_config_sync::ipc::{
    CommandArray, CompositeScope, PollingWatcher, TransportError, UdpTransport, spawn_receiver,
};
use avatar_config_sync::{Message, MessageChannel, Metrics};
use common::stack;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

#[test]
fn test_nested_composite_flushes_once_in_order() {
    let stack = stack();
    let sender = stack.sender.as_ref();

    sender.start_composite();
    sender.send_message(Message::new("A", "1"));
    sender.send_message(Message::new("B", "2"));
    sender.start_composite();
    sender.send_message(Message::new("C", "3"));
    sender.end_composite();
    assert!(stack.transport.raw().is_empty());
    sender.send_message(Message::new("D", "4"));
    sender.end_composite();

    let raw = stack.transport.messages();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].command, send::COMMAND_ARRAY);
    let commands: Vec<String> = CommandArray::parse(&raw[0].content)
        .unwrap()
        .items
        .into_iter()
        .map(|m| m.command)
        .collect();
    assert_eq!(commands, vec!["A", "B", "C", "D"]);
}

#[test]
fn test_scope_closes_on_early_return() {
    let stack = stack();

    fn bail_out(sender: &dyn avatar_config_sync::MessageSender) -> Result<(), String> {
        let _scope = CompositeScope::open(sender);
        sender.send_message(Message::new("A", "1"));
        Err("stop".into())
    }

    assert!(bail_out(stack.sender.as_ref()).is_err());
    assert_eq!(stack.transport.raw().len(), 1);

    stack.sender.send_message(Message::new("B", "2"));
    assert_eq!(stack.transport.raw()[1], "B:2");
}

#[test]
fn test_content_with_separators_survives_batching() {
    let stack = stack();
    {
        let _scope = CompositeScope::open(stack.sender.as_ref());
        stack
            .sender
            .send_message(Message::new("SetBackgroundImagePath", "C:\\a:b,\"c\"\td"));
    }

    assert_eq!(
        stack.transport.flattened(),
        vec![Message::new("SetBackgroundImagePath", "C:\\a:b,\"c\"\td")]
    );
}

/// Minimal renderer: answers every query with `<command>-answer` and
/// pushes one inbound command afterwards.
async fn spawn_fake_renderer(socket: UdpSocket) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        loop {
            let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let text = String::from_utf8_lossy(&buf[..len]).to_string();
            let Some(rest) = text.strip_prefix('?') else {
                continue;
            };
            let (id, message) = rest.split_once('|').unwrap();
            let command = message.split(':').next().unwrap();
            let reply = format!("!{}|{}-answer", id, command);
            socket.send_to(reply.as_bytes(), from).await.unwrap();
            socket
                .send_to(b"VRoidModelLoadCompleted:hub-1", from)
                .await
                .unwrap();
        }
    });
}

#[tokio::test]
async fn test_queries_over_udp_are_correlated() {
    let renderer = UdpSocket::bind(loopback()).await.unwrap();
    let renderer_addr = renderer.local_addr().unwrap();
    spawn_fake_renderer(renderer).await;

    let transport = UdpTransport::bind(loopback(), renderer_addr).await.unwrap();
    let socket = transport.socket();
    let channel = Arc::new(
        MessageChannel::new(Arc::new(transport), Arc::new(Metrics::new()))
            .with_query_timeout(Duration::from_secs(5)),
    );
    let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel();
    let receiver = spawn_receiver(socket, channel.clone(), inbound_tx);

    let camera = Message::command_only(query::CURRENT_CAMERA_POSITION);
    let layout = Message::command_only(query::CURRENT_DEVICE_LAYOUT);
    let (a, b) = tokio::join!(channel.query(&camera), channel.query(&layout));

    assert_eq!(a.unwrap(), "CurrentCameraPosition-answer");
    assert_eq!(b.unwrap(), "CurrentDeviceLayout-answer");
    assert_eq!(channel.pending_queries(), 0);

    let inbound = inbound_rx.recv().await.unwrap();
    assert_eq!(inbound, Message::new(receive::VROID_MODEL_LOAD_COMPLETED, "hub-1"));

    receiver.abort();
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_query_times_out() {
    let stack = stack();
    let channel = MessageChannel::new(stack.transport.clone(), Arc::new(Metrics::new()))
        .with_query_timeout(Duration::from_millis(300));

    let result = channel
        .query(&Message::command_only(query::CAMERA_DEVICE_NAMES))
        .await;

    assert!(matches!(result, Err(TransportError::QueryTimeout { .. })));
    assert_eq!(channel.pending_queries(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_first_wait_delivers_nothing() {
    let stack = stack();
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = delivered.clone();

    let mut watcher = PollingWatcher::new(
        stack.channel.clone(),
        Message::command_only(query::CURRENT_CAMERA_POSITION),
    );
    watcher
        .start(Duration::from_millis(2000), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    watcher.stop();
    tokio::time::sleep(Duration::from_millis(10_000)).await;

    assert_eq!(delivered.load(Ordering::SeqCst), 0);
    assert!(stack.transport.raw().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_query_discards_late_answer() {
    let stack = stack();
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = delivered.clone();

    let mut watcher = PollingWatcher::new(
        stack.channel.clone(),
        Message::command_only(query::CURRENT_CAMERA_POSITION),
    );
    watcher
        .start(Duration::from_millis(100), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(stack.transport.raw(), vec!["?1|CurrentCameraPosition:"]);

    watcher.stop();
    tokio::task::yield_now().await;
    assert!(stack.channel.route_inbound("!1|late").is_none());
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(delivered.load(Ordering::SeqCst), 0);
    assert_eq!(stack.channel.pending_queries(), 0);
}
