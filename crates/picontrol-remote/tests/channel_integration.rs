//! Integration tests for the WebSocket command channel.
//!
//! # Purpose
//!
//! These tests run [`CommandChannel`] against a real loopback WebSocket
//! listener (the *reference listener*, built with `tokio-tungstenite`'s
//! server side) and drive it through the public API, as the binary does.
//! They verify:
//!
//! - Frames sent while the channel is open reach the listener, in order, as
//!   exactly the JSON the listener contract expects.
//! - Sends while the channel is not open never reach the listener and log
//!   exactly one warning each.
//! - Inbound text frames reach the inbound sink verbatim.
//! - Local close is graceful and idempotent: every frame `send` accepted goes
//!   out before the Close frame.  A remote close lands the channel in
//!   `Disconnected` without reconnecting.
//! - A secure endpoint opens with a TLS handshake.
//!
//! # Reference listener
//!
//! ```text
//! test                     channel task                 reference listener
//! ────                     ────────────                 ──────────────────
//! open(endpoint) ───────►  connect_async ─────────────► accept_async
//!                          ◄──── Connected event        send greeting frames
//! send(msg) ────────────►  Text frame ────────────────► Heard::Text
//! close() ──────────────►  Close frame ───────────────► Heard::Closed
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use picontrol_core::{CommandMessage, InputEvent, MouseButton};
use picontrol_remote::application::{ChannelError, ConsoleController, FrameSink, TrackpadController};
use picontrol_remote::domain::{ChannelEvent, ChannelState, Endpoint};
use picontrol_remote::infrastructure::{CommandChannel, RecordingSink};
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

const WAIT: Duration = Duration::from_secs(5);

// ── Reference listener ────────────────────────────────────────────────────────

/// What the reference listener observed.
#[derive(Debug, PartialEq)]
enum Heard {
    Text(String),
    Closed,
}

/// Accepts one connection, sends `greeting`, optionally closes, then reports
/// every frame it receives.
async fn spawn_listener(greeting: Vec<String>, close_after_greeting: bool) -> (u16, mpsc::UnboundedReceiver<Heard>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("handshake");

        for frame in greeting {
            ws.send(WsMessage::Text(frame)).await.expect("send greeting");
        }
        if close_after_greeting {
            ws.close(None).await.ok();
        }

        while let Some(msg) = ws.next().await {
            match msg {
                Ok(WsMessage::Text(text)) => {
                    let _ = tx.send(Heard::Text(text));
                }
                Ok(WsMessage::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = tx.send(Heard::Closed);
    });

    (port, rx)
}

fn endpoint(port: u16) -> Endpoint {
    Endpoint::new("127.0.0.1", port, false).expect("valid endpoint")
}

async fn next_event(events: &mut mpsc::Receiver<ChannelEvent>) -> ChannelEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for a channel event")
        .expect("event stream ended")
}

async fn next_heard(heard: &mut mpsc::UnboundedReceiver<Heard>) -> Heard {
    timeout(WAIT, heard.recv())
        .await
        .expect("timed out waiting for the listener")
        .expect("listener stopped")
}

/// Opens a channel to a fresh listener and waits until it is `Open`.
async fn connected_channel(
    greeting: Vec<String>,
) -> (
    Arc<CommandChannel>,
    mpsc::Receiver<ChannelEvent>,
    mpsc::UnboundedReceiver<Heard>,
    Arc<RecordingSink>,
) {
    let (port, heard) = spawn_listener(greeting, false).await;
    let inbound = Arc::new(RecordingSink::default());
    let (channel, mut events) = CommandChannel::new(inbound.clone());

    channel.open(&endpoint(port)).expect("open");
    assert!(matches!(next_event(&mut events).await, ChannelEvent::Connecting { .. }));
    assert!(matches!(next_event(&mut events).await, ChannelEvent::Connected { .. }));
    assert_eq!(channel.state(), ChannelState::Open);

    (Arc::new(channel), events, heard, inbound)
}

// ── Warning counter ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ── Outbound ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_right_click_reaches_reference_listener_exactly() {
    // Arrange
    let (channel, _events, mut heard, _inbound) = connected_channel(vec![]).await;
    let pad = TrackpadController::new(Default::default(), channel.clone());

    // Act
    pad.right_click().expect("send while open");

    // Assert: the listener parses exactly {type:"click", button:"right"}
    let Heard::Text(frame) = next_heard(&mut heard).await else {
        panic!("expected a text frame");
    };
    let value: Value = serde_json::from_str(&frame).expect("listener parses JSON");
    assert_eq!(value, json!({"type": "click", "button": "right"}));
}

#[tokio::test]
async fn test_frames_arrive_in_send_order() {
    // Arrange
    let (channel, _events, mut heard, _inbound) = connected_channel(vec![]).await;
    let console = ConsoleController::new(channel.clone());

    // Act
    console.submit_line("gpio_on 17").unwrap();
    channel.send(&InputEvent::Scroll { dy: -30.0 }).unwrap();
    console.submit_line("ping").unwrap();

    // Assert
    assert_eq!(
        next_heard(&mut heard).await,
        Heard::Text(r#"{"command":"gpio_on","params":[17]}"#.into())
    );
    assert_eq!(
        next_heard(&mut heard).await,
        Heard::Text(r#"{"type":"scroll","dy":-30}"#.into())
    );
    assert_eq!(
        next_heard(&mut heard).await,
        Heard::Text(r#"{"command":"ping","params":[]}"#.into())
    );
}

#[tokio::test]
async fn test_send_while_disconnected_never_transmits_and_warns_once() {
    // Arrange: connect, then close and wait until the listener sees the close
    let (channel, mut events, mut heard, _inbound) = connected_channel(vec![]).await;
    channel.close();
    assert!(next_event(&mut events).await.is_terminal());
    assert_eq!(next_heard(&mut heard).await, Heard::Closed);

    let counter = WarnCounter::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));
    let before = counter.count();

    // Act
    let result = channel.send(&InputEvent::Click {
        button: MouseButton::Left,
    });

    // Assert
    assert_eq!(result, Err(ChannelError::NotConnected));
    assert_eq!(counter.count() - before, 1, "exactly one warning per dropped send");
    assert!(heard.try_recv().is_err(), "nothing may reach the listener");
}

#[tokio::test]
async fn test_send_before_open_warns_once() {
    let counter = WarnCounter::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));
    let (channel, _events) = CommandChannel::new(Arc::new(RecordingSink::default()));

    let result = channel.send(&CommandMessage::new("ping", vec![]));

    assert_eq!(result, Err(ChannelError::NotConnected));
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_close_flushes_every_accepted_frame_before_closing() {
    // Arrange
    let (channel, mut events, mut heard, _inbound) = connected_channel(vec![]).await;
    let sent: Vec<String> = (0..50)
        .map(|i| format!(r#"{{"command":"ping","params":[{i}]}}"#))
        .collect();

    // Act: queue a burst, then close straight away
    for frame in &sent {
        channel.send_text(frame.clone()).expect("accepted while open");
    }
    channel.close();

    // Assert: all of them arrive, in order, before the Close frame
    let mut received = Vec::new();
    loop {
        match next_heard(&mut heard).await {
            Heard::Text(text) => received.push(text),
            Heard::Closed => break,
        }
    }
    assert_eq!(received, sent);
    assert!(next_event(&mut events).await.is_terminal());
}

#[tokio::test]
async fn test_secure_endpoint_starts_a_tls_handshake() {
    // Arrange: a plain TCP listener that captures the first record header
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();
    let header = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut buf = [0u8; 3];
        stream.read_exact(&mut buf).await.expect("client hello");
        buf
    });
    let (channel, mut events) = CommandChannel::new(Arc::new(RecordingSink::default()));

    // Act
    channel
        .open(&Endpoint::new("127.0.0.1", port, true).expect("valid endpoint"))
        .expect("open");
    let header = timeout(WAIT, header)
        .await
        .expect("timed out waiting for the client hello")
        .expect("listener task");

    // Assert: a TLS handshake record (content type 22, version 3.x)
    assert_eq!(header[0], 0x16);
    assert_eq!(header[1], 0x03);
    assert!(matches!(
        next_event(&mut events).await,
        ChannelEvent::Connecting { url } if url.starts_with("wss://")
    ));
    // The listener hangs up mid-handshake.
    let ChannelEvent::TransportError { message } = next_event(&mut events).await else {
        panic!("expected a transport error");
    };
    assert!(!message.contains("TLS support not compiled in"), "got: {message}");
}

// ── Inbound ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inbound_frames_reach_sink_verbatim() {
    // Arrange: the listener greets with a JSON status and a non-JSON string
    let greeting = vec![
        r#"{"type":"connection","status":"connected"}"#.to_string(),
        "plain text, not JSON".to_string(),
    ];
    let (_channel, _events, _heard, inbound) = connected_channel(greeting.clone()).await;

    // Act: wait until both frames have been delivered
    timeout(WAIT, async {
        while inbound.len() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("inbound frames delivered");

    // Assert
    assert_eq!(inbound.frames(), greeting);
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_close_is_graceful_and_idempotent() {
    // Arrange
    let (channel, mut events, mut heard, _inbound) = connected_channel(vec![]).await;

    // Act
    channel.close();
    channel.close();

    // Assert
    assert_eq!(channel.state(), ChannelState::Disconnected);
    assert_eq!(
        next_event(&mut events).await,
        ChannelEvent::Disconnected {
            reason: "closed by client".to_string()
        }
    );
    assert_eq!(next_heard(&mut heard).await, Heard::Closed);
    channel.close();
    assert_eq!(channel.state(), ChannelState::Disconnected);
}

#[tokio::test]
async fn test_remote_close_disconnects_without_reconnecting() {
    // Arrange
    let (port, _heard) = spawn_listener(vec![], true).await;
    let (channel, mut events) = CommandChannel::new(Arc::new(RecordingSink::default()));

    // Act
    channel.open(&endpoint(port)).unwrap();

    // Assert
    assert!(matches!(next_event(&mut events).await, ChannelEvent::Connecting { .. }));
    assert!(matches!(next_event(&mut events).await, ChannelEvent::Connected { .. }));
    assert!(next_event(&mut events).await.is_terminal());
    assert_eq!(channel.state(), ChannelState::Disconnected);
    assert_eq!(channel.send_text("{}".into()), Err(ChannelError::NotConnected));

    // No further attempts are made.
    let extra = timeout(Duration::from_millis(200), events.recv()).await;
    assert!(extra.is_err(), "no automatic reconnect");
}

#[tokio::test]
async fn test_channel_can_be_reopened_after_close() {
    // Arrange: first session
    let (channel, mut events, _heard, _inbound) = connected_channel(vec![]).await;
    channel.close();
    assert!(next_event(&mut events).await.is_terminal());

    // Act: a manual retry to a second listener
    let (port, mut heard) = spawn_listener(vec![], false).await;
    channel.open(&endpoint(port)).unwrap();
    assert!(matches!(next_event(&mut events).await, ChannelEvent::Connecting { .. }));
    assert!(matches!(next_event(&mut events).await, ChannelEvent::Connected { .. }));
    channel.send(&InputEvent::Key { key: "a".into() }).unwrap();

    // Assert
    assert_eq!(
        next_heard(&mut heard).await,
        Heard::Text(r#"{"type":"key","key":"a"}"#.into())
    );
}
