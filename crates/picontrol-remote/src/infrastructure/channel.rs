//! WebSocket command channel.
//!
//! [`CommandChannel`] owns one duplex text connection to the remote listener.
//! It is the only piece of the remote that touches the network.
//!
//! # Lifecycle
//!
//! - [`open`](CommandChannel::open) moves `Disconnected → Connecting` and
//!   spawns a connection task.  It returns at once; the outcome arrives as a
//!   [`ChannelEvent`] on the receiver returned by [`CommandChannel::new`].
//! - When the handshake completes the task moves the channel to `Open` and
//!   starts a `tokio::select!` loop over three sources: outbound frames,
//!   inbound frames, and the shutdown signal.
//! - [`close`](CommandChannel::close) moves the channel to `Disconnected`
//!   immediately and asks the task to flush frames already accepted by
//!   `send`, then send a Close frame.  Calling it again is a no-op.
//! - A handshake failure, a transport error, or a Close from the remote side
//!   also ends in `Disconnected`.  Nothing reconnects automatically.
//!
//! # Sending never waits
//!
//! [`send_text`](FrameSink::send_text) checks the state and pushes the frame
//! onto an unbounded queue that the connection task drains in order.  Frames
//! sent while the channel is not `Open` are dropped, never deferred.
//!
//! # For beginners: why a generation counter?
//!
//! `close()` followed quickly by `open()` leaves the *old* task still winding
//! down while the *new* one starts.  Each `open()` bumps `generation`, and a
//! task only writes the shared state or reports a [`ChannelEvent`] if its
//! generation is still current, so a stale task can never mark a fresh
//! connection as closed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::{SinkExt, StreamExt};
use rustls::crypto::CryptoProvider;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::sink::{send_message, ChannelError, FrameSink, InboundSink};
use crate::domain::{ChannelEvent, ChannelState, Endpoint};

/// Capacity of the status notification queue.
const EVENT_QUEUE_CAPACITY: usize = 32;

struct Shared {
    state: ChannelState,
    generation: u64,
    connection_id: Option<Uuid>,
    outbound: Option<mpsc::UnboundedSender<String>>,
    shutdown: Option<oneshot::Sender<()>>,
}

/// Everything a connection task needs, moved into the task.
struct ConnectionTask {
    id: Uuid,
    generation: u64,
    url: String,
    shared: Arc<Mutex<Shared>>,
    inbound: Arc<dyn InboundSink>,
    events: mpsc::Sender<ChannelEvent>,
    outbound_rx: mpsc::UnboundedReceiver<String>,
    shutdown_rx: oneshot::Receiver<()>,
}

/// Why the read/write loop ended.
enum LoopEnd {
    ClosedLocally,
    ClosedRemotely(String),
    Failed(String),
}

/// Explicitly owned WebSocket channel to the remote listener.
pub struct CommandChannel {
    shared: Arc<Mutex<Shared>>,
    inbound: Arc<dyn InboundSink>,
    events: mpsc::Sender<ChannelEvent>,
}

impl CommandChannel {
    /// Creates a disconnected channel.
    ///
    /// Inbound text frames go to `inbound` verbatim.  Status notifications are
    /// delivered on the returned receiver.
    pub fn new(inbound: Arc<dyn InboundSink>) -> (Self, mpsc::Receiver<ChannelEvent>) {
        let (events, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let channel = Self {
            shared: Arc::new(Mutex::new(Shared {
                state: ChannelState::Disconnected,
                generation: 0,
                connection_id: None,
                outbound: None,
                shutdown: None,
            })),
            inbound,
            events,
        };
        (channel, events_rx)
    }

    /// Starts connecting to `endpoint`.  Does not wait for the handshake.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::AlreadyActive`] if the channel is connecting or open.
    /// - [`ChannelError::NoRuntime`] if called outside a Tokio runtime.
    pub fn open(&self, endpoint: &Endpoint) -> Result<(), ChannelError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ChannelError::NoRuntime)?;
        if endpoint.is_secure() {
            install_tls_provider();
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let id = Uuid::new_v4();

        let generation = {
            let mut shared = lock(&self.shared);
            if shared.state != ChannelState::Disconnected {
                return Err(ChannelError::AlreadyActive(shared.state));
            }
            shared.generation += 1;
            shared.state = ChannelState::Connecting;
            shared.connection_id = Some(id);
            shared.outbound = Some(outbound_tx);
            shared.shutdown = Some(shutdown_tx);
            shared.generation
        };

        let task = ConnectionTask {
            id,
            generation,
            url: endpoint.url(),
            shared: Arc::clone(&self.shared),
            inbound: Arc::clone(&self.inbound),
            events: self.events.clone(),
            outbound_rx,
            shutdown_rx,
        };
        runtime.spawn(task.run());
        Ok(())
    }

    /// Serializes `msg` into one text frame and sends it.
    ///
    /// When the channel is not `Open` the message is dropped and a single
    /// warning is logged.
    ///
    /// # Errors
    ///
    /// [`ChannelError::NotConnected`] or [`ChannelError::Protocol`].
    pub fn send<M: Serialize + ?Sized>(&self, msg: &M) -> Result<(), ChannelError> {
        send_message(self, msg)
    }

    /// Starts a graceful shutdown.  Idempotent.
    pub fn close(&self) {
        let mut shared = lock(&self.shared);
        if shared.state == ChannelState::Disconnected {
            debug!("close ignored: channel already disconnected");
            return;
        }
        shared.state = ChannelState::Disconnected;
        shared.outbound = None;
        if let Some(shutdown) = shared.shutdown.take() {
            // The task may already be gone; nothing to signal then.
            let _ = shutdown.send(());
        }
        if let Some(id) = shared.connection_id {
            info!(connection = %id, "closing channel");
        }
    }

    pub fn state(&self) -> ChannelState {
        lock(&self.shared).state
    }
}

impl FrameSink for CommandChannel {
    fn state(&self) -> ChannelState {
        CommandChannel::state(self)
    }

    fn send_text(&self, frame: String) -> Result<(), ChannelError> {
        let shared = lock(&self.shared);
        if shared.state != ChannelState::Open {
            return Err(ChannelError::NotConnected);
        }
        let outbound = shared.outbound.as_ref().ok_or(ChannelError::NotConnected)?;
        outbound.send(frame).map_err(|_| ChannelError::NotConnected)
    }
}

impl Drop for CommandChannel {
    fn drop(&mut self) {
        self.close();
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

impl ConnectionTask {
    async fn run(mut self) {
        let id = self.id;
        self.notify(ChannelEvent::Connecting { url: self.url.clone() }).await;
        info!(connection = %id, url = %self.url, "connecting");

        let connected = tokio::select! {
            result = connect_async(self.url.as_str()) => result,
            _ = &mut self.shutdown_rx => {
                debug!(connection = %id, "closed before the handshake completed");
                self.finish(ChannelEvent::Disconnected { reason: "closed before connecting".into() }).await;
                return;
            }
        };

        let ws_stream = match connected {
            Ok((stream, _response)) => stream,
            Err(e) => {
                warn!(connection = %id, url = %self.url, "connection failed: {e}");
                self.finish(ChannelEvent::TransportError { message: e.to_string() }).await;
                return;
            }
        };

        if !self.mark_open() {
            debug!(connection = %id, "channel closed during handshake; dropping connection");
            return;
        }
        info!(connection = %id, url = %self.url, "connected");
        self.notify(ChannelEvent::Connected { url: self.url.clone() }).await;

        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        let end = loop {
            tokio::select! {
                Some(frame) = self.outbound_rx.recv() => {
                    debug!(connection = %id, bytes = frame.len(), "sending frame");
                    if let Err(e) = ws_tx.send(WsMessage::Text(frame)).await {
                        break LoopEnd::Failed(e.to_string());
                    }
                }
                inbound = ws_rx.next() => match inbound {
                    Some(Ok(WsMessage::Text(text))) => self.inbound.deliver(&text),
                    Some(Ok(WsMessage::Close(frame))) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty())
                            .unwrap_or_else(|| "closed by remote host".to_string());
                        break LoopEnd::ClosedRemotely(reason);
                    }
                    Some(Ok(other)) => {
                        debug!(connection = %id, "ignoring non-text frame ({} bytes)", other.len());
                    }
                    Some(Err(e)) => break LoopEnd::Failed(e.to_string()),
                    None => break LoopEnd::ClosedRemotely("stream ended".to_string()),
                },
                _ = &mut self.shutdown_rx => {
                    // Frames accepted before close() go out ahead of the Close frame.
                    while let Ok(frame) = self.outbound_rx.try_recv() {
                        debug!(connection = %id, bytes = frame.len(), "flushing frame before close");
                        if let Err(e) = ws_tx.send(WsMessage::Text(frame)).await {
                            debug!(connection = %id, "queued frame not sent: {e}");
                            break;
                        }
                    }
                    if let Err(e) = ws_tx.send(WsMessage::Close(None)).await {
                        debug!(connection = %id, "close frame not sent: {e}");
                    }
                    break LoopEnd::ClosedLocally;
                }
            }
        };

        let event = match end {
            LoopEnd::ClosedLocally => {
                info!(connection = %id, "channel closed");
                ChannelEvent::Disconnected {
                    reason: "closed by client".to_string(),
                }
            }
            LoopEnd::ClosedRemotely(reason) => {
                info!(connection = %id, "remote host closed the connection: {reason}");
                ChannelEvent::Disconnected { reason }
            }
            LoopEnd::Failed(message) => {
                warn!(connection = %id, "transport error: {message}");
                ChannelEvent::TransportError { message }
            }
        };
        self.finish(event).await;
    }

    /// Moves `Connecting → Open` unless the channel was closed or reopened
    /// meanwhile.
    fn mark_open(&self) -> bool {
        let mut shared = lock(&self.shared);
        if shared.generation == self.generation && shared.state == ChannelState::Connecting {
            shared.state = ChannelState::Open;
            true
        } else {
            false
        }
    }

    async fn finish(&self, event: ChannelEvent) {
        {
            let mut shared = lock(&self.shared);
            if shared.generation == self.generation {
                shared.state = ChannelState::Disconnected;
                shared.outbound = None;
                shared.shutdown = None;
            }
        }
        self.notify(event).await;
    }

    /// Reports `event` unless a later `open()` has superseded this task.
    async fn notify(&self, event: ChannelEvent) {
        if lock(&self.shared).generation != self.generation {
            debug!(connection = %self.id, "stale connection, dropping {event:?}");
            return;
        }
        // A dropped receiver only means nobody is watching the status.
        let _ = self.events.send(event).await;
    }
}

/// `wss://` handshakes need a process-wide rustls crypto provider.
fn install_tls_provider() {
    if CryptoProvider::get_default().is_none() {
        // Another thread may have installed one in the meantime; either is fine.
        let _ = rustls::crypto::ring::default_provider().install_default();
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
