//! Push-channel lifecycle.
//!
//! The connection manager owns one WebSocket to the delta feed and keeps
//! the lifecycle policy in an explicit state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Connected
//!                      |            |
//!                      | error      | closed
//!                      v            v
//!                 (terminated)  Connecting (after a fixed delay, forever)
//! ```
//!
//! A channel that closes after being established reconnects forever at a
//! fixed interval with no backoff cap. A channel that fails to establish
//! logs the error and lets the message sequence end; subscribers see
//! silence, never an error.

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Default delay between reconnect attempts.
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Capacity of the inbound message tap.
const INBOUND_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle states of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No channel and no attempt in flight.
    Disconnected,
    /// An attempt is in flight, or a reconnect is pending its delay.
    Connecting,
    /// The channel is established and delivering messages.
    Connected,
}

/// Configuration for the push channel.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Push channel endpoint, e.g. `wss://host/ws`.
    pub url: String,

    /// Fixed delay between reconnect attempts. There is no backoff and no
    /// attempt cap; the channel retries until closed.
    pub reconnect_delay: Duration,
}

impl ConnectionConfig {
    /// Creates a config with the default reconnect delay.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Owns the push-channel lifecycle and multicasts inbound messages.
///
/// The message tap is live: subscribers joining after the channel opened
/// receive subsequent messages, not a replay. The tap survives reconnects,
/// so one subscription observes the stream across channel generations.
pub struct ConnectionManager {
    config: ConnectionConfig,
    inbound: broadcast::Sender<String>,
    outbound: Option<mpsc::UnboundedSender<Message>>,
    state: Arc<watch::Sender<ConnectionState>>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Creates a manager. No connection is made until [`connect`].
    ///
    /// [`connect`]: ConnectionManager::connect
    pub fn new(config: ConnectionConfig) -> Self {
        let (inbound, _) = broadcast::channel(INBOUND_CHANNEL_CAPACITY);
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            config,
            inbound,
            outbound: None,
            state: Arc::new(state),
            task: None,
        }
    }

    /// Establishes the push channel if not already open.
    ///
    /// Idempotent: calling this while a channel task is live is a no-op.
    /// After a terminated sequence or a [`close`], it creates a fresh
    /// channel.
    ///
    /// [`close`]: ConnectionManager::close
    pub fn connect(&mut self) {
        if let Some(task) = &self.task {
            if !task.is_finished() {
                debug!("connect() while the channel is open is a no-op");
                return;
            }
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.outbound = Some(outbound_tx);

        let url = self.config.url.clone();
        let delay = self.config.reconnect_delay;
        let inbound = self.inbound.clone();
        let state = Arc::clone(&self.state);

        self.task = Some(tokio::spawn(async move {
            drive_channel(url, delay, inbound, outbound_rx, state).await;
        }));
    }

    /// Tears the channel down and resets the handle so a future
    /// [`connect`] starts fresh.
    ///
    /// [`connect`]: ConnectionManager::connect
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("push channel closed");
        }
        self.outbound = None;
        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Sends a message out over the channel, if one is open. The read path
    /// never needs this; it exists because the channel is full-duplex.
    pub fn send_message(&self, payload: impl Into<String>) {
        match &self.outbound {
            Some(outbound) if self.state() == ConnectionState::Connected => {
                let _ = outbound.send(Message::Text(payload.into()));
            }
            _ => debug!("dropping outbound message; channel is not open"),
        }
    }

    /// Subscribes to inbound messages. A live tap: only messages arriving
    /// after this call are delivered. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.inbound.subscribe()
    }

    /// The channel's current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Drives one channel lifetime: connect, read until closure, reconnect.
async fn drive_channel(
    url: String,
    reconnect_delay: Duration,
    inbound: broadcast::Sender<String>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    state: Arc<watch::Sender<ConnectionState>>,
) {
    loop {
        state.send_replace(ConnectionState::Connecting);

        let stream = match connect_async(url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                // Establishment failure terminates the sequence; the
                // subscribers' tap goes quiet instead of erroring.
                error!("push channel connect to {} failed: {}", url, e);
                state.send_replace(ConnectionState::Disconnected);
                return;
            }
        };

        state.send_replace(ConnectionState::Connected);
        info!("push channel connected to {}", url);

        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        // No receivers yet is fine; the tap is live-only.
                        let _ = inbound.send(text);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if write.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("push channel closed by server");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("push channel error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                },
                payload = outbound.recv() => match payload {
                    Some(payload) => {
                        if write.send(payload).await.is_err() {
                            break;
                        }
                    }
                    // Manager gone; nothing left to drive.
                    None => return,
                },
            }
        }

        // Closed after being connected: retry forever, fixed interval.
        state.send_replace(ConnectionState::Connecting);
        sleep(reconnect_delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    /// Local push server: every accepted connection is handed its frames,
    /// then held open. Returns the bound address and an accept counter.
    async fn spawn_push_server(frames: Vec<String>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("ws://{}", listener.local_addr().unwrap());
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let frames = frames.clone();
                tokio::spawn(async move {
                    let mut ws = accept_async(stream).await.unwrap();
                    for frame in frames {
                        ws.send(Message::Text(frame)).await.unwrap();
                    }
                    // Hold the connection open until the client goes away.
                    while let Some(Ok(_)) = ws.next().await {}
                });
            }
        });

        (addr, accepted)
    }

    async fn wait_for(mut check: impl FnMut() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
        panic!("condition not reached within timeout");
    }

    fn test_config(url: String) -> ConnectionConfig {
        ConnectionConfig {
            url,
            reconnect_delay: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let (addr, accepted) = spawn_push_server(vec![]).await;
        let mut manager = ConnectionManager::new(test_config(addr));

        manager.connect();
        manager.connect();
        manager.connect();

        wait_for(|| manager.state() == ConnectionState::Connected).await;
        sleep(Duration::from_millis(50)).await;
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_resets_to_disconnected() {
        let (addr, _) = spawn_push_server(vec![]).await;
        let mut manager = ConnectionManager::new(test_config(addr));

        manager.connect();
        wait_for(|| manager.state() == ConnectionState::Connected).await;

        manager.close();
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_messages_are_multicast() {
        let (addr, _) = spawn_push_server(vec!["one".into(), "two".into()]).await;
        let mut manager = ConnectionManager::new(test_config(addr));

        let mut first = manager.subscribe();
        let mut second = manager.subscribe();
        manager.connect();

        assert_eq!(first.recv().await.unwrap(), "one");
        assert_eq!(first.recv().await.unwrap(), "two");
        assert_eq!(second.recv().await.unwrap(), "one");
        assert_eq!(second.recv().await.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_connect_failure_terminates_quietly() {
        // Nothing is listening here.
        let mut manager =
            ConnectionManager::new(test_config("ws://127.0.0.1:1".into()));

        manager.connect();
        wait_for(|| manager.state() == ConnectionState::Disconnected).await;

        // A fresh connect() after termination is allowed to start over.
        manager.connect();
        assert_ne!(manager.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_send_message_dropped_when_closed() {
        let (addr, _) = spawn_push_server(vec![]).await;
        let manager = ConnectionManager::new(test_config(addr));

        // Never connected; must not panic, just drop.
        manager.send_message("{}");
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }
}
