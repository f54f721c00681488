//! Async client for the Connect Four game server.
//!
//! [`GameClient`] is a thin handle that communicates with a background
//! session task via an unbounded MPSC channel. The session owns the
//! transport: it announces the client's [`Role`] as its very first frame,
//! then dispatches every inbound frame to the [`Board`] in arrival order.
//! Lifecycle events are emitted on a bounded channel
//! ([`tokio::sync::mpsc::Receiver<ClientEvent>`]) returned from
//! [`GameClient::start`].
//!
//! # Example
//!
//! ```rust,ignore
//! let transport = WebSocketTransport::connect(DEFAULT_URL).await?;
//! let board = Arc::new(TextBoard::new());
//! let config = GameConfig::from_query("?join=abc123");
//! let (client, mut events) = GameClient::start(transport, config, Arc::clone(&board));
//!
//! client.click(&ClickTarget::column("3"))?;
//!
//! while let Some(event) = events.recv().await {
//!     if let ClientEvent::Disconnected { .. } = event {
//!         break;
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::board::Board;
use crate::dispatch::{Directive, Dispatcher, DEFAULT_MESSAGE_DELAY};
use crate::error::{GameClientError, Result};
use crate::event::ClientEvent;
use crate::protocol::ClientMessage;
use crate::relay::{relay_click, ClickTarget};
use crate::role::Role;
use crate::transport::{CloseCode, Transport};

/// Endpoint of a locally running game server.
pub const DEFAULT_URL: &str = "ws://localhost:5000/ws";

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`GameClient`] session.
///
/// # Example
///
/// ```
/// use connect_four_client::{GameConfig, Role};
/// use std::time::Duration;
///
/// let config = GameConfig::from_query("?watch=xyz789")
///     .with_message_delay(Duration::ZERO)
///     .with_shutdown_timeout(Duration::from_secs(5));
/// assert_eq!(config.role, Role::Watch("xyz789".into()));
/// ```
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// How this client takes part in the game.
    pub role: Role,
    /// Delay before win and error messages are shown.
    ///
    /// Defaults to **50 ms**. Zero shows them synchronously during dispatch.
    pub message_delay: Duration,
    /// Capacity of the bounded event channel.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// Timeout for the graceful shutdown.
    ///
    /// When [`GameClient::shutdown`] is called, the session is given this much
    /// time to close the transport and emit its final `Disconnected` event.
    /// If the timeout expires the task is aborted.
    ///
    /// Defaults to **1 second**.
    pub shutdown_timeout: Duration,
}

impl GameConfig {
    /// Create a configuration for `role` with default values.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            message_delay: DEFAULT_MESSAGE_DELAY,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Create a configuration whose role comes from a page query string.
    pub fn from_query(query: &str) -> Self {
        Self::new(Role::from_query(query))
    }

    /// Create a configuration whose role comes from a full page URL.
    ///
    /// # Errors
    ///
    /// Returns [`GameClientError::InvalidUrl`] if `url` cannot be parsed.
    pub fn from_url(url: &str) -> Result<Self> {
        Ok(Self::new(Role::from_url(url)?))
    }

    /// Set the delay before messages are shown.
    #[must_use]
    pub fn with_message_delay(mut self, delay: Duration) -> Self {
        self.message_delay = delay;
        self
    }

    /// Set the capacity of the bounded event channel.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the timeout for the graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(Role::Create)
    }
}

// ── Client handle ───────────────────────────────────────────────────

/// Async client handle for the Connect Four game server.
///
/// Created via [`GameClient::start`], which spawns the background session and
/// returns this handle together with an event receiver.
pub struct GameClient {
    /// Sender half of the command channel to the session.
    cmd_tx: mpsc::UnboundedSender<ClientMessage>,
    /// Cleared by the session when it exits.
    connected: Arc<AtomicBool>,
    role: Role,
    /// Handle to the background session task.
    task: Option<tokio::task::JoinHandle<()>>,
    /// Oneshot sender to signal the session to shut down gracefully.
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_timeout: Duration,
}

impl GameClient {
    /// Start the session and return a handle plus event receiver.
    ///
    /// The session sends the role announcement for `config.role` as its first
    /// frame, exactly once.
    ///
    /// # Arguments
    ///
    /// * `transport`: A connected [`Transport`] implementation.
    /// * `config`: Session configuration including the role.
    /// * `board`: Where server events are rendered.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start<B: Board + ?Sized>(
        transport: impl Transport,
        config: GameConfig,
        board: Arc<B>,
    ) -> (Self, mpsc::Receiver<ClientEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ClientMessage>();
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<ClientEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let connected = Arc::new(AtomicBool::new(true));
        let dispatcher = Dispatcher::new(board).with_message_delay(config.message_delay);

        let task = tokio::spawn(session_loop(
            transport,
            config.role.init_message(),
            dispatcher,
            cmd_rx,
            event_tx,
            Arc::clone(&connected),
            shutdown_rx,
        ));

        let client = Self {
            cmd_tx,
            connected,
            role: config.role,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };

        (client, event_rx)
    }

    /// Relay a click on the board as a move request.
    ///
    /// Returns `Ok(false)` when the click produces no request: the client is
    /// spectating, or the target has no usable column.
    ///
    /// # Errors
    ///
    /// Returns [`GameClientError::NotConnected`] if the session has ended.
    pub fn click(&self, target: &ClickTarget) -> Result<bool> {
        match relay_click(&self.role, target) {
            Some(msg) => self.send(msg).map(|()| true),
            None => Ok(false),
        }
    }

    /// The role announced for this session.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Returns `true` while the session is running.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Shut down the client, closing the transport and stopping the session.
    ///
    /// The transport is closed with [`CloseCode::GOING_AWAY`]. After this call
    /// the event receiver yields `None` once the session exits.
    pub async fn shutdown(&mut self) {
        debug!("GameClient: shutdown requested");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        // Await the session with a timeout. If it doesn't exit in time,
        // abort it so the task cannot detach and run indefinitely.
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("session terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("session did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("session aborted: {join_err}");
                    }
                }
            }
        }

        self.connected.store(false, Ordering::Release);
    }

    /// Queue a `ClientMessage` to the session.
    fn send(&self, msg: ClientMessage) -> Result<()> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(GameClientError::NotConnected);
        }
        self.cmd_tx
            .send(msg)
            .map_err(|_| GameClientError::NotConnected)
    }
}

impl std::fmt::Debug for GameClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameClient")
            .field("role", &self.role)
            .field("connected", &self.is_connected())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for GameClient {
    fn drop(&mut self) {
        // `Drop` cannot await a graceful close; abort the session instead.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Session loop ────────────────────────────────────────────────────

/// Background session that multiplexes send/receive via `tokio::select!`.
///
/// Exits when:
/// - The game is won (transport closed with code 1000)
/// - The command channel closes or shutdown is requested
/// - The transport returns `None` or an error
async fn session_loop<B: Board + ?Sized>(
    mut transport: impl Transport,
    init: ClientMessage,
    dispatcher: Dispatcher<B>,
    mut cmd_rx: mpsc::UnboundedReceiver<ClientMessage>,
    event_tx: mpsc::Sender<ClientEvent>,
    connected: Arc<AtomicBool>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!("session started");
    emit_event(&event_tx, ClientEvent::Connected).await;

    if let Err(e) = send_message(&mut transport, &init).await {
        error!("failed to announce role: {e}");
        emit_disconnected(&event_tx, &connected, Some(e.to_string())).await;
        return;
    }

    loop {
        tokio::select! {
            // Branch 1: outgoing command from the client handle
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(msg) => {
                        if let Err(e) = send_message(&mut transport, &msg).await {
                            error!("{e}");
                            emit_disconnected(&event_tx, &connected, Some(e.to_string())).await;
                            break;
                        }
                    }
                    // Command channel closed, client handle dropped.
                    None => {
                        debug!("command channel closed, shutting down session");
                        let _ = transport.close(CloseCode::GOING_AWAY).await;
                        emit_disconnected(&event_tx, &connected, Some("client shut down".into())).await;
                        break;
                    }
                }
            }
            // Branch 2: shutdown signal
            _ = &mut shutdown_rx => {
                debug!("shutdown signal received");
                let _ = transport.close(CloseCode::GOING_AWAY).await;
                emit_disconnected(&event_tx, &connected, Some("client shut down".into())).await;
                break;
            }
            // Branch 3: incoming event from the server
            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => match dispatcher.handle_frame(&text) {
                        Ok(Directive::Continue) => {}
                        Ok(Directive::Close(code)) => {
                            info!(%code, "game over, closing connection");
                            if let Err(e) = transport.close(code).await {
                                warn!("close handshake failed: {e}");
                            }
                            emit_disconnected(&event_tx, &connected, Some("game over".into())).await;
                            break;
                        }
                        // Only this frame is dropped; the session keeps listening.
                        Err(e) => {
                            error!("protocol fault: {e} (raw: {text})");
                            emit_event(&event_tx, ClientEvent::Fault { error: e.to_string() }).await;
                        }
                    },
                    Some(Err(e)) => {
                        error!("transport receive error: {e}");
                        emit_disconnected(&event_tx, &connected, Some(e.to_string())).await;
                        break;
                    }
                    // Transport closed cleanly.
                    None => {
                        debug!("transport closed by server");
                        emit_disconnected(&event_tx, &connected, None).await;
                        break;
                    }
                }
            }
        }
    }

    debug!("session exited");
}

/// Serialize and transmit one message.
async fn send_message(transport: &mut impl Transport, msg: &ClientMessage) -> Result<()> {
    debug!(kind = msg.kind(), "sending client message");
    let json = serde_json::to_string(msg)?;
    transport.send(json).await
}

/// Emit an event to the event channel. If the channel is full, log a warning
/// and drop the event to avoid blocking the session.
async fn emit_event(event_tx: &mpsc::Sender<ClientEvent>, event: ClientEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!("event channel full, dropping event: {dropped:?}");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("event channel closed, receiver dropped");
        }
    }
}

/// Emit a [`Disconnected`](ClientEvent::Disconnected) event and mark the
/// session as ended.
///
/// Uses `send().await` instead of `try_send` because `Disconnected` is always
/// the last event on the channel and must never be dropped.
async fn emit_disconnected(
    event_tx: &mpsc::Sender<ClientEvent>,
    connected: &AtomicBool,
    reason: Option<String>,
) {
    connected.store(false, Ordering::Release);
    let event = ClientEvent::Disconnected { reason };
    if event_tx.send(event).await.is_err() {
        debug!("event channel closed, receiver dropped");
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::board::TextBoard;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    // ── Mock transport ──────────────────────────────────────────────

    /// A mock transport that records sent messages and replays scripted responses.
    struct MockTransport {
        incoming: VecDeque<Option<Result<String>>>,
        sent: Arc<StdMutex<Vec<String>>>,
        closes: Arc<StdMutex<Vec<CloseCode>>>,
    }

    type Handles = (Arc<StdMutex<Vec<String>>>, Arc<StdMutex<Vec<CloseCode>>>);

    impl MockTransport {
        fn new(incoming: Vec<Option<Result<String>>>) -> (Self, Handles) {
            let sent = Arc::new(StdMutex::new(Vec::new()));
            let closes = Arc::new(StdMutex::new(Vec::new()));
            let transport = Self {
                incoming: VecDeque::from(incoming),
                sent: Arc::clone(&sent),
                closes: Arc::clone(&closes),
            };
            (transport, (sent, closes))
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&mut self, message: String) -> Result<()> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<String>> {
            if let Some(item) = self.incoming.pop_front() {
                item
            } else {
                // All scripted messages delivered, hang until shutdown.
                std::future::pending().await
            }
        }

        async fn close(&mut self, code: CloseCode) -> Result<()> {
            self.closes.lock().unwrap().push(code);
            Ok(())
        }
    }

    fn config(query: &str) -> GameConfig {
        GameConfig::from_query(query).with_message_delay(Duration::ZERO)
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn start_sends_init_first() {
        let (transport, (sent, _closes)) = MockTransport::new(vec![]);
        let board = Arc::new(TextBoard::new());
        let (mut client, mut events) = GameClient::start(transport, config("?join=abc123"), board);

        assert_eq!(events.recv().await.unwrap(), ClientEvent::Connected);
        client.click(&ClickTarget::column("4")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let messages = sent.lock().unwrap();
            assert_eq!(messages[0], r#"{"type":"init","join":"abc123"}"#);
            assert_eq!(messages[1], r#"{"type":"play","column":4}"#);
            assert_eq!(messages.len(), 2);
        }
        client.shutdown().await;
    }

    #[tokio::test]
    async fn win_closes_with_normal_code() {
        let (transport, (_sent, closes)) = MockTransport::new(vec![Some(Ok(
            r#"{"type":"win","player":"red"}"#.into(),
        ))]);
        let board = Arc::new(TextBoard::new());
        let (client, mut events) = GameClient::start(transport, config(""), Arc::clone(&board));

        assert_eq!(events.recv().await.unwrap(), ClientEvent::Connected);
        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::Disconnected {
                reason: Some("game over".into())
            }
        );
        assert!(events.recv().await.is_none());
        assert_eq!(*closes.lock().unwrap(), vec![CloseCode::NORMAL]);
        assert_eq!(board.messages(), vec!["Player red wins!".to_string()]);
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn bad_frame_is_skipped() {
        let (transport, (_sent, closes)) = MockTransport::new(vec![
            Some(Ok(r#"{"type":"resign"}"#.into())),
            Some(Ok(r#"{"type":"win","player":"yellow"}"#.into())),
        ]);
        let board = Arc::new(TextBoard::new());
        let (_client, mut events) = GameClient::start(transport, config(""), Arc::clone(&board));

        assert_eq!(events.recv().await.unwrap(), ClientEvent::Connected);
        assert!(matches!(
            events.recv().await.unwrap(),
            ClientEvent::Fault { .. }
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::Disconnected {
                reason: Some("game over".into())
            }
        );
        assert_eq!(*closes.lock().unwrap(), vec![CloseCode::NORMAL]);
        assert_eq!(board.messages(), vec!["Player yellow wins!".to_string()]);
    }

    #[tokio::test]
    async fn shutdown_closes_going_away() {
        let (transport, (_sent, closes)) = MockTransport::new(vec![]);
        let (mut client, mut events) =
            GameClient::start(transport, config(""), Arc::new(TextBoard::new()));
        let _ = events.recv().await; // Connected

        client.shutdown().await;
        assert_eq!(*closes.lock().unwrap(), vec![CloseCode::GOING_AWAY]);
        assert!(matches!(
            client.click(&ClickTarget::column("1")),
            Err(GameClientError::NotConnected)
        ));
    }
}
