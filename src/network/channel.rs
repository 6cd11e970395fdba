use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::common::{ChannelError, ChannelState, ChatMessage, Origin, TransportError};

use super::transport::{Outbound, TransportEvent, run_socket};

/// Upper bound on how long [`RealtimeChannel::close`] waits for the socket task.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Ordered log of one channel lifetime.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_sequence: u64,
}

impl Transcript {
    pub fn push(&mut self, origin: Origin, text: String) -> &ChatMessage {
        self.next_sequence += 1;
        let index = self.messages.len();
        self.messages.push(ChatMessage {
            sequence: self.next_sequence,
            origin,
            text,
            timestamp: Utc::now().timestamp(),
        });
        &self.messages[index]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.next_sequence = 0;
    }
}

/// What changed after the channel observed a transport event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Message(ChatMessage),
    Closed,
    Failed(TransportError),
}

struct Connection {
    outbound: mpsc::UnboundedSender<Outbound>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    task: JoinHandle<()>,
}

/// One live chat connection and its transcript.
///
/// The socket is driven by a spawned task; its events are applied in the
/// order they arrive via [`RealtimeChannel::next_event`] or
/// [`RealtimeChannel::poll_events`]. Sends are echoed into the transcript
/// right away: the echo service gives no delivery acknowledgment, so a local
/// entry means "handed to the transport", not "received".
///
/// There is no reconnection. A failed channel stays failed until `open()` is
/// called again. Dropping the channel closes the socket.
pub struct RealtimeChannel {
    url: String,
    connect_timeout: Duration,
    session_id: Uuid,
    state: ChannelState,
    transcript: Transcript,
    connection: Option<Connection>,
    updates: watch::Sender<ChannelState>,
}

impl RealtimeChannel {
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        let (updates, _) = watch::channel(ChannelState::Idle);
        Self {
            url: url.into(),
            connect_timeout,
            session_id: Uuid::new_v4(),
            state: ChannelState::Idle,
            transcript: Transcript::default(),
            connection: None,
            updates,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Identifies the current channel lifetime in logs.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        self.transcript.messages()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChannelState> {
        self.updates.subscribe()
    }

    /// Starts connecting. No-op while connecting or open.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(&mut self) {
        if self.state.is_active() {
            return;
        }

        if let Some(stale) = self.connection.take() {
            stale.task.abort();
        }
        self.session_id = Uuid::new_v4();
        self.transcript.clear();

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_socket(
            self.url.clone(),
            self.connect_timeout,
            outbound_rx,
            event_tx,
        ));

        self.connection = Some(Connection {
            outbound: outbound_tx,
            events: event_rx,
            task,
        });
        log::info!("Chat channel {} connecting to {}", self.session_id, self.url);
        self.set_state(ChannelState::Connecting);
    }

    /// Queues `text` for transmission and appends it to the transcript.
    /// Returns the transcript sequence of the local entry.
    pub fn send(&mut self, text: impl Into<String>) -> Result<u64, ChannelError> {
        if self.state != ChannelState::Open {
            return Err(ChannelError::NotConnected(self.state));
        }
        let Some(connection) = self.connection.as_ref() else {
            return Err(ChannelError::NotConnected(self.state));
        };

        let text = text.into();
        let sequence = self.transcript.push(Origin::Local, text.clone()).sequence;
        if connection.outbound.send(Outbound::Text(text)).is_err() {
            let err = TransportError::Connection("socket task ended".to_string());
            self.fail(err.clone());
            return Err(err.into());
        }
        Ok(sequence)
    }

    /// Closes the socket and discards the transcript. Safe to call in any state.
    pub async fn close(&mut self) {
        if let Some(Connection {
            outbound, mut task, ..
        }) = self.connection.take()
        {
            if self.state == ChannelState::Open {
                self.set_state(ChannelState::Closing);
                let _ = outbound.send(Outbound::Close);
                if tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await.is_err() {
                    log::warn!("Chat channel {} did not close in time", self.session_id);
                    task.abort();
                }
            } else {
                task.abort();
            }
        }

        self.transcript.clear();
        if self.state != ChannelState::Closed {
            log::info!("Chat channel {} closed", self.session_id);
            self.set_state(ChannelState::Closed);
        }
    }

    /// Waits for the next transport event and applies it. Returns `None`
    /// when no connection is live.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        let event = self.connection.as_mut()?.events.recv().await;
        match event {
            Some(event) => Some(self.apply(event)),
            None => self.socket_task_vanished(),
        }
    }

    /// Applies every transport event that already arrived, without waiting.
    pub fn poll_events(&mut self) -> Vec<ChannelEvent> {
        let mut applied = Vec::new();
        while let Some(connection) = self.connection.as_mut() {
            match connection.events.try_recv() {
                Ok(event) => applied.push(self.apply(event)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    applied.extend(self.socket_task_vanished());
                    break;
                }
            }
        }
        applied
    }

    fn apply(&mut self, event: TransportEvent) -> ChannelEvent {
        match event {
            TransportEvent::Opened => {
                self.set_state(ChannelState::Open);
                ChannelEvent::Opened
            }
            TransportEvent::Received(text) => {
                ChannelEvent::Message(self.transcript.push(Origin::Remote, text).clone())
            }
            TransportEvent::Closed => {
                self.connection = None;
                log::info!("Chat channel {} closed by peer", self.session_id);
                self.set_state(ChannelState::Closed);
                ChannelEvent::Closed
            }
            TransportEvent::Failed(err) => {
                self.fail(err.clone());
                ChannelEvent::Failed(err)
            }
        }
    }

    fn socket_task_vanished(&mut self) -> Option<ChannelEvent> {
        self.connection = None;
        if !self.state.is_active() {
            return None;
        }
        let err = TransportError::Connection("socket task ended".to_string());
        self.fail(err.clone());
        Some(ChannelEvent::Failed(err))
    }

    fn fail(&mut self, err: TransportError) {
        log::warn!("Chat channel {} failed: {err}", self.session_id);
        self.connection = None;
        self.set_state(ChannelState::Failed);
    }

    fn set_state(&mut self, state: ChannelState) {
        self.state = state;
        self.updates.send_replace(state);
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        // Dropping the outbound queue makes an open socket close itself; a
        // handshake still in progress is cancelled outright.
        if let Some(connection) = self.connection.take() {
            if self.state == ChannelState::Connecting {
                connection.task.abort();
            }
        }
    }
}
