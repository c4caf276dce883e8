//! Native WebSocket client for talking to the relay.
//!
//! A background thread owns a blocking `tungstenite` socket. Commands go in
//! and events come out over `std::sync::mpsc` channels so the caller can
//! poll from its own frame loop. There is no reconnection.

use crate::collaboration::EventSink;
use crate::sync::{ClientMessage, ConnectionState, ProtocolError, ServerMessage};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tungstenite::{connect, Message};
use url::Url;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Invalid WebSocket URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Already connected")]
    AlreadyConnected,
    #[error("Not connected")]
    NotConnected,
    #[error("Socket thread has exited")]
    ChannelClosed,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Events from the socket thread
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Message(ServerMessage),
    Error { message: String },
}

/// Commands sent to the socket thread.
enum WsCommand {
    Send(String),
    Close,
}

pub struct NativeWebSocket {
    state: ConnectionState,
    events: Vec<TransportEvent>,
    cmd_tx: Option<Sender<WsCommand>>,
    event_rx: Option<Receiver<TransportEvent>>,
    _thread: Option<JoinHandle<()>>,
}

impl NativeWebSocket {
    /// Create a client that is not connected yet.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Closed,
            events: Vec::new(),
            cmd_tx: None,
            event_rx: None,
            _thread: None,
        }
    }

    /// Start connecting to `url` (`ws://` or `wss://`) on a background thread.
    pub fn connect(&mut self, url: &str) -> Result<(), TransportError> {
        if self.cmd_tx.is_some() {
            return Err(TransportError::AlreadyConnected);
        }

        let parsed = Url::parse(url)?;
        if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
            return Err(TransportError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        self.state = ConnectionState::Connecting;

        let (cmd_tx, cmd_rx) = channel::<WsCommand>();
        let (event_tx, event_rx) = channel::<TransportEvent>();
        let url = url.to_string();

        let handle = thread::spawn(move || run_socket(&url, &cmd_rx, &event_tx));

        self.cmd_tx = Some(cmd_tx);
        self.event_rx = Some(event_rx);
        self._thread = Some(handle);
        Ok(())
    }

    /// Close the connection. Pending events are dropped.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(WsCommand::Close);
        }
        self.event_rx = None;
        self._thread = None;
        self.state = ConnectionState::Closed;
    }

    pub fn send(&self, msg: &ClientMessage) -> Result<(), TransportError> {
        let tx = self.cmd_tx.as_ref().ok_or(TransportError::NotConnected)?;
        tx.send(WsCommand::Send(msg.to_json()?))
            .map_err(|_| TransportError::ChannelClosed)
    }

    /// Drain pending events without blocking.
    pub fn poll_events(&mut self) -> Vec<TransportEvent> {
        if let Some(rx) = &self.event_rx {
            while let Ok(event) = rx.try_recv() {
                match &event {
                    TransportEvent::Connected => self.state = ConnectionState::Open,
                    TransportEvent::Disconnected => self.state = ConnectionState::Closed,
                    TransportEvent::Error { .. } => self.state = ConnectionState::Closed,
                    TransportEvent::Message(_) => {}
                }
                self.events.push(event);
            }
        }
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Open
    }
}

impl Default for NativeWebSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NativeWebSocket {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl EventSink for NativeWebSocket {
    fn send_event(&mut self, msg: ClientMessage) {
        if let Err(e) = self.send(&msg) {
            log::warn!("Dropping outgoing message: {}", e);
        }
    }
}

fn run_socket(url: &str, cmd_rx: &Receiver<WsCommand>, event_tx: &Sender<TransportEvent>) {
    log::info!("WebSocket thread: connecting to {}", url);

    let (mut socket, response) = match connect(url) {
        Ok(ok) => ok,
        Err(e) => {
            log::error!("WebSocket connection failed: {}", e);
            let _ = event_tx.send(TransportEvent::Error {
                message: format!("Connection failed: {}", e),
            });
            return;
        }
    };
    log::info!("WebSocket connected, status: {}", response.status());
    let _ = event_tx.send(TransportEvent::Connected);

    // Short read timeout so the loop can service outgoing commands.
    match socket.get_mut() {
        tungstenite::stream::MaybeTlsStream::Plain(tcp) => {
            let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
            let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
        }
        #[allow(unreachable_patterns)]
        _ => log::debug!("Non-plain stream, using default timeouts"),
    }

    loop {
        match cmd_rx.try_recv() {
            Ok(WsCommand::Send(msg)) => {
                if let Err(e) = socket.send(Message::Text(msg)) {
                    log::error!("WebSocket send error: {}", e);
                    break;
                }
            }
            Ok(WsCommand::Close) => {
                log::info!("WebSocket close requested");
                let _ = socket.close(None);
                break;
            }
            Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match socket.read() {
            Ok(Message::Text(txt)) => match ServerMessage::from_json(&txt) {
                Ok(msg) => {
                    let _ = event_tx.send(TransportEvent::Message(msg));
                }
                Err(e) => log::warn!("Failed to parse server message: {}", e),
            },
            Ok(Message::Ping(data)) => {
                let _ = socket.send(Message::Pong(data));
            }
            Ok(Message::Close(_)) => {
                log::info!("WebSocket received close frame");
                break;
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                log::error!("WebSocket read error: {}", e);
                break;
            }
        }
    }

    log::info!("WebSocket thread exiting");
    let _ = event_tx.send(TransportEvent::Disconnected);
}
