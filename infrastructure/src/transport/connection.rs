//! A single live diagnostic streaming connection.
//!
//! The socket is split on establish: the write half sits behind an async
//! mutex for `send`, and the read half is owned by a background reader task
//! that classifies frames and forwards events through an unbounded channel.
//! Close cancels the reader before touching the socket, so no event can be
//! delivered after `close` returns.

use crate::transport::error::{Result, TransportError};
use crate::transport::wire;
use detect_application::{StreamConnection, StreamError, StreamHandle};
use detect_domain::{ConnectionState, StreamEvent};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// One open WebSocket connection to the diagnostic endpoint.
pub struct WsConnection {
    session_id: i64,
    state: Arc<StdMutex<ConnectionState>>,
    writer: Mutex<WsSink>,
    events: StdMutex<Option<StreamHandle>>,
    cancel: CancellationToken,
}

impl WsConnection {
    /// Perform the WebSocket handshake and spawn the reader task.
    ///
    /// The endpoint already carries the bearer token as a query parameter,
    /// so it must never be logged whole.
    pub async fn establish(endpoint: &str, session_id: i64) -> Result<Arc<Self>> {
        let state = Arc::new(StdMutex::new(ConnectionState::Connecting));
        debug!(session_id, "opening diagnostic stream");

        let (socket, _response) = match connect_async(endpoint).await {
            Ok(pair) => pair,
            Err(e) => {
                set_state(&state, ConnectionState::Error);
                return Err(e.into());
            }
        };
        set_state(&state, ConnectionState::Connected);
        debug!(session_id, "diagnostic stream connected");

        let (sink, source) = socket.split();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(reader_loop(source, tx, Arc::clone(&state), cancel.clone()));

        Ok(Arc::new(Self {
            session_id,
            state,
            writer: Mutex::new(sink),
            events: StdMutex::new(Some(StreamHandle::new(rx))),
            cancel,
        }))
    }

    fn current_state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StreamConnection for WsConnection {
    fn session_id(&self) -> i64 {
        self.session_id
    }

    fn state(&self) -> ConnectionState {
        self.current_state()
    }

    async fn send(&self, text: &str) -> std::result::Result<(), StreamError> {
        let state = self.current_state();
        if state != ConnectionState::Connected {
            warn!(session_id = self.session_id, %state, "send attempted while not connected");
            return Err(StreamError::NotReady(state));
        }

        let frame = wire::encode_input(text).map_err(TransportError::from)?;
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.send(Message::Text(frame)).await {
            set_state(&self.state, ConnectionState::Error);
            return Err(TransportError::from(e).into());
        }
        Ok(())
    }

    fn take_events(&self) -> Option<StreamHandle> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    async fn close(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        // Stop the reader first so nothing observes the teardown.
        self.cancel.cancel();
        set_state(&self.state, ConnectionState::Closed);
        debug!(session_id = self.session_id, "closing diagnostic stream");

        let mut writer = self.writer.lock().await;
        let _ = writer
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            })))
            .await;
    }
}

fn set_state(state: &Arc<StdMutex<ConnectionState>>, next: ConnectionState) {
    *state.lock().unwrap_or_else(|e| e.into_inner()) = next;
}

/// Reads frames until cancellation or the socket ends, forwarding classified
/// events. Dropping the sender on exit is what terminates the event stream
/// for the consumer.
async fn reader_loop(
    mut source: WsSource,
    tx: mpsc::UnboundedSender<StreamEvent>,
    state: Arc<StdMutex<ConnectionState>>,
    cancel: CancellationToken,
) {
    loop {
        let message = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            message = source.next() => message,
        };

        match message {
            Some(Ok(Message::Text(raw))) => {
                let event = wire::classify_frame(&raw);
                if tx.send(event).is_err() {
                    break;
                }
            }
            Some(Ok(Message::Close(frame))) => {
                handle_close(frame, &tx, &state);
                break;
            }
            // Ping and pong are answered by the protocol layer; the server
            // never sends binary frames.
            Some(Ok(_)) => {}
            Some(Err(WsError::ConnectionClosed)) | Some(Err(WsError::AlreadyClosed)) | None => {
                set_state(&state, ConnectionState::Closed);
                break;
            }
            Some(Err(e)) => {
                set_state(&state, ConnectionState::Error);
                let _ = tx.send(StreamEvent::Error(format!("Connection error: {}", e)));
                break;
            }
        }
    }
}

/// The normal close code ends the connection quietly; any other code, or a
/// close without a code, surfaces exactly one error event with a non-empty
/// description.
fn handle_close(
    frame: Option<CloseFrame<'_>>,
    tx: &mpsc::UnboundedSender<StreamEvent>,
    state: &Arc<StdMutex<ConnectionState>>,
) {
    match frame {
        Some(ref f) if f.code == CloseCode::Normal => {
            set_state(state, ConnectionState::Closed);
        }
        Some(f) => {
            set_state(state, ConnectionState::Error);
            let detail = if f.reason.is_empty() {
                format!("code {}", u16::from(f.code))
            } else {
                f.reason.to_string()
            };
            let _ = tx.send(StreamEvent::Error(
                StreamError::AbnormalClose(detail).to_string(),
            ));
        }
        None => {
            set_state(state, ConnectionState::Error);
            let _ = tx.send(StreamEvent::Error(
                StreamError::AbnormalClose("no close code".to_string()).to_string(),
            ));
        }
    }
}
