//! Persistent WebSocket channel to the vest

use crate::config::SkinConfig;
use crate::error::SkinError;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Lifecycle of the persistent channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Disconnected => write!(f, "disconnected"),
            ChannelState::Connecting => write!(f, "connecting"),
            ChannelState::Connected => write!(f, "connected"),
        }
    }
}

/// The send side of the persistent channel, as the dispatcher sees it.
#[async_trait]
pub trait ControlChannel: Send + Sync {
    fn state(&self) -> ChannelState;

    /// Push one text payload down the channel. One attempt, no retry.
    async fn send_text(&self, payload: String) -> Result<(), SkinError>;
}

/// Owns the WebSocket to `ws://{host}:{port}` and tracks its lifecycle.
///
/// `connect` makes exactly one attempt per call; reconnection policy
/// belongs to whoever drives the loop. A send failure or a reader exit
/// collapses the state back to Disconnected; the next dispatch takes
/// the fallback.
pub struct ConnectionManager {
    url: String,
    connect_timeout: Duration,
    state: Arc<RwLock<ChannelState>>,
    sink: Arc<AsyncMutex<Option<WsSink>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    pub fn new(config: &SkinConfig) -> Result<Self, SkinError> {
        Ok(Self {
            url: config.channel_url()?,
            connect_timeout: config.connect_timeout(),
            state: Arc::new(RwLock::new(ChannelState::Disconnected)),
            sink: Arc::new(AsyncMutex::new(None)),
            reader: Mutex::new(None),
        })
    }

    /// One connection attempt, bounded by the configured timeout.
    /// Returns whether the channel ended up Connected.
    pub async fn connect(&self) -> bool {
        if self.state() == ChannelState::Connected {
            debug!("Channel already connected to {}", self.url);
            return true;
        }

        *self.state.write() = ChannelState::Connecting;
        info!("Connecting to actuation channel {}", self.url);

        match tokio::time::timeout(self.connect_timeout, connect_async(&self.url)).await {
            Ok(Ok((stream, _response))) => {
                let (sink, source) = stream.split();
                *self.sink.lock().await = Some(sink);
                *self.state.write() = ChannelState::Connected;
                self.spawn_reader(source);
                info!("✅ Actuation channel connected");
                true
            }
            Ok(Err(e)) => {
                warn!("❌ Actuation channel connect failed: {}", e);
                *self.state.write() = ChannelState::Disconnected;
                false
            }
            Err(_) => {
                warn!(
                    "❌ Actuation channel connect timed out after {:?}",
                    self.connect_timeout
                );
                *self.state.write() = ChannelState::Disconnected;
                false
            }
        }
    }

    /// Drains the device side of the socket so closes and errors are
    /// noticed even though nothing meaningful flows back.
    fn spawn_reader(&self, mut source: WsSource) {
        let state = self.state.clone();
        let sink = self.sink.clone();
        let handle = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Close(frame)) => {
                        debug!("Channel closed by device: {:?}", frame);
                        break;
                    }
                    Ok(other) => debug!("Ignoring channel message from device: {:?}", other),
                    Err(e) => {
                        warn!("Channel read error: {}", e);
                        break;
                    }
                }
            }
            *state.write() = ChannelState::Disconnected;
            sink.lock().await.take();
            debug!("Channel reader finished");
        });
        *self.reader.lock() = Some(handle);
    }

    /// Close the socket and stop the reader. Safe to call repeatedly.
    pub async fn disconnect(&self) {
        *self.state.write() = ChannelState::Disconnected;
        if let Some(mut sink) = self.sink.lock().await.take() {
            let _ = sink.close().await;
        }
        if let Some(handle) = self.reader.lock().take() {
            handle.abort();
        }
        info!("Actuation channel disconnected");
    }
}

#[async_trait]
impl ControlChannel for ConnectionManager {
    fn state(&self) -> ChannelState {
        *self.state.read()
    }

    async fn send_text(&self, payload: String) -> Result<(), SkinError> {
        let mut guard = self.sink.lock().await;
        let sink = match guard.as_mut() {
            Some(sink) => sink,
            None => {
                *self.state.write() = ChannelState::Disconnected;
                return Err(SkinError::Channel("Channel not connected".to_string()));
            }
        };

        match sink.send(Message::Text(payload)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Channel send failed, marking disconnected: {}", e);
                *self.state.write() = ChannelState::Disconnected;
                guard.take();
                Err(SkinError::WebSocket(e))
            }
        }
    }
}
