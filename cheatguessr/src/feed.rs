// cheatguessr/src/feed.rs
use common::{parse_coordinate, FeedConfig, Guess, HubError};
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, protocol::Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::hub::Hub;

type FeedStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection state of a feed subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Dialing,
    Streaming,
    Backoff,
    /// Reached only through cancellation
    Stopped,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("dial failed: {0}")]
    Dial(#[source] tungstenite::Error),

    #[error("dial timed out after {0:?}")]
    DialTimeout(Duration),

    #[error("read failed: {0}")]
    Read(#[source] tungstenite::Error),

    #[error("upstream closed the connection")]
    Closed,

    #[error("cannot parse coordinate: {0}")]
    Parse(#[from] HubError),
}

/// Self-healing subscription to an upstream coordinate feed.
///
/// Every coordinate is broadcast as a `bot` guess under the configured name.
/// Dial failures, including a handshake outlasting `dial_timeout`, retry after
/// `dial_retry`; stream failures wait `backoff` before redialing. Only the
/// shutdown token ends the loop.
pub struct FeedConnector {
    config: FeedConfig,
    hub: Hub,
    state: watch::Sender<FeedState>,
}

impl FeedConnector {
    pub fn new(config: FeedConfig, hub: Hub) -> Self {
        let (state, _) = watch::channel(FeedState::Dialing);
        Self { config, hub, state }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Observe state transitions
    pub fn state(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Run on the current actix arbiter until `shutdown` is cancelled
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        actix::spawn(self.run(shutdown))
    }

    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!("Starting feed {} from {}", self.config.name, self.config.url);

        loop {
            self.state.send_replace(FeedState::Dialing);

            let dial_timeout = self.config.dial_timeout();
            let dialed = tokio::select! {
                _ = shutdown.cancelled() => break,
                dialed = tokio::time::timeout(dial_timeout, connect_async(self.config.url.as_str())) => dialed,
            };

            let failure = match dialed {
                Ok(Ok((stream, _))) => {
                    tracing::info!("Feed {} connected", self.config.name);
                    self.state.send_replace(FeedState::Streaming);

                    match self.stream(stream, &shutdown).await {
                        Some(e) => tracing::warn!("Feed {} connection failed: {}", self.config.name, e),
                        None => break,
                    }

                    self.state.send_replace(FeedState::Backoff);
                    if !pause(self.config.backoff(), &shutdown).await {
                        break;
                    }
                    continue;
                },
                Ok(Err(e)) => FeedError::Dial(e),
                // Upstream took the connection but never finished the handshake
                Err(_) => FeedError::DialTimeout(dial_timeout),
            };

            tracing::warn!("Feed {}: {}", self.config.name, failure);
            if !pause(self.config.dial_retry(), &shutdown).await {
                break;
            }
        }

        self.state.send_replace(FeedState::Stopped);
        tracing::info!("Feed {} stopped", self.config.name);
    }

    // Returns the failure that ended the stream, or None on shutdown
    async fn stream(&self, mut stream: FeedStream, shutdown: &CancellationToken) -> Option<FeedError> {
        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = stream.close(None).await;
                    return None;
                },
                next = stream.next() => next,
            };

            let payload = match next {
                Some(Ok(Message::Text(text))) => text.into_bytes(),
                Some(Ok(Message::Binary(data))) => data,
                Some(Ok(Message::Close(_))) | None => return Some(FeedError::Closed),
                // Control frames, pings are answered by tungstenite
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Some(FeedError::Read(e)),
            };

            match parse_coordinate(&payload) {
                Ok(location) => {
                    tracing::debug!("Feed {} guess: ({}, {})", self.config.name, location.lat, location.lng);
                    self.hub.broadcast(Guess::bot(self.config.name.clone(), location));
                },
                Err(e) => return Some(FeedError::Parse(e)),
            }
        }
    }
}

// False when interrupted by shutdown
async fn pause(delay: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
