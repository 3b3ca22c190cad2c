//! WebSocket transport for pairchat.
//!
//! Each `open` spawns one link task that connects, forwards inbound text
//! frames as [`TransportEvent`]s tagged with the link's epoch, and writes
//! outbound frames taken from an unbounded channel. Dropping that channel's
//! sender is how a link is told to close.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use super::{Epoch, Transport, TransportEvent};

/// Upper bound on waiting for our close frame to go out.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

struct ActiveLink {
    epoch: Epoch,
    outgoing: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

/// Transport backed by `tokio-tungstenite`. Must be used inside a tokio runtime.
pub struct WebSocketTransport {
    events: mpsc::UnboundedSender<TransportEvent>,
    active: Option<ActiveLink>,
}

impl WebSocketTransport {
    pub fn new(events: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self {
            events,
            active: None,
        }
    }

    /// Epoch of the link currently owned by this transport.
    pub fn active_epoch(&self) -> Option<Epoch> {
        self.active.as_ref().map(|link| link.epoch)
    }

    async fn run_link(
        url: String,
        epoch: Epoch,
        events: mpsc::UnboundedSender<TransportEvent>,
        mut outgoing: mpsc::UnboundedReceiver<String>,
    ) {
        let ws = match connect_async(url.as_str()).await {
            Ok((ws, _response)) => ws,
            Err(e) => {
                tracing::warn!(epoch = epoch.0, "WebSocket connect error: {}", e);
                let _ = events.send(TransportEvent::Closed { epoch });
                return;
            }
        };

        tracing::info!(epoch = epoch.0, "WebSocket connected");
        if events.send(TransportEvent::Opened { epoch }).is_err() {
            return;
        }

        let (mut sink, mut stream) = ws.split();

        loop {
            tokio::select! {
                inbound = stream.next() => match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if events.send(TransportEvent::Frame { epoch, text }).is_err() {
                            tracing::debug!("event channel closed");
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::debug!(epoch = epoch.0, "WebSocket close frame received");
                        break;
                    }
                    Some(Ok(_)) => {} // Binary frames and pongs carry nothing for us.
                    Some(Err(e)) => {
                        tracing::warn!(epoch = epoch.0, "WebSocket read error: {}", e);
                        break;
                    }
                    None => break,
                },
                outbound = outgoing.recv() => match outbound {
                    Some(frame) => {
                        if let Err(e) = sink.send(Message::Text(frame)).await {
                            tracing::warn!(epoch = epoch.0, "WebSocket write error: {}", e);
                            break;
                        }
                    }
                    None => {
                        let _ = tokio::time::timeout(CLOSE_TIMEOUT, sink.send(Message::Close(None))).await;
                        break;
                    }
                },
            }
        }

        let _ = events.send(TransportEvent::Closed { epoch });
        tracing::debug!(epoch = epoch.0, "WebSocket link ended");
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, url: &Url, epoch: Epoch) {
        self.close();

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel::<String>();
        let task = tokio::spawn(Self::run_link(
            url.to_string(),
            epoch,
            self.events.clone(),
            outgoing_rx,
        ));
        self.active = Some(ActiveLink {
            epoch,
            outgoing,
            task,
        });
    }

    fn send(&mut self, frame: String) {
        match &self.active {
            Some(link) => {
                if link.outgoing.send(frame).is_err() {
                    tracing::debug!(epoch = link.epoch.0, "link already ended, frame dropped");
                }
            }
            None => tracing::debug!("no open link, frame dropped"),
        }
    }

    fn close(&mut self) {
        // Dropping the sender lets the link send a close frame and exit.
        if let Some(link) = self.active.take() {
            tracing::debug!(epoch = link.epoch.0, "closing link");
            drop(link.outgoing);
        }
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        if let Some(link) = self.active.take() {
            link.task.abort();
        }
    }
}
