//! Session controller: the pairing state machine.
//!
//! The controller is the only owner of the transport and the only writer of
//! [`ConnectionState`]. It is synchronous; the runtime feeds it transport
//! events, user actions and typing-expiry ticks one at a time.
//!
//! User actions whose preconditions do not hold (not connected, empty input,
//! unknown correlation id) are dropped with a debug log instead of erroring.
//! Delivery is at most once: local messages are echoed into the log before
//! the frame is handed to the transport, and nothing is acknowledged.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use pairchat_core::envelope::{decode_frame, encode_frame, InboundEvent, OutboundPayload, PHOTO_REQUEST};
use pairchat_core::model::{ConnectionState, Message, PeerIdentity, Sender, Session, Snapshot};
use pairchat_core::{correlation_id, ChatResult, ConversationLog, TypingTracker};

use crate::transport::{pairing_url, Epoch, Transport, TransportEvent};

pub struct SessionController<T: Transport> {
    session: Session,
    server_url: String,
    transport: T,
    state: ConnectionState,
    epoch: Epoch,
    peer: PeerIdentity,
    log: ConversationLog,
    typing: TypingTracker,
    snapshots: watch::Sender<Snapshot>,
}

impl<T: Transport> SessionController<T> {
    pub fn new(
        session: Session,
        server_url: impl Into<String>,
        transport: T,
        typing_expiry: Duration,
    ) -> Self {
        let (snapshots, _) = watch::channel(Snapshot::default());
        Self {
            session,
            server_url: server_url.into(),
            transport,
            state: ConnectionState::Idle,
            epoch: Epoch::default(),
            peer: PeerIdentity::default(),
            log: ConversationLog::new(),
            typing: TypingTracker::new(typing_expiry),
            snapshots,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn peer(&self) -> &PeerIdentity {
        &self.peer
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn is_peer_typing(&self) -> bool {
        self.typing.is_typing()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// When the typing indicator is due to expire, if it is armed.
    pub fn typing_deadline(&self) -> Option<Instant> {
        self.typing.deadline()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            peer: self.peer.clone(),
            messages: self.log.entries().to_vec(),
            peer_typing: self.typing.is_typing(),
        }
    }

    /// Receiver that observes a fresh snapshot after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Open a connection for this session.
    ///
    /// Fails when a session field is empty or the server URL is unusable;
    /// callers should send the user back to pairing entry. A no-op while a
    /// connection is already in progress or open.
    pub fn connect(&mut self) -> ChatResult<()> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                debug!(state = ?self.state, "connect ignored, already active");
                Ok(())
            }
            ConnectionState::Idle | ConnectionState::Disconnected => self.open_transport(),
        }
    }

    /// Drop the current peer and pair again with the same session attributes.
    pub fn new_pairing(&mut self) -> ChatResult<()> {
        match self.state {
            ConnectionState::Connected => {
                self.emit(OutboundPayload::Leave {
                    full_name: self.session.display_name.clone(),
                });
                self.transport.close();
                self.mark_disconnected();
                self.publish();
            }
            ConnectionState::Connecting => self.transport.close(),
            ConnectionState::Idle | ConnectionState::Disconnected => {}
        }
        self.open_transport()
    }

    /// Tear down the connection and stay disconnected.
    pub fn leave(&mut self) {
        self.transport.close();
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                self.mark_disconnected();
                self.publish();
            }
            ConnectionState::Idle | ConnectionState::Disconnected => {}
        }
    }

    pub fn send_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            debug!("send_text suppressed: empty message");
            return;
        }
        if !self.require_connected("send_text") {
            return;
        }
        self.log.append(Message::local_text(text));
        self.emit(OutboundPayload::Chat {
            text: text.to_string(),
            full_name: self.session.display_name.clone(),
            id: None,
        });
        self.publish();
    }

    /// Send an image as a data URL chat message.
    pub fn send_image(&mut self, data_url: &str) {
        if data_url.trim().is_empty() {
            debug!("send_image suppressed: empty image");
            return;
        }
        if !self.require_connected("send_image") {
            return;
        }
        self.log.append(Message::local_text(data_url));
        self.emit(OutboundPayload::Chat {
            text: data_url.to_string(),
            full_name: self.session.display_name.clone(),
            id: None,
        });
        self.publish();
    }

    /// Ask the peer for a photo. Returns the correlation id when sent.
    pub fn request_photo(&mut self) -> Option<String> {
        if !self.require_connected("request_photo") {
            return None;
        }
        let id = correlation_id();
        self.log.append(Message::photo_request(Sender::Local, id.clone()));
        self.emit(OutboundPayload::Chat {
            text: PHOTO_REQUEST.to_string(),
            full_name: self.session.display_name.clone(),
            id: Some(id.clone()),
        });
        self.publish();
        Some(id)
    }

    /// Answer the pending photo request `id` with `data_url`.
    ///
    /// Nothing is sent unless a request with that id is still pending.
    pub fn fulfill_photo_request(&mut self, id: &str, data_url: &str) {
        if id.trim().is_empty() || data_url.trim().is_empty() {
            debug!("fulfill suppressed: missing id or image");
            return;
        }
        if !self.require_connected("fulfill_photo_request") {
            return;
        }
        if !self.log.attach_image(id, data_url) {
            debug!(id, "fulfill suppressed: no pending request");
            return;
        }
        self.emit(OutboundPayload::PhotoFulfill {
            full_name: self.session.display_name.clone(),
            id: id.to_string(),
            receive_image: data_url.to_string(),
        });
        self.publish();
    }

    pub fn set_typing(&mut self, is_typing: bool) {
        if !self.require_connected("set_typing") {
            return;
        }
        self.emit(OutboundPayload::Typing {
            full_name: self.session.display_name.clone(),
            is_typing,
        });
    }

    /// Apply one transport event. Events from superseded epochs are ignored.
    pub fn handle_transport_event(&mut self, event: TransportEvent, now: Instant) {
        if event.epoch() != self.epoch {
            debug!(event_epoch = event.epoch().0, current = self.epoch.0, "stale transport event ignored");
            return;
        }
        match event {
            TransportEvent::Opened { .. } => self.on_open(),
            TransportEvent::Frame { text, .. } => self.on_frame(&text, now),
            TransportEvent::Closed { .. } => self.on_close(),
        }
    }

    /// Clear the typing indicator if its expiry has passed.
    pub fn expire_typing(&mut self, now: Instant) {
        if self.typing.expire(now) {
            self.publish();
        }
    }

    fn open_transport(&mut self) -> ChatResult<()> {
        self.session.validate()?;
        let url = pairing_url(&self.server_url, &self.session)?;
        self.epoch = self.epoch.next();
        self.state = ConnectionState::Connecting;
        info!(epoch = self.epoch.0, "connecting to pairing server");
        self.transport.open(&url, self.epoch);
        self.publish();
        Ok(())
    }

    fn on_open(&mut self) {
        if self.state != ConnectionState::Connecting {
            debug!(state = ?self.state, "open ignored");
            return;
        }
        self.state = ConnectionState::Connected;
        self.peer = PeerIdentity::default();
        self.log.clear();
        self.typing.clear();
        info!(epoch = self.epoch.0, "connected");

        self.emit(OutboundPayload::Identity {
            full_name: self.session.display_name.clone(),
        });
        self.publish();
    }

    fn on_close(&mut self) {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                self.transport.close();
                self.mark_disconnected();
                self.publish();
            }
            ConnectionState::Idle | ConnectionState::Disconnected => {}
        }
    }

    fn on_frame(&mut self, raw: &str, now: Instant) {
        if self.state != ConnectionState::Connected {
            debug!(state = ?self.state, "frame ignored while not connected");
            return;
        }
        let Some(event) = decode_frame(raw) else {
            return;
        };

        if let Some(name) = event.full_name() {
            if self.peer.name.is_none() {
                self.peer.name = Some(name.to_string());
            }
        }

        match event {
            InboundEvent::Identity { full_name } => {
                self.peer.name = Some(full_name);
            }
            InboundEvent::Typing { is_typing, .. } => {
                self.typing.on_typing_event(is_typing, now);
            }
            InboundEvent::PhotoFulfill {
                id, receive_image, ..
            } => {
                if !self.log.attach_image(&id, &receive_image) {
                    debug!(id = %id, "fulfillment for unknown photo request ignored");
                }
            }
            InboundEvent::Leave { .. } => {
                info!("peer left");
                self.transport.close();
                self.mark_disconnected();
            }
            InboundEvent::PhotoRequest { id, .. } => {
                self.log.append(Message::photo_request(Sender::Remote, id));
            }
            InboundEvent::Chat {
                text: Some(text),
                id,
                ..
            } => {
                self.log.append(Message {
                    id,
                    ..Message::remote_text(text)
                });
            }
            InboundEvent::Chat { text: None, .. } => {
                debug!("chat frame without text ignored");
            }
            InboundEvent::PlainText { text } => {
                self.log.append(Message::remote_text(text));
            }
        }
        self.publish();
    }

    fn mark_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.typing.clear();
        info!(epoch = self.epoch.0, "disconnected");
    }

    fn require_connected(&self, action: &str) -> bool {
        if self.state == ConnectionState::Connected {
            true
        } else {
            debug!(action, state = ?self.state, "action suppressed while not connected");
            false
        }
    }

    fn emit(&mut self, payload: OutboundPayload) {
        match encode_frame(&payload) {
            Ok(frame) => self.transport.send(frame),
            Err(e) => warn!("failed to encode payload: {}", e),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}
