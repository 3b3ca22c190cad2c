//! Async runtime around the session controller.
//!
//! `ChatRuntime` owns the controller and runs a single task that serializes
//! transport events, user commands and the typing-expiry timer, so none of
//! them ever run concurrently.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use pairchat_core::{ChatError, ChatResult, Session, Snapshot, DEFAULT_TYPING_EXPIRY};

use crate::controller::SessionController;
use crate::transport::{TransportEvent, WebSocketTransport};

/// Configuration for a chat runtime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Pairing server endpoint (`ws://` or `wss://`), without session params.
    pub server_url: String,
    /// How long the peer typing indicator survives without a refresh.
    pub typing_expiry: Duration,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            typing_expiry: DEFAULT_TYPING_EXPIRY,
        }
    }
}

/// User-initiated actions, applied in the order they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    SendText(String),
    SendImage(String),
    RequestPhoto,
    FulfillPhoto { id: String, image: String },
    SetTyping(bool),
    NewPairing,
    /// Disconnect and stop the runtime.
    Leave,
}

/// Handle to a running chat runtime.
pub struct ChatHandle {
    commands: mpsc::Sender<ChatCommand>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl ChatHandle {
    /// Queue a command. Fails only when the runtime has stopped.
    pub async fn send(&self, command: ChatCommand) -> ChatResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ChatError::Other("chat runtime stopped".into()))
    }

    /// A receiver for session snapshots. It closes when the runtime stops.
    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait for the runtime task to finish.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::warn!("chat runtime task failed: {}", e);
        }
    }
}

pub struct ChatRuntime {
    controller: SessionController<WebSocketTransport>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    commands: mpsc::Receiver<ChatCommand>,
}

impl ChatRuntime {
    /// Validate the session, start connecting, and spawn the runtime task.
    pub fn spawn(config: ClientConfig, session: Session) -> ChatResult<ChatHandle> {
        let (events_tx, events) = mpsc::unbounded_channel::<TransportEvent>();
        let (commands_tx, commands) = mpsc::channel::<ChatCommand>(64);

        let transport = WebSocketTransport::new(events_tx);
        let mut controller =
            SessionController::new(session, config.server_url, transport, config.typing_expiry);
        controller.connect()?;
        let snapshots = controller.subscribe();

        let runtime = Self {
            controller,
            events,
            commands,
        };
        let task = tokio::spawn(runtime.run());

        Ok(ChatHandle {
            commands: commands_tx,
            snapshots,
            task,
        })
    }

    async fn run(mut self) {
        loop {
            let deadline = self.controller.typing_deadline();
            tokio::select! {
                Some(event) = self.events.recv() => {
                    self.controller.handle_transport_event(event, Instant::now());
                }
                command = self.commands.recv() => {
                    let command = command.unwrap_or(ChatCommand::Leave);
                    if self.apply(command).is_break() {
                        break;
                    }
                }
                _ = wait_until(deadline) => {
                    self.controller.expire_typing(Instant::now());
                }
            }
        }
        tracing::debug!("chat runtime ended");
    }

    fn apply(&mut self, command: ChatCommand) -> ControlFlow<()> {
        match command {
            ChatCommand::SendText(text) => self.controller.send_text(&text),
            ChatCommand::SendImage(image) => self.controller.send_image(&image),
            ChatCommand::RequestPhoto => {
                self.controller.request_photo();
            }
            ChatCommand::FulfillPhoto { id, image } => {
                self.controller.fulfill_photo_request(&id, &image)
            }
            ChatCommand::SetTyping(is_typing) => self.controller.set_typing(is_typing),
            ChatCommand::NewPairing => {
                if let Err(e) = self.controller.new_pairing() {
                    tracing::warn!("new pairing failed: {}", e);
                }
            }
            ChatCommand::Leave => {
                self.controller.leave();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
