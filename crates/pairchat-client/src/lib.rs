//! pairchat-client: async client for two-party pairing chat.
//!
//! Connects to a pairing server over WebSocket, drives the session state
//! machine, and publishes a [`Snapshot`] after every change.
//!
//! # Quick Start
//!
//! ```no_run
//! use pairchat_client::{ChatCommand, ChatRuntime, ClientConfig};
//! use pairchat_core::Session;
//!
//! # async fn example() -> pairchat_core::ChatResult<()> {
//! let session = Session::new("ABC123DEF456XYZ", "Sam", "Male");
//! let handle = ChatRuntime::spawn(ClientConfig::new("wss://pair.example.com/chat"), session)?;
//!
//! handle.send(ChatCommand::SendText("Hello".into())).await?;
//!
//! let mut snapshots = handle.snapshots();
//! while snapshots.changed().await.is_ok() {
//!     println!("{:?}", snapshots.borrow().state);
//! }
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod runtime;
pub mod transport;

pub use controller::SessionController;
pub use runtime::{ChatCommand, ChatHandle, ChatRuntime, ClientConfig};
pub use transport::{pairing_url, Epoch, Transport, TransportEvent, WebSocketTransport};

// Re-export core types for convenience.
pub use pairchat_core::{ChatError, ChatResult, Snapshot};
