//! pairchat-core: protocol library for two-party anonymous chat.
//!
//! Provides the session data model, the two-layer JSON envelope codec,
//! the conversation log, the typing-presence tracker, and random code
//! generation. Nothing in this crate performs I/O.

pub mod code;
pub mod envelope;
pub mod error;
pub mod log;
pub mod model;
pub mod typing;

// Re-export commonly used items at crate root.
pub use code::{correlation_id, random_code, CODE_LEN};
pub use envelope::{decode_frame, encode_frame, InboundEvent, OutboundPayload, PHOTO_REQUEST};
pub use error::{ChatError, ChatResult};
pub use log::ConversationLog;
pub use model::{ConnectionState, Message, MessageKind, PeerIdentity, Sender, Session, Snapshot};
pub use typing::{DeferredClear, TypingTracker, DEFAULT_TYPING_EXPIRY};
