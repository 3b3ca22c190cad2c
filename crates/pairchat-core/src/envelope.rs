//! Two-layer JSON envelope used between peers.
//!
//! Outer frame: `{"type": "text", "message": "<inner JSON as a string>"}`
//!
//! Inner payloads are told apart by which keys are present, checked in order:
//! 1. `fullName` without `text` → identity
//! 2. `isTyping` → typing
//! 3. `receiveImage` and `id` → photo fulfillment
//! 4. `leave: true` → leave notice
//! 5. anything else → chat (`text == "photo_request"` with an `id` is a photo request)
//!
//! An inner payload that is not a JSON object degrades to plain text.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ChatResult;

/// Chat text that marks a photo request.
pub const PHOTO_REQUEST: &str = "photo_request";

/// The only outer frame type in use.
const FRAME_TEXT: &str = "text";

#[derive(Debug, Serialize)]
struct OuterFrame {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// An application payload to send to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPayload {
    Identity {
        full_name: String,
    },
    Chat {
        text: String,
        full_name: String,
        id: Option<String>,
    },
    Typing {
        full_name: String,
        is_typing: bool,
    },
    PhotoFulfill {
        full_name: String,
        id: String,
        receive_image: String,
    },
    Leave {
        full_name: String,
    },
}

#[derive(Serialize)]
struct IdentityWire<'a> {
    #[serde(rename = "fullName")]
    full_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatWire<'a> {
    text: &'a str,
    full_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TypingWire<'a> {
    text: Option<&'a str>,
    full_name: &'a str,
    is_typing: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FulfillWire<'a> {
    text: Option<&'a str>,
    full_name: &'a str,
    receive_image: &'a str,
    id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaveWire<'a> {
    text: Option<&'a str>,
    full_name: &'a str,
    leave: bool,
}

impl OutboundPayload {
    /// Serialize just the inner payload.
    pub fn to_inner_json(&self) -> ChatResult<String> {
        let json = match self {
            Self::Identity { full_name } => serde_json::to_string(&IdentityWire { full_name })?,
            Self::Chat {
                text,
                full_name,
                id,
            } => serde_json::to_string(&ChatWire {
                text,
                full_name,
                id: id.as_deref(),
            })?,
            Self::Typing {
                full_name,
                is_typing,
            } => serde_json::to_string(&TypingWire {
                text: None,
                full_name,
                is_typing: *is_typing,
            })?,
            Self::PhotoFulfill {
                full_name,
                id,
                receive_image,
            } => serde_json::to_string(&FulfillWire {
                text: None,
                full_name,
                receive_image,
                id,
            })?,
            Self::Leave { full_name } => serde_json::to_string(&LeaveWire {
                text: None,
                full_name,
                leave: true,
            })?,
        };
        Ok(json)
    }
}

/// Wrap a payload into an outer text frame ready for the transport.
pub fn encode_frame(payload: &OutboundPayload) -> ChatResult<String> {
    let frame = OuterFrame {
        kind: FRAME_TEXT.to_string(),
        message: payload.to_inner_json()?,
    };
    Ok(serde_json::to_string(&frame)?)
}

/// A classified inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Identity {
        full_name: String,
    },
    Typing {
        is_typing: bool,
        full_name: Option<String>,
    },
    PhotoFulfill {
        id: String,
        receive_image: String,
        full_name: Option<String>,
    },
    Leave {
        full_name: Option<String>,
    },
    PhotoRequest {
        id: String,
        full_name: Option<String>,
    },
    Chat {
        text: Option<String>,
        id: Option<String>,
        full_name: Option<String>,
    },
    /// Fallback for payloads that are not JSON objects.
    PlainText {
        text: String,
    },
}

impl InboundEvent {
    /// The sender's display name, if the payload carried one.
    pub fn full_name(&self) -> Option<&str> {
        match self {
            Self::Identity { full_name } => Some(full_name),
            Self::Typing { full_name, .. }
            | Self::PhotoFulfill { full_name, .. }
            | Self::Leave { full_name }
            | Self::PhotoRequest { full_name, .. }
            | Self::Chat { full_name, .. } => full_name.as_deref(),
            Self::PlainText { .. } => None,
        }
    }
}

/// Decode a raw transport frame.
///
/// Returns `None` for frames of an unknown outer type. Never fails: anything
/// unparseable becomes [`InboundEvent::PlainText`].
pub fn decode_frame(raw: &str) -> Option<InboundEvent> {
    let plain = |text: &str| {
        Some(InboundEvent::PlainText {
            text: text.to_string(),
        })
    };

    let Ok(Value::Object(outer)) = serde_json::from_str::<Value>(raw) else {
        return plain(raw);
    };

    match outer.get("type").and_then(Value::as_str) {
        Some(FRAME_TEXT) => {}
        Some(kind) => {
            tracing::debug!(kind = %kind, "dropping frame of unknown type");
            return None;
        }
        None => return plain(raw),
    }

    let Some(message) = outer.get("message").and_then(Value::as_str) else {
        return plain(raw);
    };
    match serde_json::from_str::<Map<String, Value>>(message) {
        Ok(inner) => Some(classify(&inner)),
        Err(_) => plain(message),
    }
}

fn string_field(inner: &Map<String, Value>, key: &str) -> Option<String> {
    inner.get(key).and_then(Value::as_str).map(str::to_string)
}

fn classify(inner: &Map<String, Value>) -> InboundEvent {
    let full_name = string_field(inner, "fullName");

    if !inner.contains_key("text") {
        if let Some(full_name) = full_name.clone() {
            return InboundEvent::Identity { full_name };
        }
    }

    if let Some(flag) = inner.get("isTyping") {
        return InboundEvent::Typing {
            is_typing: flag.as_bool().unwrap_or(false),
            full_name,
        };
    }

    if let (Some(receive_image), Some(id)) =
        (string_field(inner, "receiveImage"), string_field(inner, "id"))
    {
        return InboundEvent::PhotoFulfill {
            id,
            receive_image,
            full_name,
        };
    }

    if inner.get("leave").and_then(Value::as_bool) == Some(true) {
        return InboundEvent::Leave { full_name };
    }

    let text = string_field(inner, "text");
    let id = string_field(inner, "id");
    match id {
        Some(id) if text.as_deref() == Some(PHOTO_REQUEST) => {
            InboundEvent::PhotoRequest { id, full_name }
        }
        id => InboundEvent::Chat {
            text,
            id,
            full_name,
        },
    }
}
