//! Session data model shared by the controller and the renderer.

use crate::envelope::PHOTO_REQUEST;
use crate::error::{ChatError, ChatResult};

/// Identity of one pairing attempt, fixed for the lifetime of a chat screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Code both peers entered out of band; the server pairs on it.
    pub secret_code: String,
    /// Local display name, carried in every outbound payload.
    pub display_name: String,
    /// Advisory gender tag. Forwarded to the server as-is.
    pub gender: String,
}

impl Session {
    pub fn new(
        secret_code: impl Into<String>,
        display_name: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            secret_code: secret_code.into(),
            display_name: display_name.into(),
            gender: gender.into(),
        }
    }

    /// Check that every field is non-empty.
    pub fn validate(&self) -> ChatResult<()> {
        if self.secret_code.trim().is_empty() {
            return Err(ChatError::IncompleteSession("secret code"));
        }
        if self.display_name.trim().is_empty() {
            return Err(ChatError::IncompleteSession("display name"));
        }
        if self.gender.trim().is_empty() {
            return Err(ChatError::IncompleteSession("gender"));
        }
        Ok(())
    }
}

/// Connection lifecycle, owned by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected,
}

/// The peer's declared display name, unknown until an identity frame arrives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeerIdentity {
    pub name: Option<String>,
}

impl PeerIdentity {
    /// Name for display, falling back to a neutral label.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Stranger")
    }
}

/// Which side of the conversation produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Local,
    Remote,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message body. Absent only for placeholders with nothing to show yet.
    pub text: Option<String>,
    pub sender: Sender,
    /// Correlation id, set only on photo requests.
    pub id: Option<String>,
    /// Image attached later by a fulfillment.
    pub receive_image: Option<String>,
}

/// How the renderer should present a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    /// The text is a `data:image/...;base64,` URL.
    InlineImage,
    PhotoRequest { fulfilled: bool },
}

impl Message {
    pub fn local_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            sender: Sender::Local,
            id: None,
            receive_image: None,
        }
    }

    pub fn remote_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            sender: Sender::Remote,
            id: None,
            receive_image: None,
        }
    }

    /// A photo request placeholder awaiting an image with the same `id`.
    pub fn photo_request(sender: Sender, id: impl Into<String>) -> Self {
        Self {
            text: Some(PHOTO_REQUEST.to_string()),
            sender,
            id: Some(id.into()),
            receive_image: None,
        }
    }

    pub fn is_photo_request(&self) -> bool {
        self.id.is_some() && self.text.as_deref() == Some(PHOTO_REQUEST)
    }

    pub fn kind(&self) -> MessageKind {
        if self.is_photo_request() {
            return MessageKind::PhotoRequest {
                fulfilled: self.receive_image.is_some(),
            };
        }
        match self.text.as_deref() {
            Some(text) if is_inline_image(text) => MessageKind::InlineImage,
            _ => MessageKind::Text,
        }
    }
}

/// Whether `text` is a base64 image data URL.
pub fn is_inline_image(text: &str) -> bool {
    text.starts_with("data:") && text.contains("image") && text.contains("base64")
}

/// Read-only view of session state handed to the renderer after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub state: ConnectionState,
    pub peer: PeerIdentity,
    pub messages: Vec<Message>,
    pub peer_typing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_fields() {
        assert!(Session::new("ABC", "Sam", "Male").validate().is_ok());
        assert!(matches!(
            Session::new("", "Sam", "Male").validate(),
            Err(ChatError::IncompleteSession("secret code"))
        ));
        assert!(matches!(
            Session::new("ABC", "  ", "Male").validate(),
            Err(ChatError::IncompleteSession("display name"))
        ));
        assert!(Session::new("ABC", "Sam", "").validate().is_err());
    }

    #[test]
    fn message_kinds() {
        assert_eq!(Message::local_text("hi").kind(), MessageKind::Text);
        assert_eq!(
            Message::remote_text("data:image/png;base64,AAA").kind(),
            MessageKind::InlineImage
        );
        assert_eq!(
            Message::remote_text("data:text/plain,hello").kind(),
            MessageKind::Text
        );

        let mut request = Message::photo_request(Sender::Remote, "X");
        assert_eq!(request.kind(), MessageKind::PhotoRequest { fulfilled: false });
        request.receive_image = Some("data:image/png;base64,AAA".into());
        assert_eq!(request.kind(), MessageKind::PhotoRequest { fulfilled: true });
    }

    #[test]
    fn sentinel_without_id_is_plain_text() {
        assert_eq!(Message::remote_text(PHOTO_REQUEST).kind(), MessageKind::Text);
    }

    #[test]
    fn peer_display_name_fallback() {
        assert_eq!(PeerIdentity::default().display_name(), "Stranger");
        let peer = PeerIdentity { name: Some("Ana".into()) };
        assert_eq!(peer.display_name(), "Ana");
    }
}
