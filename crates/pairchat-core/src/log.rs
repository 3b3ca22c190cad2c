//! Ordered conversation log for the current connection.
//!
//! Entries are only ever appended, and once appended keep their position.
//! The single in-place mutation is attaching an image to a photo request.

use crate::model::Message;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    entries: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.entries.push(message);
    }

    /// Attach `image` to the first pending photo request with this `id`.
    ///
    /// Returns `false` and leaves the log untouched when no pending request
    /// matches (unknown id, or the request was already fulfilled).
    pub fn attach_image(&mut self, id: &str, image: &str) -> bool {
        let pending = self.entries.iter_mut().find(|m| {
            m.is_photo_request() && m.id.as_deref() == Some(id) && m.receive_image.is_none()
        });
        match pending {
            Some(message) => {
                message.receive_image = Some(image.to_string());
                true
            }
            None => false,
        }
    }

    /// Whether a photo request with this `id` is still awaiting an image.
    pub fn has_pending_request(&self, id: &str) -> bool {
        self.entries.iter().any(|m| {
            m.is_photo_request() && m.id.as_deref() == Some(id) && m.receive_image.is_none()
        })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
