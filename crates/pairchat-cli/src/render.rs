//! Turns successive snapshots into transcript lines.

use pairchat_core::{ConnectionState, Message, MessageKind, Sender, Snapshot};

/// Remembers what has already been printed so each snapshot only adds lines.
#[derive(Debug, Default)]
pub struct Renderer {
    state: ConnectionState,
    peer: Option<String>,
    typing: bool,
    /// Fulfilled flag of every printed message, by log position.
    printed: Vec<bool>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, snapshot: &Snapshot) -> Vec<String> {
        let mut lines = Vec::new();
        let peer = snapshot.peer.display_name();

        if snapshot.state != self.state {
            match snapshot.state {
                ConnectionState::Connecting => lines.push("-- looking for your partner...".to_string()),
                ConnectionState::Connected => {
                    self.printed.clear();
                    self.peer = None;
                    lines.push("-- connected".to_string());
                }
                ConnectionState::Disconnected => lines.push(format!(
                    "-- {peer} is disconnected (/new to pair again, /quit to exit)"
                )),
                ConnectionState::Idle => {}
            }
            self.state = snapshot.state;
        }

        if snapshot.peer.name.is_some() && snapshot.peer.name != self.peer {
            lines.push(format!("-- chatting with {peer}"));
            self.peer = snapshot.peer.name.clone();
        }

        // A shorter log means a new session started, even if the state change was missed.
        if snapshot.messages.len() < self.printed.len() {
            self.printed.clear();
        }

        for (index, message) in snapshot.messages.iter().enumerate() {
            let fulfilled = matches!(message.kind(), MessageKind::PhotoRequest { fulfilled: true });
            match self.printed.get(index).copied() {
                None => {
                    lines.push(message_line(message, peer));
                    if fulfilled {
                        lines.push(fulfilled_line(message, peer));
                    }
                    self.printed.push(fulfilled);
                }
                Some(false) if fulfilled => {
                    lines.push(fulfilled_line(message, peer));
                    self.printed[index] = true;
                }
                Some(_) => {}
            }
        }

        if snapshot.peer_typing && !self.typing {
            lines.push(format!("-- {peer} is typing..."));
        }
        self.typing = snapshot.peer_typing;

        lines
    }
}

fn author<'a>(message: &Message, peer: &'a str) -> &'a str {
    match message.sender {
        Sender::Local => "you",
        Sender::Remote => peer,
    }
}

fn message_line(message: &Message, peer: &str) -> String {
    let who = author(message, peer);
    let text = message.text.as_deref().unwrap_or_default();
    match message.kind() {
        MessageKind::Text => format!("{who}: {text}"),
        MessageKind::InlineImage => format!("{who}: [image, {} bytes]", text.len()),
        MessageKind::PhotoRequest { .. } => {
            let id = message.id.as_deref().unwrap_or_default();
            match message.sender {
                Sender::Local => format!("you asked for a photo (request {id})"),
                Sender::Remote => {
                    format!("{peer} asked for a photo: /fulfill {id} <path>")
                }
            }
        }
    }
}

fn fulfilled_line(message: &Message, peer: &str) -> String {
    let id = message.id.as_deref().unwrap_or_default();
    let size = message.receive_image.as_deref().map(str::len).unwrap_or(0);
    match message.sender {
        Sender::Local => format!("{peer} sent a photo for request {id} [image, {size} bytes]"),
        Sender::Remote => format!("you sent a photo for request {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairchat_core::PeerIdentity;

    fn snapshot(state: ConnectionState, messages: Vec<Message>) -> Snapshot {
        Snapshot {
            state,
            peer: PeerIdentity {
                name: Some("Ana".into()),
            },
            messages,
            peer_typing: false,
        }
    }

    #[test]
    fn prints_only_new_lines() {
        let mut r = Renderer::new();
        let first = r.render(&snapshot(ConnectionState::Connected, vec![Message::local_text("hi")]));
        assert_eq!(first, vec!["-- connected", "-- chatting with Ana", "you: hi"]);

        let second = r.render(&snapshot(
            ConnectionState::Connected,
            vec![Message::local_text("hi"), Message::remote_text("hey")],
        ));
        assert_eq!(second, vec!["Ana: hey"]);
    }

    #[test]
    fn photo_request_then_fulfillment() {
        let mut r = Renderer::new();
        let mut request = Message::photo_request(Sender::Local, "X");
        let lines = r.render(&snapshot(ConnectionState::Connected, vec![request.clone()]));
        assert_eq!(lines.last().unwrap(), "you asked for a photo (request X)");

        request.receive_image = Some("data:image/png;base64,AAA".into());
        let lines = r.render(&snapshot(ConnectionState::Connected, vec![request]));
        assert_eq!(
            lines,
            vec!["Ana sent a photo for request X [image, 25 bytes]"]
        );
    }

    #[test]
    fn disconnect_and_typing_banners() {
        let mut r = Renderer::new();
        r.render(&snapshot(ConnectionState::Connected, vec![]));

        let mut typing = snapshot(ConnectionState::Connected, vec![]);
        typing.peer_typing = true;
        assert_eq!(r.render(&typing), vec!["-- Ana is typing..."]);
        assert!(r.render(&typing).is_empty());

        let lines = r.render(&snapshot(ConnectionState::Disconnected, vec![]));
        assert_eq!(
            lines,
            vec!["-- Ana is disconnected (/new to pair again, /quit to exit)"]
        );
    }

    #[test]
    fn reconnect_restarts_transcript() {
        let mut r = Renderer::new();
        r.render(&snapshot(ConnectionState::Connected, vec![Message::remote_text("old")]));
        r.render(&snapshot(ConnectionState::Connecting, vec![Message::remote_text("old")]));
        let lines = r.render(&snapshot(ConnectionState::Connected, vec![Message::remote_text("new")]));
        assert_eq!(lines, vec!["-- connected", "-- chatting with Ana", "Ana: new"]);
    }

    #[test]
    fn shorter_log_restarts_transcript_without_state_change() {
        let mut r = Renderer::new();
        r.render(&snapshot(
            ConnectionState::Connected,
            vec![Message::remote_text("old"), Message::local_text("older")],
        ));
        let lines = r.render(&snapshot(ConnectionState::Connected, vec![Message::remote_text("new")]));
        assert_eq!(lines, vec!["Ana: new"]);
    }
}
