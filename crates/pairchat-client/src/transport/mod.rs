//! Transport seam between the session controller and the network.
//!
//! A transport opens one connection per [`Epoch`] and reports what happens
//! on it as [`TransportEvent`]s. It never reconnects or queues on its own.

pub mod websocket;

pub use websocket::WebSocketTransport;

use pairchat_core::{ChatError, ChatResult, Session};
use url::Url;

/// Identifies one connect attempt. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

/// Something that happened on the connection opened for `epoch`.
///
/// Per epoch: at most one `Opened`, any number of `Frame`s, then one `Closed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened { epoch: Epoch },
    Frame { epoch: Epoch, text: String },
    Closed { epoch: Epoch },
}

impl TransportEvent {
    pub fn epoch(&self) -> Epoch {
        match self {
            Self::Opened { epoch } | Self::Frame { epoch, .. } | Self::Closed { epoch } => *epoch,
        }
    }
}

pub trait Transport {
    /// Start connecting. Replaces any connection that is still open.
    fn open(&mut self, url: &Url, epoch: Epoch);

    /// Send a text frame. Silently dropped when nothing is open.
    fn send(&mut self, frame: String);

    /// Tear down the current connection, if any.
    fn close(&mut self);
}

/// Build the pairing endpoint for `session` on top of `server_url`.
pub fn pairing_url(server_url: &str, session: &Session) -> ChatResult<Url> {
    let mut url = Url::parse(server_url)
        .map_err(|e| ChatError::InvalidUrl(format!("{server_url}: {e}")))?;
    match url.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(ChatError::InvalidUrl(format!(
                "unsupported scheme {other} (expected ws:// or wss://)"
            )))
        }
    }
    url.query_pairs_mut()
        .append_pair("secretCode", &session.secret_code)
        .append_pair("fullName", &session.display_name)
        .append_pair("gender", &session.gender);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_session_params() {
        let session = Session::new("ABC123DEF456XYZ", "Sam Lee", "Male");
        let url = pairing_url("wss://pair.example.com/chat", &session).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://pair.example.com/chat?secretCode=ABC123DEF456XYZ&fullName=Sam+Lee&gender=Male"
        );
    }

    #[test]
    fn url_keeps_existing_query() {
        let session = Session::new("C", "N", "G");
        let url = pairing_url("ws://localhost:9000/ws?v=2", &session).unwrap();
        assert_eq!(url.query(), Some("v=2&secretCode=C&fullName=N&gender=G"));
    }

    #[test]
    fn url_rejects_other_schemes() {
        let session = Session::new("C", "N", "G");
        assert!(pairing_url("https://example.com", &session).is_err());
        assert!(pairing_url("not a url", &session).is_err());
    }

    #[test]
    fn epochs_increase() {
        let first = Epoch::default();
        assert!(first.next() > first);
        assert_eq!(first.next().next(), Epoch(2));
    }
}
