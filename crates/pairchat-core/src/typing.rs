//! Peer typing presence with automatic expiry.
//!
//! The tracker never sleeps on its own. It owns a single [`DeferredClear`]
//! deadline; the event loop waits on [`TypingTracker::deadline`] and calls
//! [`TypingTracker::expire`] when it passes.

use std::time::Duration;

use tokio::time::Instant;

/// Silence window after the last `isTyping: true` before the indicator clears.
pub const DEFAULT_TYPING_EXPIRY: Duration = Duration::from_millis(3000);

/// A single cancellable deferred call, represented by its due time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeferredClear {
    due: Option<Instant>,
}

impl DeferredClear {
    /// Schedule (or reschedule) the call `duration` after `now`.
    pub fn arm(&mut self, now: Instant, duration: Duration) {
        self.due = Some(now + duration);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.due
    }

    /// Consume the call if it is due at `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypingTracker {
    typing: bool,
    timer: DeferredClear,
    window: Duration,
}

impl Default for TypingTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_EXPIRY)
    }
}

impl TypingTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            typing: false,
            timer: DeferredClear::default(),
            window,
        }
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// When the pending expiry fires, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Apply an inbound typing event. Returns whether the typing flag changed.
    pub fn on_typing_event(&mut self, is_typing: bool, now: Instant) -> bool {
        let changed = self.typing != is_typing;
        self.typing = is_typing;
        if is_typing {
            self.timer.arm(now, self.window);
        } else {
            self.timer.cancel();
        }
        changed
    }

    /// Clear the flag if the expiry is due. Returns whether it cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.timer.fire(now) && self.typing {
            self.typing = false;
            return true;
        }
        false
    }

    /// Drop the flag and any pending expiry.
    pub fn clear(&mut self) {
        self.typing = false;
        self.timer.cancel();
    }
}
