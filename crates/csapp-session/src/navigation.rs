//! Navigation sink.

use std::fmt;

use parking_lot::Mutex;

/// Where the session sends the user after login, logout or expiry.
///
/// `replace` swaps the current location without adding a history entry.
pub trait Navigator: Send + Sync + fmt::Debug {
    fn replace(&self, path: &str);
}

/// Navigator that records targets for the host to act on.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent target.
    pub fn last(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }

    /// Every target so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    /// Remove and return the most recent target.
    pub fn take_last(&self) -> Option<String> {
        let mut history = self.history.lock();
        let last = history.pop();
        history.clear();
        last
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        tracing::debug!(path, "Navigate");
        self.history.lock().push(path.to_string());
    }
}
