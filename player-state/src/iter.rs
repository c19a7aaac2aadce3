//! Receiving end of a [`ChannelSink`](crate::ChannelSink)
//!
//! Provides the usual consumption patterns:
//! - Blocking: `recv()`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`

use std::sync::mpsc;
use std::time::Duration;

use crate::event::StateChange;

/// Stream of player state changes
///
/// All methods are synchronous.
///
/// # Example
///
/// ```rust,ignore
/// let (sink, changes) = ChannelSink::new();
/// let mut state = PlayerState::new(Box::new(sink));
/// state.set_mute(true);
///
/// for change in changes.try_iter() {
///     println!("{} changed", change.variable.key());
/// }
/// ```
#[derive(Debug)]
pub struct ChangeReceiver {
    rx: mpsc::Receiver<StateChange>,
}

impl ChangeReceiver {
    pub(crate) fn new(rx: mpsc::Receiver<StateChange>) -> Self {
        Self { rx }
    }

    /// Block until the next change is available
    ///
    /// Returns `None` once every sender is gone.
    pub fn recv(&self) -> Option<StateChange> {
        self.rx.recv().ok()
    }

    /// Block until the next change or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StateChange> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Try to receive a change without blocking
    pub fn try_recv(&self) -> Option<StateChange> {
        self.rx.try_recv().ok()
    }

    /// Iterate over the changes queued right now, without blocking
    pub fn try_iter(&self) -> impl Iterator<Item = StateChange> + '_ {
        self.rx.try_iter()
    }
}
