//! Message sink collaborators
//!
//! The player state does not know who listens. It hands every change to a
//! [`StateSink`]; the application decides where changes go.

use std::sync::mpsc;
use tracing::trace;

use crate::event::StateChange;
use crate::iter::ChangeReceiver;

/// Destination for player state broadcasts
pub trait StateSink: Send {
    fn publish(&mut self, change: StateChange);
}

/// Forwards changes into a std channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<StateChange>,
}

impl ChannelSink {
    /// Create a sink together with the receiver that drains it.
    pub fn new() -> (Self, ChangeReceiver) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, ChangeReceiver::new(rx))
    }
}

impl StateSink for ChannelSink {
    fn publish(&mut self, change: StateChange) {
        if self.tx.send(change).is_err() {
            trace!("state change receiver dropped");
        }
    }
}

/// Discards every change
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StateSink for NullSink {
    fn publish(&mut self, _change: StateChange) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{PlayerVariable, StateValue};

    #[test]
    fn test_channel_sink_delivers() {
        let (mut sink, changes) = ChannelSink::new();
        sink.publish(StateChange::new(PlayerVariable::Mute, StateValue::Mute(true)));

        let change = changes.try_recv().unwrap();
        assert_eq!(change.value, StateValue::Mute(true));
        assert!(changes.try_recv().is_none());
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (mut sink, changes) = ChannelSink::new();
        drop(changes);
        sink.publish(StateChange::new(PlayerVariable::Mute, StateValue::Mute(false)));
    }
}
