//! Messages processed by a renderer session
//!
//! Device events and application commands share one queue, so the
//! reconciler handles them strictly one at a time.

use player_state::PlayMode;
use renderer_api::Service;
use renderer_parser::Track;
use std::sync::mpsc;
use std::time::Duration;
use tracing::trace;

/// Playback commands from the application
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Stop,
    /// Toggle between paused and playing
    Pause,
    Seek(Duration),
    Next,
    Prev,
    /// Volume in `0.0..=1.0`
    SetVolume(f32),
    SetMute(bool),
    SetMode(PlayMode),
    /// Make the track at this index current
    SetTrack(usize),
    /// Replace `delete_count` tracks at `idx` with `items`
    Splice {
        idx: usize,
        delete_count: usize,
        items: Vec<Track>,
        source_client_id: Option<String>,
    },
}

/// One unit of work for the reconciler
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMessage {
    Command(Command),
    /// A variable reported by a device event
    Event {
        service: Service,
        variable: String,
        value: String,
        channel: Option<String>,
    },
}

impl SessionMessage {
    pub fn event(service: Service, variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Event {
            service,
            variable: variable.into(),
            value: value.into(),
            channel: None,
        }
    }
}

impl From<Command> for SessionMessage {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

/// Cloneable handle for posting commands to a session
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<SessionMessage>,
}

impl CommandSender {
    pub(crate) fn new(tx: mpsc::Sender<SessionMessage>) -> Self {
        Self { tx }
    }

    /// Queue a command; returns `false` once the session is gone
    pub fn send(&self, command: Command) -> bool {
        trace!(?command, "queue command");
        self.tx.send(SessionMessage::Command(command)).is_ok()
    }
}
