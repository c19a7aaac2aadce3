//! State change broadcasts
//!
//! Every value the player state publishes travels as a `StateChange`
//! tagged with the `"player"` context and the variable that changed.

use renderer_parser::Track;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::status::{PlayMode, PlayerStatus};

/// Context every player broadcast is published under
pub const PLAYER_CONTEXT: &str = "player";

/// The variables of the player-state schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerVariable {
    Status,
    CurrentTrack,
    CurrentTime,
    Volume,
    Mute,
    Mode,
}

impl PlayerVariable {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::CurrentTrack => "track",
            Self::CurrentTime => "time",
            Self::Volume => "volume",
            Self::Mute => "mute",
            Self::Mode => "mode",
        }
    }
}

/// Playback position with the values derived from the tracklist
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentTime {
    /// Position within the current track
    pub time: Duration,
    /// Position within the whole tracklist
    pub absolute: Option<Duration>,
    /// Time left in the current track, `None` when the duration is unknown
    pub remaining: Option<Duration>,
    /// Time left in the whole tracklist
    pub remaining_absolute: Option<Duration>,
    /// Progress through the current track in `0.0..=1.0`
    pub percentage: Option<f32>,
}

impl CurrentTime {
    pub fn at(time: Duration) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }
}

/// A published value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateValue {
    Status(PlayerStatus),
    Track(Option<Box<Track>>),
    Time(CurrentTime),
    /// Volume in `0.0..=1.0`
    Volume(f32),
    Mute(bool),
    Mode(PlayMode),
}

/// A change broadcast on the message bus
#[derive(Debug, Clone)]
pub struct StateChange {
    pub context: &'static str,
    pub variable: PlayerVariable,
    pub value: StateValue,
    /// When the change was detected
    pub timestamp: Instant,
}

impl StateChange {
    pub fn new(variable: PlayerVariable, value: StateValue) -> Self {
        Self {
            context: PLAYER_CONTEXT,
            variable,
            value,
            timestamp: Instant::now(),
        }
    }
}

impl PartialEq for StateChange {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.context == other.context && self.variable == other.variable && self.value == other.value
    }
}
