//! Player status and play mode enums
//!
//! Both map to and from the strings UPnP renderers use for
//! `TransportState` and `CurrentPlayMode`, so the rest of the application
//! never sees those names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StateError;

/// Playback status as observed by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// No media loaded yet
    #[default]
    Init,
    Stopped,
    Playing,
    Paused,
    Seeking,
    /// Switching between tracks
    Changing,
    Error,
}

impl PlayerStatus {
    /// Map a UPnP `TransportState` value.
    ///
    /// `NO_MEDIA_PRESENT` maps to [`PlayerStatus::Init`]; unknown values
    /// return `None`.
    pub fn from_transport_state(state: &str) -> Option<Self> {
        match state.trim() {
            "STOPPED" => Some(Self::Stopped),
            "PLAYING" => Some(Self::Playing),
            "PAUSED_PLAYBACK" | "PAUSED_RECORDING" => Some(Self::Paused),
            "TRANSITIONING" => Some(Self::Changing),
            "NO_MEDIA_PRESENT" => Some(Self::Init),
            _ => None,
        }
    }

    /// Whether the renderer is actively moving through a track.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Seeking | Self::Changing)
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Seeking => "seeking",
            Self::Changing => "changing",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Tracklist play mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayMode {
    #[default]
    Normal,
    RepeatAll,
    RepeatOne,
    Shuffle,
}

impl PlayMode {
    pub const ALL: [PlayMode; 4] = [Self::Normal, Self::RepeatAll, Self::RepeatOne, Self::Shuffle];

    /// The `CurrentPlayMode` string for this mode.
    pub fn as_upnp(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::RepeatAll => "REPEAT_ALL",
            Self::RepeatOne => "REPEAT_ONE",
            Self::Shuffle => "SHUFFLE",
        }
    }

    /// Parse a `CurrentPlayMode` string.
    pub fn from_upnp(mode: &str) -> Option<Self> {
        match mode.trim() {
            "NORMAL" => Some(Self::Normal),
            "REPEAT_ALL" => Some(Self::RepeatAll),
            "REPEAT_ONE" => Some(Self::RepeatOne),
            "SHUFFLE" | "SHUFFLE_NOREPEAT" => Some(Self::Shuffle),
            _ => None,
        }
    }
}

impl FromStr for PlayerStatus {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_transport_state(s).ok_or_else(|| StateError::UnknownTransportState(s.to_string()))
    }
}

impl FromStr for PlayMode {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_upnp(s).ok_or_else(|| StateError::UnknownPlayMode(s.to_string()))
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_upnp())
    }
}
