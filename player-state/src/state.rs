//! The application-facing player state
//!
//! `PlayerState` mirrors the player-state schema (status, current track,
//! current time, volume, mute, mode). Each setter compares against the
//! stored value and only broadcasts when the value actually changed.

use renderer_parser::Track;
use std::fmt;
use tracing::debug;

use crate::event::{CurrentTime, PlayerVariable, StateChange, StateValue};
use crate::sink::StateSink;
use crate::status::{PlayMode, PlayerStatus};

/// Change-detecting player state bound to a sink
///
/// # Example
///
/// ```rust
/// use player_state::{ChannelSink, PlayerState, PlayerStatus};
///
/// let (sink, changes) = ChannelSink::new();
/// let mut state = PlayerState::new(Box::new(sink));
///
/// // First set returns true (value changed)
/// assert!(state.set_status(PlayerStatus::Playing));
/// // Same value returns false and publishes nothing
/// assert!(!state.set_status(PlayerStatus::Playing));
///
/// assert_eq!(changes.try_iter().count(), 1);
/// ```
pub struct PlayerState {
    status: PlayerStatus,
    current_track: Option<Track>,
    time: CurrentTime,
    volume: f32,
    mute: bool,
    mode: PlayMode,
    sink: Box<dyn StateSink>,
}

impl PlayerState {
    pub fn new(sink: Box<dyn StateSink>) -> Self {
        Self {
            status: PlayerStatus::Init,
            current_track: None,
            time: CurrentTime::default(),
            volume: 0.0,
            mute: false,
            mode: PlayMode::Normal,
            sink,
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn time(&self) -> CurrentTime {
        self.time
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn mute(&self) -> bool {
        self.mute
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Set the playback status, returning whether it changed
    pub fn set_status(&mut self, status: PlayerStatus) -> bool {
        if self.status == status {
            return false;
        }
        debug!(from = %self.status, to = %status, "player status");
        self.status = status;
        self.publish(PlayerVariable::Status, StateValue::Status(status));
        true
    }

    /// Set the current track, returning whether it changed
    pub fn set_current_track(&mut self, track: Option<Track>) -> bool {
        if self.current_track == track {
            return false;
        }
        self.current_track = track;
        let value = StateValue::Track(self.current_track.clone().map(Box::new));
        self.publish(PlayerVariable::CurrentTrack, value);
        true
    }

    /// Set the playback position, returning whether it changed
    pub fn set_time(&mut self, time: CurrentTime) -> bool {
        if self.time == time {
            return false;
        }
        self.time = time;
        self.publish(PlayerVariable::CurrentTime, StateValue::Time(time));
        true
    }

    /// Set the volume (clamped to `0.0..=1.0`), returning whether it changed
    pub fn set_volume(&mut self, volume: f32) -> bool {
        let volume = volume.clamp(0.0, 1.0);
        if (self.volume - volume).abs() <= f32::EPSILON {
            return false;
        }
        self.volume = volume;
        self.publish(PlayerVariable::Volume, StateValue::Volume(volume));
        true
    }

    pub fn set_mute(&mut self, mute: bool) -> bool {
        if self.mute == mute {
            return false;
        }
        self.mute = mute;
        self.publish(PlayerVariable::Mute, StateValue::Mute(mute));
        true
    }

    pub fn set_mode(&mut self, mode: PlayMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.publish(PlayerVariable::Mode, StateValue::Mode(mode));
        true
    }

    fn publish(&mut self, variable: PlayerVariable, value: StateValue) {
        self.sink.publish(StateChange::new(variable, value));
    }
}

impl fmt::Debug for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerState")
            .field("status", &self.status)
            .field("current_track", &self.current_track.as_ref().map(|t| &t.metadata.title))
            .field("time", &self.time)
            .field("volume", &self.volume)
            .field("mute", &self.mute)
            .field("mode", &self.mode)
            .finish()
    }
}
