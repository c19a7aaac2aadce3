//! Dynamic session flags

/// Mutable per-session state owned by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionFlags {
    /// The device is playing a URI this session pushed
    pub our_playback: bool,
    /// `SetNextAVTransportURI` was sent for the upcoming track
    pub next_queued: bool,
    /// A Stop was issued and its STOPPED transition is still expected
    pub stop_sent: bool,
    /// Less than the finishing threshold of the track remains
    pub finishing: bool,
    /// Track metadata must be fetched from the device on the next poll
    pub needs_metadata: bool,
    /// Transport, media, volume and mute state must be fetched once
    pub needs_initial_state: bool,
    /// Seeking is allowed for the current track
    pub can_seek: bool,
    /// Pausing is allowed for the current track
    pub can_pause: bool,
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self {
            our_playback: false,
            next_queued: false,
            stop_sent: false,
            finishing: false,
            needs_metadata: false,
            needs_initial_state: true,
            can_seek: false,
            can_pause: false,
        }
    }
}
