//! AVTransport actions

use renderer_parser::time::parse_upnp_time;
use std::time::Duration;

crate::define_action! {
    action: GetCurrentTransportActions,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {
        actions: String => "Actions",
    },
}

crate::define_action! {
    action: GetDeviceCapabilities,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {
        play_media: String => "PlayMedia",
        rec_media: String => "RecMedia",
        rec_quality_modes: String => "RecQualityModes",
    },
}

crate::define_action! {
    action: GetMediaInfo,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {
        nr_tracks: u32 => "NrTracks",
        media_duration: String => "MediaDuration",
        current_uri: String => "CurrentURI",
        current_uri_metadata: String => "CurrentURIMetaData",
        next_uri: String => "NextURI",
        next_uri_metadata: String => "NextURIMetaData",
        play_medium: String => "PlayMedium",
        record_medium: String => "RecordMedium",
        write_status: String => "WriteStatus",
    },
}

crate::define_action! {
    action: GetPositionInfo,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {
        track: u32 => "Track",
        track_duration: String => "TrackDuration",
        track_metadata: String => "TrackMetaData",
        track_uri: String => "TrackURI",
        rel_time: String => "RelTime",
        abs_time: String => "AbsTime",
        rel_count: i32 => "RelCount",
        abs_count: i32 => "AbsCount",
    },
}

crate::define_action! {
    action: GetTransportInfo,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {
        current_transport_state: String => "CurrentTransportState",
        current_transport_status: String => "CurrentTransportStatus",
        current_speed: String => "CurrentSpeed",
    },
}

crate::define_action! {
    action: GetTransportSettings,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {
        play_mode: String => "PlayMode",
        rec_quality_mode: String => "RecQualityMode",
    },
}

crate::define_action! {
    action: Next,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {},
}

crate::define_action! {
    action: Pause,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {},
}

crate::define_action! {
    action: Play,
    service: AVTransport,
    instance_id: "0",
    request: {
        speed: String => "Speed",
    },
    response: {},
}

crate::define_action! {
    action: Previous,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {},
}

crate::define_action! {
    action: Seek,
    service: AVTransport,
    instance_id: "0",
    request: {
        unit: String => "Unit",
        target: String => "Target",
    },
    response: {},
}

crate::define_action! {
    action: SetAVTransportURI,
    service: AVTransport,
    instance_id: "0",
    request: {
        current_uri: String => "CurrentURI",
        current_uri_metadata: String => "CurrentURIMetaData",
    },
    response: {},
}

crate::define_action! {
    action: SetNextAVTransportURI,
    service: AVTransport,
    instance_id: "0",
    request: {
        next_uri: String => "NextURI",
        next_uri_metadata: String => "NextURIMetaData",
    },
    response: {},
}

crate::define_action! {
    action: SetPlayMode,
    service: AVTransport,
    instance_id: "0",
    request: {
        new_play_mode: String => "NewPlayMode",
    },
    response: {},
}

crate::define_action! {
    action: Stop,
    service: AVTransport,
    instance_id: "0",
    request: {},
    response: {},
}

impl PlayRequest {
    /// Play at normal speed
    pub fn normal() -> Self {
        Self {
            speed: "1".to_string(),
        }
    }
}

impl SeekRequest {
    /// Seek to a position relative to the start of the current track
    pub fn rel_time(position: Duration) -> Self {
        Self {
            unit: "REL_TIME".to_string(),
            target: renderer_parser::format_upnp_time(position),
        }
    }
}

impl GetPositionInfoResponse {
    pub fn duration(&self) -> Option<Duration> {
        parse_upnp_time(&self.track_duration)
    }

    pub fn position(&self) -> Option<Duration> {
        parse_upnp_time(&self.rel_time)
    }

    /// Track URI, or `None` when the device reports nothing playable
    pub fn uri(&self) -> Option<&str> {
        non_empty(&self.track_uri)
    }

    pub fn metadata(&self) -> Option<&str> {
        non_empty(&self.track_metadata)
    }
}

impl GetMediaInfoResponse {
    pub fn current_uri(&self) -> Option<&str> {
        non_empty(&self.current_uri)
    }

    pub fn current_uri_metadata(&self) -> Option<&str> {
        non_empty(&self.current_uri_metadata)
    }

    pub fn next_uri(&self) -> Option<&str> {
        non_empty(&self.next_uri)
    }

    pub fn next_uri_metadata(&self) -> Option<&str> {
        non_empty(&self.next_uri_metadata)
    }
}

/// Devices use an empty string or `NOT_IMPLEMENTED` for "no value"
fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && value != "NOT_IMPLEMENTED").then_some(value)
}
