//! Static device capabilities

use player_state::PlayMode;
use renderer_api::VolumeRange;
use renderer_parser::ServiceDescription;

/// What the renderer supports, probed once from its service descriptions
///
/// Never changes after the session is created. Per-track permissions
/// (can seek, can pause) live in [`SessionFlags`](super::SessionFlags).
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    /// `SetNextAVTransportURI` is available, so gapless pre-queue is possible
    pub set_next: bool,
    pub pause: bool,
    /// `Seek` exists and its unit variable allows `REL_TIME`
    pub seek_rel_time: bool,
    /// `GetCurrentTransportActions` is available
    pub current_transport_actions: bool,
    pub has_volume: bool,
    pub has_mute: bool,
    /// `SetPlayMode` is available
    pub play_mode: bool,
    /// Modes accepted by `CurrentPlayMode`
    pub play_modes: Vec<PlayMode>,
    pub volume_range: VolumeRange,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            set_next: false,
            pause: false,
            seek_rel_time: false,
            current_transport_actions: false,
            has_volume: false,
            has_mute: false,
            play_mode: false,
            play_modes: Vec::new(),
            volume_range: VolumeRange::default(),
        }
    }
}

impl DeviceCapabilities {
    /// Probe the AVTransport and RenderingControl service descriptions
    pub fn probe(av_transport: &ServiceDescription, rendering_control: &ServiceDescription) -> Self {
        let seek_rel_time = av_transport.service_get_action("Seek")
            && av_transport
                .service_get_state_var("A_ARG_TYPE_SeekMode")
                .is_some_and(|var| var.var_allows_value("REL_TIME"));

        let play_modes = av_transport
            .service_get_state_var("CurrentPlayMode")
            .map(|var| var.allowed_values().filter_map(PlayMode::from_upnp).collect())
            .unwrap_or_default();

        let volume_range = rendering_control
            .service_get_state_var("Volume")
            .and_then(|var| var.get_int_range())
            .map(VolumeRange::from)
            .unwrap_or_default();

        Self {
            set_next: av_transport.service_get_action("SetNextAVTransportURI"),
            pause: av_transport.service_get_action("Pause"),
            seek_rel_time,
            current_transport_actions: av_transport.service_get_action("GetCurrentTransportActions"),
            has_volume: rendering_control.service_get_action("SetVolume"),
            has_mute: rendering_control.service_get_action("SetMute"),
            play_mode: av_transport.service_get_action("SetPlayMode"),
            play_modes,
            volume_range,
        }
    }

    /// Every capability present, for devices known to be complete
    pub fn full() -> Self {
        Self {
            set_next: true,
            pause: true,
            seek_rel_time: true,
            current_transport_actions: true,
            has_volume: true,
            has_mute: true,
            play_mode: true,
            play_modes: PlayMode::ALL.to_vec(),
            volume_range: VolumeRange::default(),
        }
    }

    /// Whether `SetPlayMode` may be sent with `mode`
    pub fn supports_play_mode(&self, mode: PlayMode) -> bool {
        self.play_mode && self.play_modes.contains(&mode)
    }
}
