//! RenderingControl actions

crate::define_action! {
    action: GetMute,
    service: RenderingControl,
    instance_id: "0",
    request: {
        channel: String => "Channel",
    },
    response: {
        current_mute: bool => "CurrentMute",
    },
}

crate::define_action! {
    action: GetVolume,
    service: RenderingControl,
    instance_id: "0",
    request: {
        channel: String => "Channel",
    },
    response: {
        current_volume: i32 => "CurrentVolume",
    },
}

crate::define_action! {
    /// Volume in 1/256 dB units
    action: GetVolumeDB,
    service: RenderingControl,
    instance_id: "0",
    request: {
        channel: String => "Channel",
    },
    response: {
        current_volume: i32 => "CurrentVolume",
    },
}

crate::define_action! {
    action: ListPresets,
    service: RenderingControl,
    instance_id: "0",
    request: {},
    response: {
        current_preset_name_list: String => "CurrentPresetNameList",
    },
}

crate::define_action! {
    action: SelectPreset,
    service: RenderingControl,
    instance_id: "0",
    request: {
        preset_name: String => "PresetName",
    },
    response: {},
}

crate::define_action! {
    action: SetMute,
    service: RenderingControl,
    instance_id: "0",
    request: {
        channel: String => "Channel",
        desired_mute: bool => "DesiredMute",
    },
    response: {},
}

crate::define_action! {
    action: SetVolume,
    service: RenderingControl,
    instance_id: "0",
    request: {
        channel: String => "Channel",
        desired_volume: i32 => "DesiredVolume",
    },
    response: {},
}

crate::define_action! {
    action: SetVolumeDB,
    service: RenderingControl,
    instance_id: "0",
    request: {
        channel: String => "Channel",
        desired_volume: i32 => "DesiredVolume",
    },
    response: {},
}

/// The channel all renderer volume and mute handling uses
pub const MASTER: &str = "Master";

impl GetMuteRequest {
    pub fn master() -> Self {
        Self {
            channel: MASTER.to_string(),
        }
    }
}

impl GetVolumeRequest {
    pub fn master() -> Self {
        Self {
            channel: MASTER.to_string(),
        }
    }
}

impl SetMuteRequest {
    pub fn master(desired_mute: bool) -> Self {
        Self {
            channel: MASTER.to_string(),
            desired_mute,
        }
    }
}

impl SetVolumeRequest {
    pub fn master(desired_volume: i32) -> Self {
        Self {
            channel: MASTER.to_string(),
            desired_volume,
        }
    }
}

impl ListPresetsResponse {
    pub fn presets(&self) -> impl Iterator<Item = &str> {
        self.current_preset_name_list
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}
