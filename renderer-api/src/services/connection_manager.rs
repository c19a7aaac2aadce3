//! ConnectionManager actions
//!
//! These actions carry no `InstanceID`.

crate::define_action! {
    action: GetCurrentConnectionIDs,
    service: ConnectionManager,
    request: {},
    response: {
        connection_ids: String => "ConnectionIDs",
    },
}

crate::define_action! {
    action: GetCurrentConnectionInfo,
    service: ConnectionManager,
    request: {
        connection_id: i32 => "ConnectionID",
    },
    response: {
        rcs_id: i32 => "RcsID",
        av_transport_id: i32 => "AVTransportID",
        protocol_info: String => "ProtocolInfo",
        peer_connection_manager: String => "PeerConnectionManager",
        peer_connection_id: i32 => "PeerConnectionID",
        direction: String => "Direction",
        status: String => "Status",
    },
}

crate::define_action! {
    action: GetProtocolInfo,
    service: ConnectionManager,
    request: {},
    response: {
        source: String => "Source",
        sink: String => "Sink",
    },
}

impl GetProtocolInfoResponse {
    /// MIME types the renderer accepts, from the `Sink` protocol list
    pub fn sink_mime_types(&self) -> Vec<&str> {
        self.sink
            .split(',')
            .filter_map(|info| info.trim().split(':').nth(2))
            .filter(|mime| !mime.is_empty() && *mime != "*")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::UpnpAction;

    #[test]
    fn test_connection_info_arguments_have_no_instance_id() {
        let args = GetCurrentConnectionInfo::arguments(&GetCurrentConnectionInfoRequest {
            connection_id: 0,
        });
        let pairs: Vec<(&str, &str)> = args.iter().collect();
        assert_eq!(pairs, vec![("ConnectionID", "0")]);
    }

    #[test]
    fn test_sink_mime_types() {
        let info = GetProtocolInfoResponse {
            source: String::new(),
            sink: "http-get:*:audio/flac:*,http-get:*:audio/mpeg:DLNA.ORG_PN=MP3, http-get:*:*:*".to_string(),
        };
        assert_eq!(info.sink_mime_types(), vec!["audio/flac", "audio/mpeg"]);
    }
}
