/// The UPnP AV services a media renderer exposes
///
/// A renderer session requires all three; each one is addressed through the
/// control and event URLs found in the device description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// AVTransport service - Controls playback (play, pause, stop, seek, etc.)
    AVTransport,

    /// RenderingControl service - Controls audio rendering (volume, mute, etc.)
    RenderingControl,

    /// ConnectionManager service - Protocol and connection negotiation
    ConnectionManager,
}

impl Service {
    pub const ALL: [Service; 3] = [
        Service::AVTransport,
        Service::RenderingControl,
        Service::ConnectionManager,
    ];

    /// Get the name of this service as a string
    pub fn name(&self) -> &'static str {
        match self {
            Service::AVTransport => "AVTransport",
            Service::RenderingControl => "RenderingControl",
            Service::ConnectionManager => "ConnectionManager",
        }
    }

    /// Unversioned service type, e.g. `urn:schemas-upnp-org:service:AVTransport`
    pub fn service_type(&self) -> &'static str {
        match self {
            Service::AVTransport => "urn:schemas-upnp-org:service:AVTransport",
            Service::RenderingControl => "urn:schemas-upnp-org:service:RenderingControl",
            Service::ConnectionManager => "urn:schemas-upnp-org:service:ConnectionManager",
        }
    }

    /// Versioned service URN used in SOAP requests
    pub fn urn(&self, version: u32) -> String {
        format!("{}:{}", self.service_type(), version)
    }

    /// Short tag that namespaces this service's variables in events and state
    pub fn namespace_tag(&self) -> &'static str {
        match self {
            Service::AVTransport => "avt",
            Service::RenderingControl => "rc",
            Service::ConnectionManager => "cm",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Service> {
        Service::ALL.into_iter().find(|s| s.namespace_tag() == tag)
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urn() {
        assert_eq!(
            Service::RenderingControl.urn(2),
            "urn:schemas-upnp-org:service:RenderingControl:2"
        );
    }

    #[test]
    fn test_tags_round_trip() {
        for service in Service::ALL {
            assert_eq!(Service::from_tag(service.namespace_tag()), Some(service));
        }
        assert_eq!(Service::from_tag("zgt"), None);
    }
}
