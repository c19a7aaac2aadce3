//! One bound remote renderer
//!
//! A `RendererSession` owns everything about a single device: its service
//! endpoints, probed capabilities, event listeners, the raw UPnP variables
//! it has seen and the player state it publishes. The reconciliation logic
//! lives in the `reconciler` module.

use callback_server::NotificationPayload;
use player_state::{PlayerState, StateSink};
use renderer_api::{HttpTransport, RendererClient, Service, ServiceEndpoints, SoapClient};
use renderer_parser::{DeviceDescription, ServiceDescription};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::listener::{EventListener, ListenerTiming};
use crate::message::{CommandSender, SessionMessage};
use crate::model::{DeviceCapabilities, SessionFlags, UpnpState};
use crate::scheduler::{Backend, CallbackEndpoint};
use crate::tracklist::Tracklist;

/// A session with one remote renderer
pub struct RendererSession {
    pub(crate) name: String,
    pub(crate) config: BackendConfig,
    pub(crate) client: RendererClient,
    pub(crate) endpoints: ServiceEndpoints,
    pub(crate) capabilities: DeviceCapabilities,
    pub(crate) flags: SessionFlags,
    pub(crate) upnp_state: UpnpState,
    pub(crate) player: PlayerState,
    pub(crate) tracklist: Tracklist,
    pub(crate) listeners: Vec<EventListener>,
    pub(crate) queue_tx: mpsc::Sender<SessionMessage>,
    pub(crate) queue_rx: mpsc::Receiver<SessionMessage>,
    /// URI this session last pushed with SetAVTransportURI
    pub(crate) av_transport_uri: Option<String>,
    /// URI this session last pushed with SetNextAVTransportURI
    pub(crate) next_av_transport_uri: Option<String>,
    /// Next URI and metadata as reported by the device
    pub(crate) next_uri_dev: Option<String>,
    pub(crate) next_uri_metadata_dev: Option<String>,
    /// Track URI and metadata from the last poll or event
    pub(crate) track_uri: Option<String>,
    pub(crate) track_metadata: Option<String>,
    /// Duration reported by the device for the current track
    pub(crate) duration: Option<Duration>,
    pub(crate) position: Duration,
    pub(crate) last_poll: Option<Instant>,
    closed: bool,
}

impl RendererSession {
    /// Bind to the renderer whose device description lives at `location`
    ///
    /// Fetches the description and the AVTransport and RenderingControl
    /// service descriptions, probes capabilities and subscribes to events.
    /// Fails when the device is unreachable, is not a MediaRenderer or
    /// lacks one of the three mandatory services.
    pub fn connect(
        location: &str,
        callback: &CallbackEndpoint,
        config: BackendConfig,
        sink: Box<dyn StateSink>,
    ) -> Result<Self> {
        config.validate()?;

        let soap = SoapClient::with_timeouts(config.soap_connect_timeout, config.soap_read_timeout);
        let fetch = |url: &str| {
            soap.get_document(url)
                .map_err(|e| BackendError::Description(format!("{}: {}", url, e)))
        };

        let description = DeviceDescription::parse(&fetch(location)?, location)?;
        let device = description
            .find_device("MediaRenderer")
            .ok_or_else(|| BackendError::Description(format!("no MediaRenderer at {}", location)))?;
        let endpoints = ServiceEndpoints::from_device(device)?;

        let av_transport = ServiceDescription::parse(&fetch(&endpoints.av_transport.scpd_url)?)?;
        let rendering_control = ServiceDescription::parse(&fetch(&endpoints.rendering_control.scpd_url)?)?;
        let capabilities = DeviceCapabilities::probe(&av_transport, &rendering_control);

        info!(
            renderer = %device.friendly_name,
            udn = %device.udn,
            set_next = capabilities.set_next,
            seek = capabilities.seek_rel_time,
            "renderer bound"
        );

        let client = RendererClient::new(Box::new(HttpTransport::new(soap.clone(), endpoints.clone())));
        let mut session = Self::from_parts(
            device.friendly_name.clone(),
            client,
            endpoints,
            capabilities,
            config,
            sink,
        );
        session.attach_listeners(callback, soap);
        Ok(session)
    }

    /// Build a session from already discovered parts, without event listeners
    pub fn from_parts(
        name: impl Into<String>,
        client: RendererClient,
        endpoints: ServiceEndpoints,
        capabilities: DeviceCapabilities,
        config: BackendConfig,
        sink: Box<dyn StateSink>,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel();
        let flags = SessionFlags {
            can_seek: capabilities.seek_rel_time,
            can_pause: capabilities.pause,
            ..SessionFlags::default()
        };

        Self {
            name: name.into(),
            config,
            client,
            endpoints,
            capabilities,
            flags,
            upnp_state: UpnpState::new(),
            player: PlayerState::new(sink),
            tracklist: Tracklist::new(),
            listeners: Vec::new(),
            queue_tx,
            queue_rx,
            av_transport_uri: None,
            next_av_transport_uri: None,
            next_uri_dev: None,
            next_uri_metadata_dev: None,
            track_uri: None,
            track_metadata: None,
            duration: None,
            position: Duration::ZERO,
            last_poll: None,
            closed: false,
        }
    }

    pub fn with_tracklist(mut self, tracklist: Tracklist) -> Self {
        self.tracklist = tracklist;
        self
    }

    /// Subscribe to AVTransport and RenderingControl events
    pub fn attach_listeners(&mut self, callback: &CallbackEndpoint, soap: SoapClient) {
        let timing = ListenerTiming {
            timeout_seconds: self.config.subscription_timeout_secs(),
            renewal_threshold: self.config.renewal_threshold,
            resubscribe_delay: self.config.resubscribe_delay,
        };
        let now = Instant::now();

        for service in [Service::AVTransport, Service::RenderingControl] {
            let endpoint = self.endpoints.get(service);
            let mut listener = EventListener::create(
                &endpoint.event_sub_url,
                &callback.base_url,
                service,
                self.queue_tx.clone(),
                soap.clone(),
                callback.router.clone(),
                timing,
            );
            listener.ping(now);
            self.listeners.push(listener);
        }
    }

    /// Handle for posting commands from the application
    pub fn command_sender(&self) -> CommandSender {
        CommandSender::new(self.queue_tx.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn tracklist(&self) -> &Tracklist {
        &self.tracklist
    }

    pub fn flags(&self) -> &SessionFlags {
        &self.flags
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    pub fn upnp_state(&self) -> &UpnpState {
        &self.upnp_state
    }

    pub fn av_transport_uri(&self) -> Option<&str> {
        self.av_transport_uri.as_deref()
    }

    pub fn next_av_transport_uri(&self) -> Option<&str> {
        self.next_av_transport_uri.as_deref()
    }

    pub fn track_uri(&self) -> Option<&str> {
        self.track_uri.as_deref()
    }

    /// Process every queued message, returning whether there were any
    pub fn process_queue(&mut self) -> bool {
        let mut handled = 0usize;
        while let Ok(message) = self.queue_rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled > 0
    }

    /// Unsubscribe and release callback paths; safe to call repeatedly
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for listener in &mut self.listeners {
            listener.close();
        }
        self.listeners.clear();
        debug!(renderer = %self.name, "session closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Backend for RendererSession {
    fn name(&self) -> &str {
        &self.name
    }

    /// Keep listeners alive, drain the queue, then poll if due
    fn on_tick(&mut self, now: Instant) -> bool {
        if self.closed {
            return false;
        }

        let mut work = false;
        for listener in &mut self.listeners {
            work |= listener.ping(now);
        }
        work |= self.process_queue();
        work |= self.poll(now);
        work
    }

    fn on_event(&mut self, message: SessionMessage) {
        self.handle_message(message);
    }

    fn on_http(&mut self, notification: &NotificationPayload) -> bool {
        self.listeners.iter().any(|listener| listener.handle(notification))
    }
}

impl Drop for RendererSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for RendererSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererSession")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("av_transport_uri", &self.av_transport_uri)
            .field("next_av_transport_uri", &self.next_av_transport_uri)
            .field("track_uri", &self.track_uri)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
