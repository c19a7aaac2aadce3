//! Shared fixtures for reconciler tests

#![allow(dead_code)]

use player_state::{ChangeReceiver, ChannelSink, PlayerVariable, StateChange};
use renderer_api::{ApiError, ArgList, ControlTransport, RendererClient, Service, ServiceEndpoints};
use renderer_backend::{BackendConfig, DeviceCapabilities, RendererSession, Tracklist};
use renderer_parser::{ServiceEndpoint, Source, Track};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const A: &str = "http://media.local/a.flac";
pub const B: &str = "http://media.local/b.flac";
pub const X: &str = "http://elsewhere.local/x.mp3";
pub const Y: &str = "http://elsewhere.local/y.mp3";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub service: Service,
    pub action: String,
    pub args: ArgList,
}

#[derive(Default)]
struct Inner {
    calls: Vec<RecordedCall>,
    responses: HashMap<String, ArgList>,
    failures: HashSet<String>,
}

/// A `ControlTransport` that records every call and answers from a table
///
/// Clones share the same record, so a test keeps one handle while the
/// session owns another. Actions without a configured response answer with
/// no out-arguments.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every later `action` call with `out`
    pub fn respond(&self, action: &str, out: ArgList) {
        self.inner.lock().unwrap().responses.insert(action.to_string(), out);
    }

    /// Make every later `action` call fail with a SOAP fault
    pub fn fail(&self, action: &str) {
        self.inner.lock().unwrap().failures.insert(action.to_string());
    }

    pub fn count(&self, action: &str) -> usize {
        self.inner.lock().unwrap().calls.iter().filter(|c| c.action == action).count()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn last(&self, action: &str) -> Option<RecordedCall> {
        self.calls().into_iter().rev().find(|c| c.action == action)
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().calls.clear();
    }
}

impl ControlTransport for RecordingTransport {
    fn call(&self, service: Service, action: &str, args: &ArgList) -> renderer_api::Result<ArgList> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RecordedCall {
            service,
            action: action.to_string(),
            args: args.clone(),
        });

        if inner.failures.contains(action) {
            return Err(ApiError::SoapFault {
                code: 501,
                description: "Action Failed".to_string(),
            });
        }
        Ok(inner.responses.get(action).cloned().unwrap_or_default())
    }
}

/// `GetPositionInfo` out-arguments
pub fn position(uri: &str, rel_secs: u64, duration: &str) -> ArgList {
    position_with_metadata(uri, rel_secs, duration, "")
}

pub fn position_with_metadata(uri: &str, rel_secs: u64, duration: &str, metadata: &str) -> ArgList {
    ArgList::new()
        .with("Track", "1")
        .with("TrackDuration", duration)
        .with("TrackMetaData", metadata)
        .with("TrackURI", uri)
        .with("RelTime", renderer_parser::format_upnp_time(Duration::from_secs(rel_secs)))
        .with("AbsTime", "NOT_IMPLEMENTED")
}

pub fn track(id: &str, uri: &str) -> Track {
    Track::new(id).with_title(id.to_uppercase()).with_source(Source::new(uri))
}

fn endpoint(service: &str) -> ServiceEndpoint {
    ServiceEndpoint {
        service_type: format!("urn:schemas-upnp-org:service:{}:1", service),
        version: 1,
        control_url: format!("http://127.0.0.1:1/{}/control", service),
        event_sub_url: format!("http://127.0.0.1:1/{}/event", service),
        scpd_url: format!("http://127.0.0.1:1/{}.xml", service),
    }
}

pub fn endpoints() -> ServiceEndpoints {
    ServiceEndpoints {
        av_transport: endpoint("AVTransport"),
        rendering_control: endpoint("RenderingControl"),
        connection_manager: endpoint("ConnectionManager"),
    }
}

/// A session over `transport` with tracks A and B queued
pub fn session(transport: &RecordingTransport, capabilities: DeviceCapabilities) -> (RendererSession, ChangeReceiver) {
    let (sink, changes) = ChannelSink::new();
    let client = RendererClient::new(Box::new(transport.clone()));
    let session = RendererSession::from_parts(
        "Living Room",
        client,
        endpoints(),
        capabilities,
        BackendConfig::default(),
        Box::new(sink),
    )
    .with_tracklist(Tracklist::from_tracks(vec![track("a", A), track("b", B)]));
    (session, changes)
}

pub fn changes_of(changes: &ChangeReceiver, variable: PlayerVariable) -> Vec<StateChange> {
    changes.try_iter().filter(|c| c.variable == variable).collect()
}
