//! Reconciler behaviour against a recording transport

mod common;

use common::*;
use player_state::{PlayMode, PlayerStatus, PlayerVariable, StateValue};
use proptest::prelude::*;
use renderer_api::{ArgList, Service};
use renderer_backend::{Command, DeviceCapabilities, SessionMessage};
use std::time::{Duration, Instant};

fn started(transport: &RecordingTransport) -> (renderer_backend::RendererSession, player_state::ChangeReceiver, Instant) {
    let (mut session, changes) = session(transport, DeviceCapabilities::full());
    let t0 = Instant::now();
    assert!(session.poll(t0));
    session.handle_message(Command::Play.into());
    (session, changes, t0)
}

#[test]
fn test_initial_poll_fetches_state_once() {
    let transport = RecordingTransport::new();
    transport.respond(
        "GetTransportInfo",
        ArgList::new().with("CurrentTransportState", "STOPPED"),
    );
    transport.respond("GetVolume", ArgList::new().with("CurrentVolume", "25"));
    let (mut session, changes) = session(&transport, DeviceCapabilities::full());

    let now = Instant::now();
    assert!(session.poll(now));
    assert!(!session.poll(now + Duration::from_secs(5)));

    for action in ["GetTransportInfo", "GetMediaInfo", "GetTransportSettings", "GetVolume", "GetMute"] {
        assert_eq!(transport.count(action), 1, "{action}");
    }
    assert_eq!(session.player().status(), PlayerStatus::Stopped);
    assert_eq!(session.player().volume(), 0.25);
    assert_eq!(changes_of(&changes, PlayerVariable::Volume).len(), 1);
}

#[test]
fn test_play_pushes_current_track() {
    let transport = RecordingTransport::new();
    let (session, changes, _) = started(&transport);

    let call = transport.last("SetAVTransportURI").unwrap();
    assert_eq!(call.service, Service::AVTransport);
    assert_eq!(call.args.get("InstanceID"), Some("0"));
    assert_eq!(call.args.get("CurrentURI"), Some(A));
    assert!(call.args.get("CurrentURIMetaData").unwrap().contains("DIDL-Lite"));
    assert_eq!(transport.count("Play"), 1);

    assert_eq!(session.av_transport_uri(), Some(A));
    assert!(session.flags().our_playback);
    assert_eq!(session.player().status(), PlayerStatus::Playing);

    let tracks = changes_of(&changes, PlayerVariable::CurrentTrack);
    assert!(matches!(
        tracks.last().map(|c| &c.value),
        Some(StateValue::Track(Some(track))) if track.primary_uri() == Some(A)
    ));
}

#[test]
fn test_gapless_scenario() {
    let transport = RecordingTransport::new();
    let (mut session, _changes, t0) = started(&transport);

    transport.respond("GetPositionInfo", position(A, 90, "0:01:40"));
    assert!(session.poll(t0 + Duration::from_secs(1)));
    assert_eq!(transport.count("SetNextAVTransportURI"), 0);
    assert!(!session.flags().finishing);

    transport.respond("GetPositionInfo", position(A, 93, "0:01:40"));
    session.poll(t0 + Duration::from_secs(2));
    let queued = transport.last("SetNextAVTransportURI").unwrap();
    assert_eq!(queued.args.get("NextURI"), Some(B));
    assert_eq!(session.next_av_transport_uri(), Some(B));
    assert!(session.flags().next_queued);

    transport.respond("GetPositionInfo", position(A, 97, "0:01:40"));
    session.poll(t0 + Duration::from_secs(3));
    assert!(session.flags().finishing);
    assert_eq!(transport.count("SetNextAVTransportURI"), 1);

    session.handle_message(SessionMessage::event(Service::AVTransport, "TransportState", "STOPPED"));

    assert_eq!(transport.last("SetAVTransportURI").unwrap().args.get("CurrentURI"), Some(B));
    assert_eq!(transport.count("Play"), 2);
    assert_eq!(session.tracklist().current_index(), Some(1));
    assert_eq!(session.av_transport_uri(), Some(B));
    assert!(!session.flags().finishing);
}

#[test]
fn test_prequeue_is_sent_once() {
    let transport = RecordingTransport::new();
    let (mut session, _changes, t0) = started(&transport);

    for (i, secs) in [92, 94, 95, 96].into_iter().enumerate() {
        transport.respond("GetPositionInfo", position(A, secs, "0:01:40"));
        session.poll(t0 + Duration::from_secs(i as u64 + 1));
        assert!(!session.check_prequeue());
    }
    assert_eq!(transport.count("SetNextAVTransportURI"), 1);
}

#[test]
fn test_gapless_transition_follows_device() {
    let transport = RecordingTransport::new();
    let (mut session, _changes, t0) = started(&transport);

    transport.respond("GetPositionInfo", position(A, 95, "0:01:40"));
    session.poll(t0 + Duration::from_secs(1));
    transport.respond("GetPositionInfo", position(B, 1, "0:02:00"));
    session.poll(t0 + Duration::from_secs(2));

    assert!(session.flags().our_playback);
    assert!(!session.flags().next_queued);
    assert_eq!(session.av_transport_uri(), Some(B));
    assert_eq!(session.next_av_transport_uri(), None);
    assert_eq!(session.tracklist().current_index(), Some(1));
    assert_eq!(transport.count("SetAVTransportURI"), 1);
}

#[test]
fn test_stop_does_not_advance() {
    let transport = RecordingTransport::new();
    let (mut session, _changes, t0) = started(&transport);

    transport.respond("GetPositionInfo", position(A, 98, "0:01:40"));
    session.poll(t0 + Duration::from_secs(1));
    assert!(session.flags().finishing);

    session.handle_message(Command::Stop.into());
    session.handle_message(SessionMessage::event(Service::AVTransport, "TransportState", "STOPPED"));

    assert_eq!(transport.count("SetAVTransportURI"), 1);
    assert_eq!(session.tracklist().current_index(), Some(0));
    assert_eq!(session.player().status(), PlayerStatus::Stopped);
    assert!(!session.flags().stop_sent);
}

#[test]
fn test_foreign_playback_is_adopted() {
    let transport = RecordingTransport::new();
    let (mut session, changes, t0) = started(&transport);

    let didl = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"><item id="x"><dc:title>Elsewhere</dc:title><upnp:class>object.item.audioItem.musicTrack</upnp:class><res protocolInfo="http-get:*:audio/mpeg:*">http://elsewhere.local/x.mp3</res></item></DIDL-Lite>"#;
    transport.respond("GetPositionInfo", position_with_metadata(X, 10, "0:03:00", didl));
    session.poll(t0 + Duration::from_secs(1));

    assert!(!session.flags().our_playback);
    assert_eq!(transport.count("SetNextAVTransportURI"), 0);
    let published = changes_of(&changes, PlayerVariable::CurrentTrack);
    assert!(matches!(
        published.last().map(|c| &c.value),
        Some(StateValue::Track(Some(track))) if track.metadata.title.as_deref() == Some("Elsewhere")
    ));
}

#[test]
fn test_foreign_playback_without_metadata_refreshes() {
    let transport = RecordingTransport::new();
    let (mut session, _changes, t0) = started(&transport);

    transport.respond("GetPositionInfo", position(X, 10, "0:03:00"));
    session.poll(t0 + Duration::from_secs(1));
    assert!(session.flags().needs_metadata);
    let before = transport.count("GetMediaInfo");

    session.poll(t0 + Duration::from_secs(2));
    assert_eq!(transport.count("GetMediaInfo"), before + 1);
    assert!(!session.flags().needs_metadata);
}

fn didl_for(uri: &str, title: &str, duration: Option<&str>) -> String {
    let duration = duration.map(|d| format!(r#" duration="{d}""#)).unwrap_or_default();
    format!(
        r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"><item id="dev"><dc:title>{title}</dc:title><upnp:class>object.item.audioItem.musicTrack</upnp:class><res protocolInfo="http-get:*:audio/flac:*"{duration}>{uri}</res></item></DIDL-Lite>"#
    )
}

fn last_published_track(changes: &player_state::ChangeReceiver) -> Option<renderer_parser::Track> {
    changes_of(changes, PlayerVariable::CurrentTrack)
        .into_iter()
        .filter_map(|c| match c.value {
            StateValue::Track(track) => Some(track.map(|t| *t)),
            _ => None,
        })
        .last()
        .flatten()
}

#[test]
fn test_device_duration_fills_own_track() {
    let transport = RecordingTransport::new();
    let (mut session, changes, t0) = started(&transport);
    let _ = changes_of(&changes, PlayerVariable::CurrentTrack);

    let didl = didl_for(A, "Device Title", Some("0:02:00.000"));
    transport.respond("GetPositionInfo", position_with_metadata(A, 5, "0:02:00", &didl));
    session.poll(t0 + Duration::from_secs(1));
    session.poll(t0 + Duration::from_secs(2));

    assert!(session.flags().our_playback);
    let track = last_published_track(&changes).unwrap();
    assert_eq!(track.metadata.duration, Some(Duration::from_secs(120)));
    assert_eq!(track.metadata.title.as_deref(), Some("A"));
}

#[test]
fn test_metadata_event_fills_own_track() {
    let transport = RecordingTransport::new();
    let (mut session, changes, t0) = started(&transport);

    transport.respond("GetPositionInfo", position(A, 5, "0:02:00"));
    session.poll(t0 + Duration::from_secs(1));
    assert_eq!(
        last_published_track(&changes).and_then(|t| t.metadata.duration),
        None
    );

    let didl = didl_for(A, "Device Title", Some("0:02:00.000"));
    session.handle_message(SessionMessage::event(Service::AVTransport, "CurrentTrackMetaData", &didl));

    let track = last_published_track(&changes).unwrap();
    assert_eq!(track.metadata.duration, Some(Duration::from_secs(120)));
}

#[test]
fn test_foreign_playback_uses_reported_next_metadata() {
    let transport = RecordingTransport::new();
    let (mut session, changes, t0) = started(&transport);

    let didl = didl_for(X, "Queued Elsewhere", None);
    session.handle_message(SessionMessage::event(Service::AVTransport, "NextAVTransportURI", X));
    session.handle_message(SessionMessage::event(Service::AVTransport, "NextAVTransportURIMetaData", &didl));

    transport.respond("GetPositionInfo", position(X, 3, "0:03:00"));
    session.poll(t0 + Duration::from_secs(1));

    assert!(!session.flags().our_playback);
    assert!(!session.flags().needs_metadata);
    let track = last_published_track(&changes).unwrap();
    assert_eq!(track.metadata.title.as_deref(), Some("Queued Elsewhere"));

    let refreshes = transport.count("GetMediaInfo");
    session.poll(t0 + Duration::from_secs(2));
    assert_eq!(transport.count("GetMediaInfo"), refreshes);
}

#[test]
fn test_mute_gated_on_capability() {
    let transport = RecordingTransport::new();
    let capabilities = DeviceCapabilities {
        has_mute: false,
        ..DeviceCapabilities::full()
    };
    let (mut session, _changes) = session(&transport, capabilities);

    session.handle_message(Command::SetMute(true).into());
    assert_eq!(transport.count("SetMute"), 0);
    assert!(!session.player().mute());

    let (mut session, _changes) = common::session(&transport, DeviceCapabilities::full());
    session.handle_message(Command::SetMute(true).into());
    assert_eq!(transport.count("SetMute"), 1);
    assert!(session.player().mute());
}

#[test]
fn test_pause_and_seek_gated_on_flags() {
    let transport = RecordingTransport::new();
    let capabilities = DeviceCapabilities {
        pause: false,
        seek_rel_time: false,
        ..DeviceCapabilities::full()
    };
    let (mut session, _changes) = session(&transport, capabilities);
    session.handle_message(Command::Play.into());

    session.handle_message(Command::Pause.into());
    session.handle_message(Command::Seek(Duration::from_secs(30)).into());
    assert_eq!(transport.count("Pause"), 0);
    assert_eq!(transport.count("Seek"), 0);
}

#[test]
fn test_transport_actions_restrict_seek() {
    let transport = RecordingTransport::new();
    let (mut session, _changes, t0) = started(&transport);

    transport.respond("GetCurrentTransportActions", ArgList::new().with("Actions", "Play,Stop,Pause"));
    transport.respond("GetPositionInfo", position(A, 5, "0:01:40"));
    session.poll(t0 + Duration::from_secs(1));

    assert!(session.flags().can_pause);
    assert!(!session.flags().can_seek);
    session.handle_message(Command::Seek(Duration::from_secs(30)).into());
    assert_eq!(transport.count("Seek"), 0);
}

#[test]
fn test_pause_toggles() {
    let transport = RecordingTransport::new();
    let (mut session, _changes, _) = started(&transport);

    session.handle_message(Command::Pause.into());
    assert_eq!(session.player().status(), PlayerStatus::Paused);
    session.handle_message(Command::Pause.into());
    assert_eq!(session.player().status(), PlayerStatus::Playing);
    assert_eq!(transport.count("Pause"), 1);
    assert_eq!(transport.count("Play"), 2);
}

#[test]
fn test_failed_set_uri_leaves_state() {
    let transport = RecordingTransport::new();
    transport.fail("SetAVTransportURI");
    let (mut session, _changes) = session(&transport, DeviceCapabilities::full());

    session.handle_message(Command::Play.into());
    assert_eq!(transport.count("SetAVTransportURI"), 1);
    assert_eq!(transport.count("Play"), 0);
    assert_eq!(session.av_transport_uri(), None);
    assert!(!session.flags().our_playback);
}

#[test]
fn test_unsupported_play_mode_stays_local() {
    let transport = RecordingTransport::new();
    let capabilities = DeviceCapabilities {
        play_modes: vec![PlayMode::Normal],
        ..DeviceCapabilities::full()
    };
    let (mut session, changes) = session(&transport, capabilities);

    session.handle_message(Command::SetMode(PlayMode::Shuffle).into());
    assert_eq!(transport.count("SetPlayMode"), 0);
    assert_eq!(session.tracklist().mode(), PlayMode::Shuffle);
    assert_eq!(session.player().mode(), PlayMode::Shuffle);
    assert_eq!(changes_of(&changes, PlayerVariable::Mode).len(), 1);

    session.handle_message(Command::SetMode(PlayMode::Normal).into());
    assert_eq!(transport.last("SetPlayMode").unwrap().args.get("NewPlayMode"), Some("NORMAL"));
}

#[test]
fn test_splice_invalidates_queued_next() {
    let transport = RecordingTransport::new();
    let (mut session, _changes, t0) = started(&transport);

    transport.respond("GetPositionInfo", position(A, 95, "0:01:40"));
    session.poll(t0 + Duration::from_secs(1));
    assert!(session.flags().next_queued);

    session.handle_message(
        Command::Splice {
            idx: 1,
            delete_count: 1,
            items: vec![track("c", "http://media.local/c.flac")],
            source_client_id: None,
        }
        .into(),
    );
    assert!(!session.flags().next_queued);

    session.poll(t0 + Duration::from_secs(2));
    let queued = transport.last("SetNextAVTransportURI").unwrap();
    assert_eq!(queued.args.get("NextURI"), Some("http://media.local/c.flac"));
}

#[test]
fn test_volume_event_quantised() {
    let transport = RecordingTransport::new();
    let (mut session, _changes) = session(&transport, DeviceCapabilities::full());

    session.handle_message(SessionMessage::Event {
        service: Service::RenderingControl,
        variable: "Volume".to_string(),
        value: "40".to_string(),
        channel: Some("Master".to_string()),
    });
    session.handle_message(SessionMessage::Event {
        service: Service::RenderingControl,
        variable: "Volume".to_string(),
        value: "90".to_string(),
        channel: Some("LF".to_string()),
    });
    assert_eq!(session.player().volume(), 0.4);
    assert_eq!(session.upnp_state().get(Service::RenderingControl, "Volume"), Some("40"));

    session.handle_message(Command::SetVolume(0.556).into());
    let call = transport.last("SetVolume").unwrap();
    assert_eq!(call.args.get("Channel"), Some("Master"));
    assert_eq!(call.args.get("DesiredVolume"), Some("56"));
}

#[test]
fn test_unknown_variable_is_recorded() {
    let transport = RecordingTransport::new();
    let (mut session, changes) = session(&transport, DeviceCapabilities::full());

    session.handle_message(SessionMessage::event(Service::AVTransport, "X_VendorThing", "42"));
    assert_eq!(session.upnp_state().get(Service::AVTransport, "X_VendorThing"), Some("42"));
    assert!(changes.try_recv().is_none());
    assert!(transport.calls().is_empty());
}

#[test]
fn test_poll_only_while_active() {
    let transport = RecordingTransport::new();
    let (mut session, _changes) = session(&transport, DeviceCapabilities::full());
    let t0 = Instant::now();
    session.poll(t0);
    transport.clear();

    assert!(!session.poll(t0 + Duration::from_secs(2)));
    assert_eq!(transport.count("GetPositionInfo"), 0);

    session.handle_message(SessionMessage::event(Service::AVTransport, "TransportState", "PLAYING"));
    assert!(session.poll(t0 + Duration::from_secs(3)));
    assert!(!session.poll(t0 + Duration::from_millis(3500)));
    assert_eq!(transport.count("GetPositionInfo"), 1);
}

proptest! {
    #[test]
    fn prop_ownership_matches_pushed_uris(steps in prop::collection::vec((0usize..4, any::<bool>()), 1..24)) {
        let uris = [A, B, X, Y];
        let transport = RecordingTransport::new();
        let (mut session, _changes, t0) = started(&transport);

        for (i, (pick, near_end)) in steps.into_iter().enumerate() {
            let uri = uris[pick];
            let secs = if near_end { 95 } else { 30 };
            transport.respond("GetPositionInfo", position(uri, secs, "0:01:40"));

            let current = session.av_transport_uri().map(str::to_string);
            let next = session.next_av_transport_uri().map(str::to_string);
            session.poll(t0 + Duration::from_secs(i as u64 + 1));

            let expected = current.as_deref() == Some(uri) || next.as_deref() == Some(uri);
            prop_assert_eq!(session.flags().our_playback, expected);
        }
    }
}
