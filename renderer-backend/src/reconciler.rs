//! Renderer state reconciliation
//!
//! Merges device events, poll results and application commands into the
//! published player state. The session decides whether the device is
//! playing something it pushed (`our_playback`) by comparing the polled
//! track URI against the URIs it sent with `SetAVTransportURI` and
//! `SetNextAVTransportURI`; everything else follows from that.

use player_state::{PlayMode, PlayerStatus};
use renderer_api::services::av_transport as avt;
use renderer_api::services::rendering_control as rc;
use renderer_api::{FromArg, Service, TransportActions, UpnpAction};
use renderer_parser::{didl_to_track, is_master_channel, parse_upnp_time, track_to_didl};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::message::{Command, SessionMessage};
use crate::session::RendererSession;
use crate::tracklist::{TrackTimes, TracklistChange};

impl RendererSession {
    /// Run one action, logging failures
    ///
    /// A failed call leaves local state untouched and is not retried.
    fn call<A: UpnpAction>(&self, request: &A::Request) -> Option<A::Response> {
        match self.client.execute::<A>(request) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(renderer = %self.name, action = A::ACTION, error = %e, "action failed");
                None
            }
        }
    }

    /// Process one queued message
    pub fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Command(command) => self.handle_command(command),
            SessionMessage::Event {
                service,
                variable,
                value,
                channel,
            } => self.handle_event(service, &variable, &value, channel.as_deref()),
        }
        self.apply_tracklist_changes();
    }

    fn handle_event(&mut self, service: Service, variable: &str, value: &str, channel: Option<&str>) {
        if !is_master_channel(channel) {
            trace!(renderer = %self.name, variable, ?channel, "ignoring non-master channel");
            return;
        }
        self.upnp_state.set(service, variable, value);

        match (service, variable) {
            (Service::AVTransport, "TransportState") => self.on_transport_state(value),
            (Service::AVTransport, "CurrentTrackURI") => self.observe_track(reported(value), None),
            (Service::AVTransport, "CurrentTrackMetaData") => {
                self.track_metadata = reported(value).map(str::to_string);
                if self.flags.our_playback {
                    self.publish_current_track();
                } else if self.track_uri.is_some() {
                    if let Some(didl) = reported(value) {
                        self.publish_device_track(didl);
                    }
                }
            }
            (Service::AVTransport, "NextAVTransportURI") => {
                self.next_uri_dev = reported(value).map(str::to_string);
            }
            (Service::AVTransport, "NextAVTransportURIMetaData") => {
                self.next_uri_metadata_dev = reported(value).map(str::to_string);
            }
            (Service::AVTransport, "CurrentTransportActions") => self.apply_transport_actions(value),
            (Service::AVTransport, "CurrentPlayMode") => {
                if let Some(mode) = PlayMode::from_upnp(value) {
                    self.player.set_mode(mode);
                }
            }
            (Service::AVTransport, "CurrentTrackDuration") => {
                self.duration = parse_upnp_time(value);
            }
            (Service::RenderingControl, "Volume") => {
                if let Ok(level) = value.trim().parse::<i32>() {
                    let volume = self.capabilities.volume_range.range_int_to_float(level);
                    self.player.set_volume(volume);
                }
            }
            (Service::RenderingControl, "Mute") => {
                if let Some(mute) = bool::from_arg(value) {
                    self.player.set_mute(mute);
                }
            }
            _ => trace!(renderer = %self.name, %service, variable, "unhandled variable"),
        }
    }

    fn on_transport_state(&mut self, value: &str) {
        let Some(status) = PlayerStatus::from_transport_state(value) else {
            debug!(renderer = %self.name, state = value, "unknown transport state");
            return;
        };

        match status {
            PlayerStatus::Stopped => {
                if self.flags.finishing && self.flags.our_playback && !self.flags.stop_sent {
                    self.flags.finishing = false;
                    if self.tracklist.advance(false) {
                        info!(renderer = %self.name, "track finished, playing next");
                        self.apply_tracklist_changes();
                        self.play_current();
                        return;
                    }
                }
                self.flags.stop_sent = false;
                self.flags.finishing = false;
            }
            PlayerStatus::Playing => self.flags.stop_sent = false,
            _ => {}
        }
        self.player.set_status(status);
    }

    fn handle_command(&mut self, command: Command) {
        debug!(renderer = %self.name, ?command, "command");

        match command {
            Command::Play => {
                if self.player.status() == PlayerStatus::Paused && self.flags.our_playback {
                    if self.call::<avt::Play>(&avt::PlayRequest::normal()).is_some() {
                        self.player.set_status(PlayerStatus::Playing);
                    }
                } else {
                    self.play_current();
                }
            }
            Command::Stop => {
                if self.call::<avt::Stop>(&avt::StopRequest {}).is_some() {
                    self.flags.stop_sent = true;
                    self.flags.finishing = false;
                    self.player.set_status(PlayerStatus::Stopped);
                }
            }
            Command::Pause => {
                if !self.flags.can_pause {
                    debug!(renderer = %self.name, "pause not available");
                    return;
                }
                match self.player.status() {
                    PlayerStatus::Paused => {
                        if self.call::<avt::Play>(&avt::PlayRequest::normal()).is_some() {
                            self.player.set_status(PlayerStatus::Playing);
                        }
                    }
                    PlayerStatus::Playing => {
                        if self.call::<avt::Pause>(&avt::PauseRequest {}).is_some() {
                            self.player.set_status(PlayerStatus::Paused);
                        }
                    }
                    _ => {}
                }
            }
            Command::Seek(position) => {
                if !self.flags.can_seek {
                    debug!(renderer = %self.name, "seek not available");
                    return;
                }
                if self.call::<avt::Seek>(&avt::SeekRequest::rel_time(position)).is_some() {
                    self.position = position;
                    self.flags.finishing = false;
                    self.publish_time();
                }
            }
            Command::Next => {
                if self.tracklist.advance(true) {
                    self.restart_if_active();
                }
            }
            Command::Prev => {
                if self.tracklist.back() {
                    self.restart_if_active();
                }
            }
            Command::SetTrack(idx) => {
                if self.tracklist.set_current_by_idx(idx) {
                    self.restart_if_active();
                }
            }
            Command::SetVolume(volume) => {
                if !self.capabilities.has_volume {
                    return;
                }
                let range = self.capabilities.volume_range;
                let level = range.range_float_to_int(volume);
                if self.call::<rc::SetVolume>(&rc::SetVolumeRequest::master(level)).is_some() {
                    self.player.set_volume(range.range_int_to_float(level));
                }
            }
            Command::SetMute(mute) => {
                if !self.capabilities.has_mute {
                    return;
                }
                if self.call::<rc::SetMute>(&rc::SetMuteRequest::master(mute)).is_some() {
                    self.player.set_mute(mute);
                }
            }
            Command::SetMode(mode) => {
                if self.capabilities.supports_play_mode(mode) {
                    let request = avt::SetPlayModeRequest {
                        new_play_mode: mode.as_upnp().to_string(),
                    };
                    self.call::<avt::SetPlayMode>(&request);
                }
                self.tracklist.set_mode(mode);
            }
            Command::Splice {
                idx,
                delete_count,
                items,
                source_client_id,
            } => self.tracklist.splice(idx, delete_count, items, source_client_id.as_deref()),
        }
    }

    fn restart_if_active(&mut self) {
        if self.player.status().is_active() {
            self.play_current();
        }
    }

    /// Load the current tracklist entry into the device and start it
    fn play_current(&mut self) -> bool {
        if self.tracklist.get_current_track().is_none() && !self.tracklist.advance(false) {
            debug!(renderer = %self.name, "nothing to play");
            return false;
        }
        let Some(track) = self.tracklist.get_current_track() else {
            return false;
        };
        let Some(uri) = track.primary_uri().map(str::to_string) else {
            warn!(renderer = %self.name, "track has no playable source");
            return false;
        };
        let metadata = track_to_didl(track, Some(&uri)).unwrap_or_else(|e| {
            warn!(renderer = %self.name, error = %e, "failed to encode track metadata");
            String::new()
        });

        let request = avt::SetAVTransportURIRequest {
            current_uri: uri.clone(),
            current_uri_metadata: metadata,
        };
        if self.call::<avt::SetAVTransportURI>(&request).is_none() {
            return false;
        }

        self.av_transport_uri = Some(uri);
        self.next_av_transport_uri = None;
        self.flags.next_queued = false;
        self.flags.finishing = false;
        self.flags.stop_sent = false;
        self.track_uri = None;
        self.track_metadata = None;
        self.duration = None;
        self.position = Duration::ZERO;
        self.set_ownership(true);
        self.publish_current_track();

        if self.call::<avt::Play>(&avt::PlayRequest::normal()).is_none() {
            return false;
        }
        self.player.set_status(PlayerStatus::Playing);
        self.last_poll = None;
        true
    }

    /// Poll the device if due
    ///
    /// The first call fetches the initial state. After that the device is
    /// polled at most once per poll interval, and only while playback is
    /// active. Returns whether any request was sent.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.flags.needs_initial_state {
            self.fetch_initial_state();
            self.apply_tracklist_changes();
            self.last_poll = Some(now);
            return true;
        }

        if !self.player.status().is_active() {
            return false;
        }
        if self
            .last_poll
            .is_some_and(|last| now.saturating_duration_since(last) < self.config.poll_interval)
        {
            return false;
        }
        self.last_poll = Some(now);

        if self.flags.needs_metadata {
            self.refresh_metadata();
        }

        let Some(info) = self.call::<avt::GetPositionInfo>(&avt::GetPositionInfoRequest {}) else {
            return true;
        };
        let position = info.position().unwrap_or_default();

        // A finishing track that restarts under the same URI was looped by the device
        if self.flags.finishing && info.uri().is_some() && info.uri() == self.track_uri.as_deref() && position < self.position {
            debug!(renderer = %self.name, "same track restarted");
            self.track_uri = None;
        }

        self.observe_track(info.uri(), info.metadata());
        if let Some(duration) = info.duration() {
            self.duration = Some(duration);
        }
        self.position = position;
        self.apply_tracklist_changes();

        self.publish_time();
        self.check_prequeue();
        self.update_finishing();
        true
    }

    /// Record the URI the device is playing and detect track boundaries
    fn observe_track(&mut self, uri: Option<&str>, metadata: Option<&str>) {
        if uri == self.track_uri.as_deref() {
            if let Some(metadata) = metadata {
                if self.track_metadata.as_deref() != Some(metadata) {
                    self.track_metadata = Some(metadata.to_string());
                    if self.flags.our_playback {
                        self.publish_current_track();
                    }
                }
            }
            return;
        }

        debug!(renderer = %self.name, from = ?self.track_uri, to = ?uri, "track boundary");
        self.track_uri = uri.map(str::to_string);
        self.track_metadata = metadata.map(str::to_string);
        self.flags.finishing = false;
        self.duration = None;
        self.position = Duration::ZERO;
        self.reprobe_transport_actions();

        let Some(uri) = uri else {
            self.set_ownership(false);
            return;
        };

        let is_current = self.av_transport_uri.as_deref() == Some(uri);
        let is_next = self.next_av_transport_uri.as_deref() == Some(uri);

        if is_next && (!is_current || self.flags.next_queued) {
            // The device moved on to the pre-queued track
            self.av_transport_uri = self.next_av_transport_uri.take();
            self.flags.next_queued = false;
            self.set_ownership(true);
            self.follow_device_to(uri);
            self.publish_current_track();
        } else if is_current {
            self.set_ownership(true);
            self.publish_current_track();
        } else {
            self.set_ownership(false);
            self.flags.next_queued = false;
            self.adopt_device_track(uri);
        }
    }

    /// Move the tracklist cursor onto the track the device switched to
    fn follow_device_to(&mut self, uri: &str) {
        let next_matches = self
            .tracklist
            .get_next()
            .is_some_and(|track| track.source_for(uri).is_some());

        if next_matches {
            self.tracklist.advance(false);
        } else if let Some(idx) = self
            .tracklist
            .tracks()
            .iter()
            .position(|track| track.source_for(uri).is_some())
        {
            self.tracklist.set_current_by_idx(idx);
        }
    }

    fn set_ownership(&mut self, ours: bool) {
        if self.flags.our_playback != ours {
            info!(renderer = %self.name, ours, "playback ownership changed");
            self.flags.our_playback = ours;
        }
    }

    /// Publish what a foreign controller put on the device
    fn adopt_device_track(&mut self, uri: &str) {
        let metadata = if self.next_uri_dev.as_deref() == Some(uri) {
            self.next_uri_metadata_dev.clone()
        } else {
            self.track_metadata.clone()
        };

        match metadata {
            Some(didl) => self.publish_device_track(&didl),
            None => {
                self.flags.needs_metadata = true;
                self.player.set_current_track(None);
            }
        }
    }

    fn publish_device_track(&mut self, didl: &str) {
        self.flags.needs_metadata = false;
        self.player.set_current_track(Some(didl_to_track(didl)));
    }

    fn refresh_metadata(&mut self) {
        let Some(media) = self.call::<avt::GetMediaInfo>(&avt::GetMediaInfoRequest {}) else {
            return;
        };
        self.flags.needs_metadata = false;
        self.record_media_info(&media);

        if !self.flags.our_playback {
            if let Some(didl) = media.current_uri_metadata() {
                self.publish_device_track(didl);
            }
        }
    }

    fn record_media_info(&mut self, media: &avt::GetMediaInfoResponse) {
        self.next_uri_dev = media.next_uri().map(str::to_string);
        self.next_uri_metadata_dev = media.next_uri_metadata().map(str::to_string);
    }

    fn fetch_initial_state(&mut self) {
        self.flags.needs_initial_state = false;

        if let Some(info) = self.call::<avt::GetTransportInfo>(&avt::GetTransportInfoRequest {}) {
            if let Some(status) = PlayerStatus::from_transport_state(&info.current_transport_state) {
                self.player.set_status(status);
            }
        }

        if let Some(media) = self.call::<avt::GetMediaInfo>(&avt::GetMediaInfoRequest {}) {
            self.record_media_info(&media);
            if let Some(uri) = media.current_uri() {
                self.observe_track(Some(uri), media.current_uri_metadata());
            }
        }
        if self.track_uri.is_none() {
            self.reprobe_transport_actions();
        }

        if let Some(settings) = self.call::<avt::GetTransportSettings>(&avt::GetTransportSettingsRequest {}) {
            if let Some(mode) = PlayMode::from_upnp(&settings.play_mode) {
                self.player.set_mode(mode);
            }
        }

        if self.capabilities.has_volume {
            if let Some(volume) = self.call::<rc::GetVolume>(&rc::GetVolumeRequest::master()) {
                let volume = self.capabilities.volume_range.range_int_to_float(volume.current_volume);
                self.player.set_volume(volume);
            }
        }
        if self.capabilities.has_mute {
            if let Some(mute) = self.call::<rc::GetMute>(&rc::GetMuteRequest::master()) {
                self.player.set_mute(mute.current_mute);
            }
        }

        debug!(renderer = %self.name, status = %self.player.status(), "initial state fetched");
    }

    /// Re-derive per-track permissions at a track boundary
    fn reprobe_transport_actions(&mut self) {
        if !self.capabilities.current_transport_actions {
            self.flags.can_seek = self.capabilities.seek_rel_time;
            self.flags.can_pause = self.capabilities.pause;
            return;
        }
        let request = avt::GetCurrentTransportActionsRequest {};
        if let Some(response) = self.call::<avt::GetCurrentTransportActions>(&request) {
            self.apply_transport_actions(&response.actions);
        }
    }

    fn apply_transport_actions(&mut self, list: &str) {
        let actions = TransportActions::parse(list);
        // An empty list carries no information
        if actions.is_empty() {
            self.flags.can_seek = self.capabilities.seek_rel_time;
            self.flags.can_pause = self.capabilities.pause;
            return;
        }
        self.flags.can_seek = self.capabilities.seek_rel_time && actions.can_seek();
        self.flags.can_pause = self.capabilities.pause && actions.can_pause();
    }

    /// Queue the upcoming track on the device for gapless playback
    ///
    /// Sends `SetNextAVTransportURI` at most once per track, and only when
    /// the device plays our URI and less than the pre-queue threshold of it
    /// remains. Returns whether the track was queued.
    pub fn check_prequeue(&mut self) -> bool {
        if !self.config.gapless
            || !self.capabilities.set_next
            || !self.flags.our_playback
            || self.flags.next_queued
        {
            return false;
        }
        if !self.remaining().is_some_and(|r| r < self.config.prequeue_threshold) {
            return false;
        }

        let Some(next) = self.tracklist.get_next() else {
            return false;
        };
        let Some(uri) = next.primary_uri().map(str::to_string) else {
            return false;
        };
        let metadata = track_to_didl(next, Some(&uri)).unwrap_or_else(|e| {
            warn!(renderer = %self.name, error = %e, "failed to encode next track metadata");
            String::new()
        });

        let request = avt::SetNextAVTransportURIRequest {
            next_uri: uri.clone(),
            next_uri_metadata: metadata,
        };
        if self.call::<avt::SetNextAVTransportURI>(&request).is_none() {
            return false;
        }

        debug!(renderer = %self.name, %uri, "next track queued");
        self.next_av_transport_uri = Some(uri);
        self.flags.next_queued = true;
        true
    }

    fn update_finishing(&mut self) {
        let finishing = self.flags.our_playback
            && self.remaining().is_some_and(|r| r <= self.config.finishing_threshold);
        if finishing != self.flags.finishing {
            trace!(renderer = %self.name, finishing, "finishing flag");
            self.flags.finishing = finishing;
        }
    }

    /// Duration of what is playing; our own tracks prefer the local value
    fn effective_duration(&self) -> Option<Duration> {
        let local = if self.flags.our_playback {
            self.tracklist.get_current_track().and_then(|t| t.metadata.duration)
        } else {
            None
        };
        local.or(self.duration)
    }

    fn remaining(&self) -> Option<Duration> {
        self.effective_duration().map(|d| d.saturating_sub(self.position))
    }

    fn publish_time(&mut self) {
        let times = if self.flags.our_playback {
            self.tracklist.get_times(self.position)
        } else {
            TrackTimes::default()
        };
        let mut time = times.with_time(self.position);

        if time.remaining.is_none() {
            if let Some(duration) = self.effective_duration() {
                time.remaining = Some(duration.saturating_sub(self.position));
                time.percentage = (!duration.is_zero())
                    .then(|| (self.position.as_secs_f32() / duration.as_secs_f32()).min(1.0));
            }
        }
        self.player.set_time(time);
    }

    fn publish_current_track(&mut self) {
        let track = self.tracklist.get_current_track().cloned().map(|mut track| {
            if let (Some(uri), Some(didl)) = (&self.track_uri, &self.track_metadata) {
                if track.source_for(uri).is_some() {
                    track.metadata.merge_from(&didl_to_track(didl).metadata);
                }
            }
            track
        });
        self.player.set_current_track(track);
    }

    fn invalidate_queued_next(&mut self) {
        if self.flags.next_queued {
            debug!(renderer = %self.name, "queued next track is stale");
            self.flags.next_queued = false;
        }
    }

    /// Publish and react to tracklist mutations
    pub(crate) fn apply_tracklist_changes(&mut self) {
        for change in self.tracklist.take_changes() {
            match change {
                TracklistChange::CurrentChanged(_) => {
                    if self.flags.our_playback || !self.player.status().is_active() {
                        self.publish_current_track();
                    }
                }
                TracklistChange::ModeChanged(mode) => {
                    self.player.set_mode(mode);
                    self.invalidate_queued_next();
                }
                TracklistChange::Spliced { .. } => self.invalidate_queued_next(),
            }
        }
    }
}

/// Devices report "no value" as an empty string or `NOT_IMPLEMENTED`
fn reported(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && value != "NOT_IMPLEMENTED").then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_filters_placeholders() {
        assert_eq!(reported(""), None);
        assert_eq!(reported("NOT_IMPLEMENTED"), None);
        assert_eq!(reported(" http://x/a.mp3 "), Some("http://x/a.mp3"));
    }
}
