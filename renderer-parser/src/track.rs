//! Internal track model shared by the DIDL-Lite codec, the tracklist and the
//! player state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One playable item with its alternate sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Stable identifier inside the tracklist
    pub id: Option<String>,
    pub metadata: TrackMetadata,
    /// Alternate sources, best first
    pub sources: Vec<Source>,
}

/// Descriptive metadata for a track.
///
/// `duration == None` means the duration is undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub track_number: Option<u32>,
    pub cover_url: Option<String>,
    /// UPnP object class, e.g. `object.item.audioItem.musicTrack`
    pub class: Option<String>,
    pub duration: Option<Duration>,
}

/// A single location a track can be fetched from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub mime_type: Option<String>,
    /// Full `protocolInfo` as reported by a device
    pub protocol_info: Option<String>,
    /// Bytes per second
    pub bitrate: Option<u64>,
    pub size: Option<u64>,
}

impl Source {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// `protocolInfo` to advertise for this source.
    pub fn protocol_info(&self) -> String {
        match (&self.protocol_info, &self.mime_type) {
            (Some(info), _) => info.clone(),
            (None, Some(mime)) => format!("http-get:*:{}:*", mime),
            (None, None) => "http-get:*:*:*".to_string(),
        }
    }
}

impl Track {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.metadata.duration = Some(duration);
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// URI of the preferred source
    pub fn primary_uri(&self) -> Option<&str> {
        self.sources.first().map(|s| s.uri.as_str())
    }

    pub fn source_for(&self, uri: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.uri == uri)
    }

    pub fn has_source(&self) -> bool {
        self.sources.iter().any(|s| !s.uri.is_empty())
    }
}

impl TrackMetadata {
    /// Fill gaps in this metadata from `remote`.
    ///
    /// A defined local duration always wins. An undefined remote duration
    /// never clears a local one. Text fields are only filled when missing.
    pub fn merge_from(&mut self, remote: &TrackMetadata) {
        fn fill<T: Clone>(local: &mut Option<T>, remote: &Option<T>) {
            if local.is_none() {
                local.clone_from(remote);
            }
        }

        fill(&mut self.title, &remote.title);
        fill(&mut self.artist, &remote.artist);
        fill(&mut self.album, &remote.album);
        fill(&mut self.album_artist, &remote.album_artist);
        fill(&mut self.genre, &remote.genre);
        fill(&mut self.date, &remote.date);
        fill(&mut self.track_number, &remote.track_number);
        fill(&mut self.cover_url, &remote.cover_url);
        fill(&mut self.class, &remote.class);
        fill(&mut self.duration, &remote.duration);
    }
}
