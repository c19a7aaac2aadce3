//! DIDL-Lite codec.
//!
//! Maps between [`Track`] and the `<DIDL-Lite><item>` fragments used as
//! `CurrentURIMetaData` / `NextURIMetaData` arguments and as the
//! `CurrentTrackMetaData` event value.
//!
//! ```xml
//! <DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" ...>
//!   <item id="-1" parentID="-1" restricted="1">
//!     <dc:title>Song Title</dc:title>
//!     <upnp:album>Album Name</upnp:album>
//!     <res protocolInfo="http-get:*:audio/flac:*" duration="0:03:58.000">uri</res>
//!   </item>
//! </DIDL-Lite>
//! ```

use crate::error::{ParseError, ParseResult};
use crate::time::{format_upnp_time_millis, parse_upnp_time};
use crate::track::{Source, Track, TrackMetadata};
use crate::xml;
use quick_xml::events::BytesText;
use quick_xml::Writer;
use tracing::debug;
use xmltree::Element;

const NS_DIDL: &str = "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/";
const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
const NS_UPNP: &str = "urn:schemas-upnp-org:metadata-1-0/upnp/";
const NS_DLNA: &str = "urn:schemas-dlna-org:metadata-1-0/";

const DEFAULT_CLASS: &str = "object.item.audioItem.musicTrack";

/// Encode a track as a DIDL-Lite fragment.
///
/// When `current_uri` is given, the source list is narrowed to the one source
/// with that URI, so the device sees exactly one usable resource.
pub fn track_to_didl(track: &Track, current_uri: Option<&str>) -> ParseResult<String> {
    let mut track = track.clone();
    if let Some(uri) = current_uri {
        let source = track
            .source_for(uri)
            .cloned()
            .unwrap_or_else(|| Source::new(uri));
        track.sources = vec![source];
    }

    let mut writer = Writer::new(Vec::new());
    write_didl(&mut writer, &track).map_err(|e| ParseError::XmlWriteFailed(e.to_string()))?;

    String::from_utf8(writer.into_inner()).map_err(|e| ParseError::XmlWriteFailed(e.to_string()))
}

fn write_didl(writer: &mut Writer<Vec<u8>>, track: &Track) -> quick_xml::Result<()> {
    let id = track.id.as_deref().unwrap_or("-1");
    let meta = &track.metadata;

    writer
        .create_element("DIDL-Lite")
        .with_attribute(("xmlns", NS_DIDL))
        .with_attribute(("xmlns:dc", NS_DC))
        .with_attribute(("xmlns:upnp", NS_UPNP))
        .with_attribute(("xmlns:dlna", NS_DLNA))
        .write_inner_content(|w| {
            w.create_element("item")
                .with_attribute(("id", id))
                .with_attribute(("parentID", "-1"))
                .with_attribute(("restricted", "1"))
                .write_inner_content(|w| {
                    write_text(w, "dc:title", meta.title.as_deref())?;
                    write_text(w, "dc:creator", meta.artist.as_deref())?;
                    write_text(w, "upnp:artist", meta.artist.as_deref())?;
                    if let Some(album_artist) = &meta.album_artist {
                        w.create_element("upnp:artist")
                            .with_attribute(("role", "AlbumArtist"))
                            .write_text_content(BytesText::new(album_artist))?;
                    }
                    write_text(w, "upnp:album", meta.album.as_deref())?;
                    write_text(w, "upnp:genre", meta.genre.as_deref())?;
                    write_text(w, "dc:date", meta.date.as_deref())?;
                    let track_number = meta.track_number.map(|n| n.to_string());
                    write_text(w, "upnp:originalTrackNumber", track_number.as_deref())?;
                    write_text(w, "upnp:albumArtURI", meta.cover_url.as_deref())?;
                    write_text(
                        w,
                        "upnp:class",
                        Some(meta.class.as_deref().unwrap_or(DEFAULT_CLASS)),
                    )?;

                    for source in &track.sources {
                        write_res(w, source, meta)?;
                    }
                    Ok::<(), quick_xml::Error>(())
                })?;
            Ok::<(), quick_xml::Error>(())
        })?;

    Ok(())
}

fn write_text(w: &mut Writer<Vec<u8>>, name: &str, value: Option<&str>) -> quick_xml::Result<()> {
    if let Some(value) = value {
        w.create_element(name)
            .write_text_content(BytesText::new(value))?;
    }
    Ok(())
}

fn write_res(
    w: &mut Writer<Vec<u8>>,
    source: &Source,
    meta: &TrackMetadata,
) -> quick_xml::Result<()> {
    let protocol_info = source.protocol_info();
    let duration = meta.duration.map(format_upnp_time_millis);
    let size = source.size.map(|s| s.to_string());
    let bitrate = source.bitrate.map(|b| b.to_string());

    let mut res = w
        .create_element("res")
        .with_attribute(("protocolInfo", protocol_info.as_str()));
    if let Some(duration) = &duration {
        res = res.with_attribute(("duration", duration.as_str()));
    }
    if let Some(size) = &size {
        res = res.with_attribute(("size", size.as_str()));
    }
    if let Some(bitrate) = &bitrate {
        res = res.with_attribute(("bitrate", bitrate.as_str()));
    }
    res.write_text_content(BytesText::new(&source.uri))?;
    Ok(())
}

/// Decode a DIDL-Lite fragment; malformed input yields an empty track.
pub fn didl_to_track(didl: &str) -> Track {
    match parse_didl(didl) {
        Ok(track) => track,
        Err(e) => {
            debug!(error = %e, "ignoring unusable DIDL-Lite metadata");
            Track::default()
        }
    }
}

/// Decode the first `<item>` of a DIDL-Lite fragment.
pub fn parse_didl(didl: &str) -> ParseResult<Track> {
    if didl.trim().is_empty() {
        return Err(ParseError::MissingRequiredElement("DIDL-Lite".to_string()));
    }

    let root = xml::parse_element(didl)?;
    let item = xml::find_descendant(&root, &|e: &Element| e.name == "item")
        .ok_or_else(|| ParseError::MissingRequiredElement("item".to_string()))?;

    let mut metadata = TrackMetadata {
        title: xml::child_text(item, "title"),
        album: xml::child_text(item, "album"),
        genre: xml::child_text(item, "genre"),
        date: xml::child_text(item, "date"),
        track_number: xml::child_text(item, "originalTrackNumber").and_then(|n| n.parse().ok()),
        cover_url: xml::child_text(item, "albumArtURI"),
        class: xml::child_text(item, "class"),
        ..Default::default()
    };

    for artist in xml::children_named(item, "artist") {
        let name = xml::element_text(artist);
        if name.is_empty() {
            continue;
        }
        match xml::attribute(artist, "role") {
            Some(role) if role.eq_ignore_ascii_case("AlbumArtist") => {
                metadata.album_artist.get_or_insert(name);
            }
            _ => {
                metadata.artist.get_or_insert(name);
            }
        }
    }
    if metadata.artist.is_none() {
        metadata.artist = xml::child_text(item, "creator");
    }

    let mut sources = Vec::new();
    for res in xml::children_named(item, "res") {
        let uri = xml::element_text(res);
        if uri.is_empty() {
            continue;
        }
        if metadata.duration.is_none() {
            metadata.duration = xml::attribute(res, "duration").and_then(parse_upnp_time);
        }
        let protocol_info = xml::attribute(res, "protocolInfo").map(str::to_string);
        sources.push(Source {
            uri,
            mime_type: protocol_info.as_deref().and_then(mime_from_protocol_info),
            protocol_info,
            bitrate: xml::attribute(res, "bitrate").and_then(|b| b.parse().ok()),
            size: xml::attribute(res, "size").and_then(|s| s.parse().ok()),
        });
    }

    Ok(Track {
        id: xml::attribute(item, "id").map(str::to_string),
        metadata,
        sources,
    })
}

fn mime_from_protocol_info(info: &str) -> Option<String> {
    info.split(':')
        .nth(2)
        .filter(|mime| !mime.is_empty() && *mime != "*")
        .map(str::to_string)
}
