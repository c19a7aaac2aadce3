//! Property tests for the DIDL-Lite codec and metadata merging

use proptest::prelude::*;
use renderer_parser::{parse_didl, track_to_didl, Source, Track, TrackMetadata};
use std::time::Duration;

fn text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 &<>'\"]{1,24}".prop_map(|s| s.trim().to_string())
        .prop_filter("non-empty", |s| !s.is_empty())
}

proptest! {
    #[test]
    fn single_source_round_trip(
        title in text(),
        album in text(),
        secs in 1u64..36_000,
        millis in 0u64..1000,
        uris in prop::collection::hash_set("[a-z]{1,8}", 1..5),
        pick in any::<prop::sample::Index>(),
    ) {
        let uris: Vec<String> = uris.into_iter().map(|u| format!("http://host/{}.flac", u)).collect();
        let current = uris[pick.index(uris.len())].clone();

        let mut track = Track::new("t1")
            .with_title(title.clone())
            .with_duration(Duration::from_millis(secs * 1000 + millis));
        track.metadata.album = Some(album.clone());
        for uri in &uris {
            track = track.with_source(Source::new(uri.clone()).with_mime_type("audio/flac"));
        }

        let didl = track_to_didl(&track, Some(&current)).unwrap();
        let decoded = parse_didl(&didl).unwrap();

        prop_assert_eq!(decoded.metadata.title, Some(title));
        prop_assert_eq!(decoded.metadata.album, Some(album));
        prop_assert_eq!(decoded.metadata.duration, track.metadata.duration);
        prop_assert_eq!(decoded.sources.len(), 1);
        prop_assert_eq!(&decoded.sources[0].uri, &current);
    }

    #[test]
    fn merge_never_discards_a_defined_duration(
        local in prop::option::of(0u64..10_000),
        remote in prop::option::of(0u64..10_000),
    ) {
        let mut merged = TrackMetadata {
            duration: local.map(Duration::from_secs),
            ..Default::default()
        };
        merged.merge_from(&TrackMetadata {
            duration: remote.map(Duration::from_secs),
            ..Default::default()
        });

        let expected = local.or(remote).map(Duration::from_secs);
        prop_assert_eq!(merged.duration, expected);
    }
}

#[test]
fn merge_examples() {
    let mut undefined = TrackMetadata::default();
    undefined.merge_from(&TrackMetadata {
        duration: Some(Duration::from_secs(120)),
        ..Default::default()
    });
    assert_eq!(undefined.duration, Some(Duration::from_secs(120)));

    let mut known = TrackMetadata {
        duration: Some(Duration::from_secs(90)),
        ..Default::default()
    };
    known.merge_from(&TrackMetadata::default());
    assert_eq!(known.duration, Some(Duration::from_secs(90)));
}
