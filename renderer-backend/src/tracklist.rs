//! Local playback queue
//!
//! The tracklist is the only place playlist order lives. The reconciler
//! asks it what plays now and next, and moves the cursor through it;
//! it never reorders tracks itself. Every mutation is recorded as a
//! [`TracklistChange`] which the owning session drains and publishes.

use player_state::{CurrentTime, PlayMode};
use rand::seq::SliceRandom;
use renderer_parser::Track;
use std::time::Duration;
use tracing::debug;

/// A mutation of the tracklist
#[derive(Debug, Clone, PartialEq)]
pub enum TracklistChange {
    Spliced {
        idx: usize,
        delete_count: usize,
        inserted: usize,
        source_client_id: Option<String>,
    },
    CurrentChanged(Option<usize>),
    ModeChanged(PlayMode),
}

/// Timing of the current track relative to the whole list
///
/// Each value is `None` when a duration it depends on is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackTimes {
    pub absolute: Option<Duration>,
    pub remaining: Option<Duration>,
    pub remaining_absolute: Option<Duration>,
    pub percentage: Option<f32>,
}

impl TrackTimes {
    pub fn with_time(self, time: Duration) -> CurrentTime {
        CurrentTime {
            time,
            absolute: self.absolute,
            remaining: self.remaining,
            remaining_absolute: self.remaining_absolute,
            percentage: self.percentage,
        }
    }
}

/// Ordered tracks with a cursor and a play mode
#[derive(Debug, Clone, Default)]
pub struct Tracklist {
    tracks: Vec<Track>,
    current: Option<usize>,
    mode: PlayMode,
    /// Play order used in shuffle mode; a permutation of track indices
    shuffle_order: Vec<usize>,
    changes: Vec<TracklistChange>,
}

impl Tracklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut list = Self::new();
        list.splice(0, 0, tracks, None);
        list.changes.clear();
        list
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlayMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if mode == PlayMode::Shuffle {
            self.reshuffle();
        }
        self.changes.push(TracklistChange::ModeChanged(mode));
    }

    pub fn get_current_track(&self) -> Option<&Track> {
        self.current.and_then(|idx| self.tracks.get(idx))
    }

    /// The track an implicit advance would move to
    pub fn get_next(&self) -> Option<&Track> {
        self.next_index(false).and_then(|idx| self.tracks.get(idx))
    }

    /// Move to the next track.
    ///
    /// `explicit` advances (a user pressing next) skip past repeat-one.
    /// Returns `false` at the end of the list.
    pub fn advance(&mut self, explicit: bool) -> bool {
        match self.next_index(explicit) {
            Some(idx) => {
                self.move_to(idx);
                true
            }
            None => false,
        }
    }

    /// Move to the previous track, returning `false` at the start of the list
    pub fn back(&mut self) -> bool {
        let Some(current) = self.current else {
            return false;
        };

        let previous = match self.mode {
            PlayMode::Normal | PlayMode::RepeatOne => current.checked_sub(1),
            PlayMode::RepeatAll => Some(current.checked_sub(1).unwrap_or(self.tracks.len() - 1)),
            PlayMode::Shuffle => self
                .shuffle_position(current)
                .and_then(|pos| pos.checked_sub(1))
                .map(|pos| self.shuffle_order[pos]),
        };

        match previous {
            Some(idx) => {
                self.move_to(idx);
                true
            }
            None => false,
        }
    }

    pub fn set_current_by_id(&mut self, id: &str) -> bool {
        match self.tracks.iter().position(|t| t.id.as_deref() == Some(id)) {
            Some(idx) => self.set_current_by_idx(idx),
            None => false,
        }
    }

    pub fn set_current_by_idx(&mut self, idx: usize) -> bool {
        if idx >= self.tracks.len() {
            return false;
        }
        self.move_to(idx);
        true
    }

    /// Remove `delete_count` tracks at `idx` and insert `new_items` there
    ///
    /// `idx` is clamped to the list length. Removing the current track
    /// leaves the list without a current track.
    pub fn splice(
        &mut self,
        idx: usize,
        delete_count: usize,
        new_items: Vec<Track>,
        source_client_id: Option<&str>,
    ) {
        let idx = idx.min(self.tracks.len());
        let delete_count = delete_count.min(self.tracks.len() - idx);
        let inserted = new_items.len();

        self.tracks.splice(idx..idx + delete_count, new_items);

        let current = match self.current {
            Some(cur) if cur < idx => Some(cur),
            Some(cur) if cur >= idx + delete_count => Some(cur - delete_count + inserted),
            _ => None,
        };
        if current != self.current {
            self.current = current;
            self.changes.push(TracklistChange::CurrentChanged(current));
        }

        self.reshuffle();
        debug!(idx, delete_count, inserted, len = self.tracks.len(), "tracklist spliced");
        self.changes.push(TracklistChange::Spliced {
            idx,
            delete_count,
            inserted,
            source_client_id: source_client_id.map(str::to_string),
        });
    }

    /// Derived times for the current track at `current_time`
    pub fn get_times(&self, current_time: Duration) -> TrackTimes {
        let Some(current) = self.current else {
            return TrackTimes::default();
        };
        let order = self.play_order();
        let Some(pos) = order.iter().position(|&idx| idx == current) else {
            return TrackTimes::default();
        };

        let duration_of = |idx: &usize| self.tracks.get(*idx).and_then(|t| t.metadata.duration);
        let sum = |indices: &[usize]| -> Option<Duration> { indices.iter().map(&duration_of).sum() };

        let duration = duration_of(&current);
        let remaining = duration.map(|d| d.saturating_sub(current_time));
        let percentage = duration
            .filter(|d| !d.is_zero())
            .map(|d| (current_time.as_secs_f32() / d.as_secs_f32()).min(1.0));

        TrackTimes {
            absolute: sum(&order[..pos]).map(|before| before + current_time),
            remaining,
            remaining_absolute: remaining.zip(sum(&order[pos + 1..])).map(|(r, after)| r + after),
            percentage,
        }
    }

    /// Drain the changes recorded since the last call
    pub fn take_changes(&mut self) -> Vec<TracklistChange> {
        std::mem::take(&mut self.changes)
    }

    fn next_index(&self, explicit: bool) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        let Some(current) = self.current else {
            return self.play_order().first().copied();
        };

        match self.mode {
            PlayMode::RepeatOne if !explicit => Some(current),
            PlayMode::Normal | PlayMode::RepeatOne => Some(current + 1).filter(|&idx| idx < len),
            PlayMode::RepeatAll => Some((current + 1) % len),
            PlayMode::Shuffle => self
                .shuffle_position(current)
                .and_then(|pos| self.shuffle_order.get(pos + 1))
                .copied(),
        }
    }

    fn move_to(&mut self, idx: usize) {
        self.current = Some(idx);
        self.changes.push(TracklistChange::CurrentChanged(Some(idx)));
    }

    fn play_order(&self) -> Vec<usize> {
        if self.mode == PlayMode::Shuffle {
            self.shuffle_order.clone()
        } else {
            (0..self.tracks.len()).collect()
        }
    }

    fn shuffle_position(&self, idx: usize) -> Option<usize> {
        self.shuffle_order.iter().position(|&i| i == idx)
    }

    /// New random order with the current track first
    fn reshuffle(&mut self) {
        let mut order: Vec<usize> = (0..self.tracks.len()).collect();
        order.shuffle(&mut rand::thread_rng());
        if let Some(current) = self.current {
            if let Some(pos) = order.iter().position(|&i| i == current) {
                order.remove(pos);
                order.insert(0, current);
            }
        }
        self.shuffle_order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer_parser::Source;

    fn track(id: &str, secs: u64) -> Track {
        Track::new(id)
            .with_title(id)
            .with_duration(Duration::from_secs(secs))
            .with_source(Source::new(format!("http://x/{}.mp3", id)))
    }

    fn list(ids: &[&str]) -> Tracklist {
        Tracklist::from_tracks(ids.iter().map(|id| track(id, 100)).collect())
    }

    fn current_id(list: &Tracklist) -> Option<&str> {
        list.get_current_track().and_then(|t| t.id.as_deref())
    }

    #[test]
    fn test_normal_advance_and_back() {
        let mut list = list(&["a", "b", "c"]);
        assert_eq!(list.get_next().and_then(|t| t.id.as_deref()), Some("a"));

        assert!(list.advance(false));
        assert_eq!(current_id(&list), Some("a"));
        assert!(list.advance(true));
        assert!(list.advance(false));
        assert_eq!(current_id(&list), Some("c"));
        assert!(!list.advance(false));
        assert!(list.get_next().is_none());

        assert!(list.back());
        assert_eq!(current_id(&list), Some("b"));
    }

    #[test]
    fn test_repeat_modes() {
        let mut list = list(&["a", "b"]);
        list.set_current_by_idx(1);

        list.set_mode(PlayMode::RepeatAll);
        assert_eq!(list.get_next().and_then(|t| t.id.as_deref()), Some("a"));

        list.set_mode(PlayMode::RepeatOne);
        assert_eq!(list.get_next().and_then(|t| t.id.as_deref()), Some("b"));
        assert!(list.advance(false));
        assert_eq!(current_id(&list), Some("b"));
        // Explicit advance ignores repeat-one
        assert!(!list.advance(true));

        list.set_mode(PlayMode::RepeatAll);
        list.set_current_by_idx(0);
        assert!(list.back());
        assert_eq!(current_id(&list), Some("b"));
    }

    #[test]
    fn test_shuffle_visits_every_track_once() {
        let mut list = list(&["a", "b", "c", "d", "e"]);
        list.set_current_by_idx(2);
        list.set_mode(PlayMode::Shuffle);

        let first_next = list.get_next().cloned();
        assert_eq!(list.get_next().cloned(), first_next);

        let mut seen = vec![current_id(&list).unwrap().to_string()];
        while list.advance(false) {
            seen.push(current_id(&list).unwrap().to_string());
        }
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_splice_adjusts_cursor() {
        let mut list = list(&["a", "b", "c"]);
        list.set_current_by_id("c");
        list.take_changes();

        list.splice(0, 1, vec![track("x", 10), track("y", 10)], Some("remote-1"));
        assert_eq!(current_id(&list), Some("c"));
        assert_eq!(list.current_index(), Some(3));

        let changes = list.take_changes();
        assert!(changes.contains(&TracklistChange::Spliced {
            idx: 0,
            delete_count: 1,
            inserted: 2,
            source_client_id: Some("remote-1".to_string()),
        }));

        list.splice(3, 5, Vec::new(), None);
        assert_eq!(list.current_index(), None);
        assert_eq!(list.len(), 3);
        assert!(list.take_changes().contains(&TracklistChange::CurrentChanged(None)));
    }

    #[test]
    fn test_set_current_out_of_range() {
        let mut list = list(&["a"]);
        assert!(!list.set_current_by_idx(3));
        assert!(!list.set_current_by_id("zz"));
        assert!(list.set_current_by_id("a"));
    }

    #[test]
    fn test_get_times() {
        let mut list = Tracklist::from_tracks(vec![track("a", 60), track("b", 100), track("c", 40)]);
        list.set_current_by_idx(1);

        let times = list.get_times(Duration::from_secs(25));
        assert_eq!(times.absolute, Some(Duration::from_secs(85)));
        assert_eq!(times.remaining, Some(Duration::from_secs(75)));
        assert_eq!(times.remaining_absolute, Some(Duration::from_secs(115)));
        assert_eq!(times.percentage, Some(0.25));

        let current = times.with_time(Duration::from_secs(25));
        assert_eq!(current.time, Duration::from_secs(25));
    }

    #[test]
    fn test_get_times_unknown_duration() {
        let mut list = Tracklist::from_tracks(vec![Track::new("a"), track("b", 100)]);
        list.set_current_by_idx(1);

        let times = list.get_times(Duration::from_secs(10));
        assert_eq!(times.absolute, None);
        assert_eq!(times.remaining, Some(Duration::from_secs(90)));
        assert_eq!(times.remaining_absolute, Some(Duration::from_secs(90)));
    }
}
