//! Selection, search and mode state behind the song list.
//!
//! This is the part of the player that does not care how it is drawn: which
//! sets are visible for the current mode and search, which set and
//! difficulty are selected, and whether a selection change means the audio
//! must change.

use log::trace;

use crate::model::{Beatmap, BeatmapSet, Ruleset};

/// What the audio output should do after a selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    /// Keep playing whatever is playing.
    Unchanged,
    /// Stop and start this file.
    Start(String),
    /// Stop; the new selection has no audio.
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct Browser {
    sets: Vec<BeatmapSet>,
    mode: Ruleset,
    query: String,
    selected_set: Option<String>,
    selected_map: Option<String>,
}

impl Browser {
    pub fn new(sets: Vec<BeatmapSet>) -> Self {
        Self {
            sets,
            ..Default::default()
        }
    }

    pub fn sets(&self) -> &[BeatmapSet] {
        &self.sets
    }

    pub fn mode(&self) -> Ruleset {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Ruleset) {
        self.mode = mode;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Sets that have a difficulty in the current mode and match the search.
    ///
    /// The search is a case-insensitive substring test against title, artist
    /// (romanised and unicode) and every difficulty's mapper.
    pub fn visible(&self) -> Vec<&BeatmapSet> {
        let query = self.query.trim().to_lowercase();
        self.sets
            .iter()
            .filter(|set| set.has_mode(self.mode))
            .filter(|set| query.is_empty() || matches_query(set, &query))
            .collect()
    }

    pub fn selected_set(&self) -> Option<&BeatmapSet> {
        let id = self.selected_set.as_deref()?;
        self.sets.iter().find(|s| s.id == id)
    }

    pub fn selected_beatmap(&self) -> Option<&Beatmap> {
        let id = self.selected_map.as_deref()?;
        self.selected_set()?.beatmap(id)
    }

    /// Difficulty picker contents: the selected set's difficulties in the
    /// current mode, easiest first.
    pub fn difficulties(&self) -> Vec<&Beatmap> {
        self.selected_set()
            .map(|set| by_stars(set.beatmaps.iter().filter(|b| b.is_mode(self.mode))))
            .unwrap_or_default()
    }

    /// Select a set by id. Selecting the already selected set changes
    /// nothing; otherwise the search is cleared and the easiest difficulty of
    /// the current mode (or of the whole set, if it has none) is selected.
    pub fn select_set(&mut self, id: &str) -> Playback {
        if self.selected_set.as_deref() == Some(id) {
            return Playback::Unchanged;
        }
        let Some(set) = self.sets.iter().find(|s| s.id == id) else {
            return Playback::Unchanged;
        };

        let in_mode: Vec<&Beatmap> = set.beatmaps.iter().filter(|b| b.is_mode(self.mode)).collect();
        let candidates = if in_mode.is_empty() {
            by_stars(set.beatmaps.iter())
        } else {
            by_stars(in_mode.into_iter())
        };
        let first = candidates.first().map(|b| b.id.clone());

        let playing = self.playing_audio();
        trace!("Selecting set {id}");
        self.selected_set = Some(id.to_string());
        self.query.clear();
        match first {
            Some(map_id) => self.switch_to(&map_id, playing),
            None => Playback::Unchanged,
        }
    }

    /// Select a difficulty of the selected set. Audio only changes when the
    /// new difficulty uses a different file than the current one.
    pub fn select_beatmap(&mut self, id: &str) -> Playback {
        let playing = self.playing_audio();
        self.switch_to(id, playing)
    }

    /// Audio path of the current difficulty, whichever set it belongs to.
    fn playing_audio(&self) -> Option<String> {
        self.selected_beatmap().map(|b| b.audio_path.clone())
    }

    fn switch_to(&mut self, id: &str, playing: Option<String>) -> Playback {
        let Some(next) = self.selected_set().and_then(|s| s.beatmap(id)) else {
            return Playback::Unchanged;
        };
        let audio = next.audio_path.clone();
        self.selected_map = Some(id.to_string());

        if playing.as_deref() == Some(audio.as_str()) {
            Playback::Unchanged
        } else if audio.is_empty() {
            Playback::Stop
        } else {
            Playback::Start(audio)
        }
    }

    /// Select the first set of the current mode if nothing is selected yet.
    pub fn ensure_selection(&mut self) -> Playback {
        if self.selected_set.is_some() {
            return Playback::Unchanged;
        }
        let first = self
            .sets
            .iter()
            .find(|s| s.has_mode(self.mode))
            .map(|s| s.id.clone());
        match first {
            Some(id) => self.select_set(&id),
            None => Playback::Unchanged,
        }
    }

    /// Move to the next visible set, wrapping at the end. `None` when
    /// nothing is visible.
    pub fn next(&mut self) -> Option<Playback> {
        let target = {
            let visible = self.visible();
            if visible.is_empty() {
                return None;
            }
            let next = match self.position_in(&visible) {
                Some(i) => (i + 1) % visible.len(),
                None => 0,
            };
            visible[next].id.clone()
        };
        Some(self.select_set(&target))
    }

    /// Move to the previous visible set, wrapping at the start. With no
    /// visible selection this goes to the last set.
    pub fn previous(&mut self) -> Option<Playback> {
        let target = {
            let visible = self.visible();
            if visible.is_empty() {
                return None;
            }
            let previous = match self.position_in(&visible) {
                Some(0) | None => visible.len() - 1,
                Some(i) => i - 1,
            };
            visible[previous].id.clone()
        };
        Some(self.select_set(&target))
    }

    fn position_in(&self, visible: &[&BeatmapSet]) -> Option<usize> {
        let id = self.selected_set.as_deref()?;
        visible.iter().position(|s| s.id == id)
    }
}

fn matches_query(set: &BeatmapSet, query: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(query);
    hit(&set.title)
        || hit(&set.unicode_title)
        || hit(&set.artist)
        || hit(&set.unicode_artist)
        || set.beatmaps.iter().any(|b| hit(&b.mapper))
}

fn by_stars<'a>(maps: impl Iterator<Item = &'a Beatmap>) -> Vec<&'a Beatmap> {
    let mut maps: Vec<&Beatmap> = maps.collect();
    maps.sort_by(|a, b| a.star_rating.total_cmp(&b.star_rating));
    maps
}

/// `m:ss` for a position in milliseconds.
pub fn format_time(ms: f64) -> String {
    let seconds = if ms.is_finite() && ms > 0.0 {
        (ms / 1000.0).floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
