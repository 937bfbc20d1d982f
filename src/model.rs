//! View model handed to presentation code.
//!
//! These are flat, owned projections of the client's records. They are
//! rebuilt on every query and never written back. Field names on the wire are
//! camelCase so a web front end can consume the bridge output as is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Game mode a difficulty is authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ruleset {
    Osu = 0,
    Taiko = 1,
    Catch = 2,
    #[default]
    Mania = 3,
}

impl Ruleset {
    pub const ALL: [Ruleset; 4] = [Ruleset::Osu, Ruleset::Taiko, Ruleset::Catch, Ruleset::Mania];

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Self::Osu),
            1 => Some(Self::Taiko),
            2 => Some(Self::Catch),
            3 => Some(Self::Mania),
            _ => None,
        }
    }

    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Osu => "osu!",
            Self::Taiko => "taiko",
            Self::Catch => "catch",
            Self::Mania => "mania",
        }
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named pointer from a set to a blob in the content store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileUsage {
    pub filename: String,
    pub hash: String,
}

/// One difficulty within a set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beatmap {
    pub id: String,
    pub difficulty: String,
    pub star_rating: f64,
    pub bpm: f64,
    /// Milliseconds
    pub total_length: f64,
    #[serde(rename = "cs")]
    pub circle_size: f64,
    #[serde(rename = "ar")]
    pub approach_rate: f64,
    #[serde(rename = "od")]
    pub overall_difficulty: f64,
    #[serde(rename = "hp")]
    pub drain_rate: f64,
    pub audio_hash: String,
    pub audio_path: String,
    pub background_path: String,
    pub mapper: String,
    pub online_id: i64,
    pub ruleset_id: i64,
}

impl Beatmap {
    /// `None` for ruleset ids outside the four built-in modes.
    pub fn ruleset(&self) -> Option<Ruleset> {
        Ruleset::from_id(self.ruleset_id)
    }

    pub fn is_mode(&self, mode: Ruleset) -> bool {
        self.ruleset_id == mode.id()
    }

    pub fn has_audio(&self) -> bool {
        !self.audio_path.is_empty()
    }
}

/// A release: one song with one or more difficulties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatmapSet {
    pub id: String,
    pub online_id: i64,
    pub title: String,
    pub unicode_title: String,
    pub artist: String,
    pub unicode_artist: String,
    pub cover_path: String,
    pub status: i64,
    pub beatmaps: Vec<Beatmap>,
    pub files: Vec<FileUsage>,
}

impl BeatmapSet {
    pub fn has_mode(&self, mode: Ruleset) -> bool {
        self.beatmaps.iter().any(|b| b.is_mode(mode))
    }

    pub fn beatmap(&self, id: &str) -> Option<&Beatmap> {
        self.beatmaps.iter().find(|b| b.id == id)
    }

    /// "Artist - Title", the form used for display and web search.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruleset_ids() {
        for mode in Ruleset::ALL {
            assert_eq!(Ruleset::from_id(mode.id()), Some(mode));
        }
        assert_eq!(Ruleset::from_id(4), None);
        assert_eq!(Ruleset::from_id(-1), None);
        assert_eq!(Ruleset::default(), Ruleset::Mania);
    }

    #[test]
    fn test_beatmap_serializes_camel_case() {
        let map = Beatmap {
            star_rating: 4.2,
            ruleset_id: 3,
            circle_size: 4.0,
            ..Default::default()
        };
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["starRating"], 4.2);
        assert_eq!(json["rulesetId"], 3);
        assert_eq!(json["cs"], 4.0);
        assert!(json.get("audioPath").is_some());
    }

    #[test]
    fn test_set_mode_lookup() {
        let set = BeatmapSet {
            artist: "Artist B".into(),
            title: "Title A".into(),
            beatmaps: vec![Beatmap { id: "m1".into(), ruleset_id: 1, ..Default::default() }],
            ..Default::default()
        };
        assert!(set.has_mode(Ruleset::Taiko));
        assert!(!set.has_mode(Ruleset::Osu));
        assert!(set.beatmap("m1").is_some());
        assert_eq!(set.display_name(), "Artist B - Title A");
    }
}
