//! Flattening of the client's raw records into the view model.
//!
//! The client's schema is not ours and drifts between releases, so every read
//! goes through [`RecordExt`]: a missing, null, or wrongly typed field becomes
//! the field's default instead of an error. One malformed set therefore costs
//! at most its own fields, never the listing.

use serde_json::Value;

use crate::assets::ContentStore;
use crate::model::{Beatmap, BeatmapSet, FileUsage};

/// Mapper name used when a difficulty records no author at all.
pub const UNKNOWN_MAPPER: &str = "Unknown";

/// Defensive accessors over a semi-structured record.
pub trait RecordExt {
    /// Field value, treating JSON `null` as absent.
    fn field(&self, key: &str) -> Option<&Value>;

    /// Non-empty string field. Numbers are rendered so ids survive a
    /// schema that stores them numerically.
    fn text(&self, key: &str) -> Option<String>;

    fn str_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }

    fn f64_or(&self, key: &str, default: f64) -> f64;

    /// Integer field; floats are truncated.
    fn integer(&self, key: &str) -> Option<i64>;

    fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.integer(key).unwrap_or(default)
    }

    /// Array field, empty when absent or not an array.
    fn items(&self, key: &str) -> &[Value];
}

impl RecordExt for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.field(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.field(key).and_then(Value::as_f64).unwrap_or(default)
    }

    fn integer(&self, key: &str) -> Option<i64> {
        self.field(key)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
    }

    fn items(&self, key: &str) -> &[Value] {
        self.field(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Mapper name of a difficulty's metadata. `Author` is either a user record
/// with a `Username` or, in older schemas, a bare string; the structured form
/// wins when both could apply.
pub fn mapper_name(metadata: Option<&Value>) -> String {
    let Some(author) = metadata.and_then(|m| m.field("Author")) else {
        return UNKNOWN_MAPPER.to_string();
    };

    match author {
        Value::Object(_) => author.str_or("Username", UNKNOWN_MAPPER),
        Value::String(name) if !name.is_empty() => name.clone(),
        _ => UNKNOWN_MAPPER.to_string(),
    }
}

/// Ruleset of a difficulty: the linked ruleset's online id, else the local
/// `RulesetID`, else 0.
pub fn ruleset_id(beatmap: &Value) -> i64 {
    beatmap
        .field("Ruleset")
        .and_then(|ruleset| ruleset.integer("OnlineID"))
        .or_else(|| beatmap.integer("RulesetID"))
        .unwrap_or(0)
}

/// Hash of the first file-usage entry named `filename`.
pub fn find_hash(files: &[Value], filename: Option<&str>) -> Option<String> {
    let filename = filename?;
    files
        .iter()
        .find(|usage| usage.text("Filename").as_deref() == Some(filename))
        .and_then(|usage| usage.field("File"))
        .and_then(|file| file.text("Hash"))
}

/// Flatten one set record. Returns `None` for a set without difficulties.
///
/// Title, artist and asset names are read from the first difficulty's
/// metadata and applied to the whole set.
pub fn flatten_set(set: &Value, store: &ContentStore) -> Option<BeatmapSet> {
    let beatmaps = set.items("Beatmaps");
    let first = beatmaps.first()?;
    let metadata = first.field("Metadata").cloned().unwrap_or(Value::Null);
    let files = set.items("Files");

    let audio_hash = find_hash(files, metadata.text("AudioFile").as_deref());
    let background_hash = find_hash(files, metadata.text("BackgroundFile").as_deref());
    let audio_path = store.resolve(audio_hash.as_deref());
    let background_path = store.resolve(background_hash.as_deref());

    let title = metadata.str_or("Title", "");
    let artist = metadata.str_or("Artist", "");

    Some(BeatmapSet {
        id: set.str_or("ID", ""),
        online_id: set.i64_or("OnlineID", 0),
        unicode_title: metadata.str_or("TitleUnicode", &title),
        unicode_artist: metadata.str_or("ArtistUnicode", &artist),
        title,
        artist,
        cover_path: background_path.clone(),
        status: set.i64_or("Status", 0),
        beatmaps: beatmaps
            .iter()
            .map(|b| Beatmap {
                id: b.str_or("ID", ""),
                difficulty: b.str_or("DifficultyName", ""),
                star_rating: b.f64_or("StarRating", 0.0),
                bpm: b.f64_or("BPM", 0.0),
                total_length: b.f64_or("TotalLength", 0.0),
                circle_size: stat(b, "CircleSize"),
                approach_rate: stat(b, "ApproachRate"),
                overall_difficulty: stat(b, "OverallDifficulty"),
                drain_rate: stat(b, "DrainRate"),
                audio_hash: audio_hash.clone().unwrap_or_default(),
                audio_path: audio_path.clone(),
                background_path: background_path.clone(),
                mapper: mapper_name(b.field("Metadata")),
                online_id: b.i64_or("OnlineID", 0),
                ruleset_id: ruleset_id(b),
            })
            .collect(),
        files: files
            .iter()
            .map(|usage| FileUsage {
                filename: usage.str_or("Filename", ""),
                hash: usage
                    .field("File")
                    .map(|file| file.str_or("Hash", ""))
                    .unwrap_or_default(),
            })
            .collect(),
    })
}

fn stat(beatmap: &Value, key: &str) -> f64 {
    beatmap
        .field("BaseDifficulty")
        .map(|d| d.f64_or(key, 0.0))
        .unwrap_or(0.0)
}
