//! # Integration Tests for osumusic
//!
//! End-to-end checks from a document store on disk through the reader, the
//! bridge and the asset scheme, plus a few CLI smoke tests.

use anyhow::Result;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use osumusic::assets::ContentStore;
use osumusic::bridge::{Bridge, Opener};
use osumusic::config::RuntimeConfig;
use osumusic::db::{self, LibraryReader};
use osumusic::error::LibraryError;
use osumusic::scheme::{asset_url, AssetScheme};

const AUDIO_HASH: &str = "abcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890";
const BG_HASH: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// A set record shaped like the osu! client's, with every link inlined.
fn set_record(id: &str, title: &str, author: Value) -> Value {
    json!({
        "ID": id,
        "OnlineID": 1001,
        "Status": 1,
        "DeletePending": false,
        "Beatmaps": [
            {
                "ID": format!("{id}-hard"),
                "DifficultyName": "Hard",
                "StarRating": 4.2,
                "BPM": 174.0,
                "TotalLength": 120000.0,
                "OnlineID": 2002,
                "Ruleset": { "OnlineID": 3, "ShortName": "mania" },
                "BaseDifficulty": {
                    "CircleSize": 7.0,
                    "ApproachRate": 5.0,
                    "OverallDifficulty": 8.0,
                    "DrainRate": 7.5
                },
                "Metadata": {
                    "Title": title,
                    "TitleUnicode": title,
                    "Artist": "Artist B",
                    "ArtistUnicode": "Artist B",
                    "AudioFile": "audio.mp3",
                    "BackgroundFile": "bg.jpg",
                    "Author": author
                }
            },
            {
                "ID": format!("{id}-easy"),
                "DifficultyName": "Easy",
                "StarRating": 1.5,
                "RulesetID": 0,
                "Metadata": { "Title": "ignored", "Author": "someone else" }
            }
        ],
        "Files": [
            { "Filename": "audio.mp3", "File": { "Hash": AUDIO_HASH } },
            { "Filename": "bg.jpg", "File": { "Hash": BG_HASH } }
        ]
    })
}

/// Create `<dir>/client.realm.sqlite` holding the given records.
fn create_test_store(dir: &Path, records: &[(&str, String)]) -> Result<PathBuf> {
    let db_path = dir.join("client.realm.sqlite");
    let conn = rusqlite::Connection::open(&db_path)?;
    conn.execute(
        "CREATE TABLE objects (class TEXT NOT NULL, body TEXT NOT NULL)",
        [],
    )?;
    for (class, body) in records {
        conn.execute(
            "INSERT INTO objects (class, body) VALUES (?1, ?2)",
            (class, body),
        )?;
    }
    Ok(db_path)
}

fn open_reader(dir: &TempDir) -> LibraryReader {
    let mut reader = db::open_library(&RuntimeConfig::with_osu_dir(dir.path()));
    assert!(reader.is_open());
    reader.open().expect("second open is a no-op");
    reader
}

#[cfg(test)]
mod library_tests {
    use super::*;

    #[test]
    fn test_known_record_flattens() -> Result<()> {
        let dir = TempDir::new()?;
        create_test_store(
            dir.path(),
            &[("BeatmapSet", set_record("set-1", "Title A", json!({ "Username": "mapper1" })).to_string())],
        )?;

        let reader = open_reader(&dir);
        let sets = reader.beatmap_sets()?;
        assert_eq!(sets.len(), 1);

        let set = &sets[0];
        assert_eq!(set.title, "Title A");
        assert_eq!(set.beatmaps.len(), 2);
        let hard = &set.beatmaps[0];
        assert_eq!(hard.star_rating, 4.2);
        assert_eq!(hard.ruleset_id, 3);
        assert_eq!(hard.mapper, "mapper1");

        let expected = dir
            .path()
            .join("files")
            .join("a")
            .join("ab")
            .join(AUDIO_HASH);
        assert_eq!(PathBuf::from(&hard.audio_path), expected);

        // set-level metadata and assets apply to every difficulty
        let easy = &set.beatmaps[1];
        assert_eq!(easy.audio_path, hard.audio_path);
        assert_eq!(easy.ruleset_id, 0);
        assert_eq!(easy.mapper, "someone else");
        assert_eq!(easy.bpm, 0.0);
        Ok(())
    }

    #[test]
    fn test_every_set_has_a_beatmap() -> Result<()> {
        let dir = TempDir::new()?;
        let mut deleted = set_record("deleted", "Gone", json!("x"));
        deleted["DeletePending"] = json!(true);
        let mut empty = set_record("empty", "Nothing", json!("x"));
        empty["Beatmaps"] = json!([]);

        create_test_store(
            dir.path(),
            &[
                ("BeatmapSet", set_record("a", "One", json!("x")).to_string()),
                ("BeatmapSet", deleted.to_string()),
                ("BeatmapSet", empty.to_string()),
                ("BeatmapSet", "{ truncated".to_string()),
                ("Beatmap", json!({ "ID": "stray" }).to_string()),
                ("BeatmapSet", set_record("b", "Two", json!("x")).to_string()),
            ],
        )?;

        let sets = open_reader(&dir).beatmap_sets()?;
        let ids: Vec<_> = sets.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(sets.iter().all(|s| !s.beatmaps.is_empty()));
        Ok(())
    }

    #[test]
    fn test_unmatched_audio_is_empty_path() -> Result<()> {
        let dir = TempDir::new()?;
        let mut record = set_record("set", "Title", json!("x"));
        record["Files"] = json!([{ "Filename": "other.ogg", "File": { "Hash": AUDIO_HASH } }]);
        create_test_store(dir.path(), &[("BeatmapSet", record.to_string())])?;

        let sets = open_reader(&dir).beatmap_sets()?;
        assert_eq!(sets[0].beatmaps[0].audio_path, "");
        assert_eq!(sets[0].cover_path, "");
        Ok(())
    }

    #[test]
    fn test_bare_and_structured_author_agree() -> Result<()> {
        let dir = TempDir::new()?;
        create_test_store(
            dir.path(),
            &[
                ("BeatmapSet", set_record("s", "T", json!({ "Username": "Shima Rin" })).to_string()),
                ("BeatmapSet", set_record("b", "T", json!("Shima Rin")).to_string()),
            ],
        )?;

        let sets = open_reader(&dir).beatmap_sets()?;
        assert_eq!(sets[0].beatmaps[0].mapper, sets[1].beatmaps[0].mapper);
        Ok(())
    }

    #[test]
    fn test_empty_store_lists_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        create_test_store(dir.path(), &[])?;
        assert!(open_reader(&dir).beatmap_sets()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_not_open_then_open() -> Result<()> {
        let dir = TempDir::new()?;
        let path = create_test_store(dir.path(), &[])?;
        let mut reader = LibraryReader::new(&path, ContentStore::new(dir.path()));
        assert!(matches!(reader.beatmap_sets(), Err(LibraryError::NotOpen)));
        reader.open()?;
        assert!(reader.beatmap_sets()?.is_empty());
        Ok(())
    }
}

#[cfg(test)]
mod bridge_tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Opener for &Recorder {
        fn open(&self, url: &str) -> io::Result<()> {
            self.0.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_bridge_session() -> Result<()> {
        let dir = TempDir::new()?;
        create_test_store(
            dir.path(),
            &[("BeatmapSet", set_record("set-1", "Title A", json!("m")).to_string())],
        )?;
        let recorder = Recorder::default();
        let bridge = Bridge::with_opener(open_reader(&dir), &recorder);

        let input = concat!(
            r#"{"id":1,"op":"get-beatmaps"}"#,
            "\n",
            r#"{"id":2,"op":"open-external","url":"https://osu.ppy.sh/b/2002"}"#,
            "\n",
        );
        let mut output = Vec::new();
        bridge.serve(input.as_bytes(), &mut output)?;

        let replies: Vec<Value> = String::from_utf8(output)?
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["result"][0]["title"], "Title A");
        assert_eq!(replies[0]["result"][0]["beatmaps"][0]["starRating"], 4.2);
        assert_eq!(replies[1]["id"], 2);
        assert_eq!(*recorder.0.lock().unwrap(), vec!["https://osu.ppy.sh/b/2002"]);

        bridge.shutdown();
        assert!(bridge.get_beatmaps().is_empty());
        Ok(())
    }

    #[test]
    fn test_bridge_without_database_returns_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let bridge = Bridge::new(db::open_library(&RuntimeConfig::with_osu_dir(dir.path())));
        assert!(bridge.get_beatmaps().is_empty());
        Ok(())
    }
}

#[cfg(test)]
mod asset_tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolved_audio_is_servable() -> Result<()> {
        let dir = TempDir::new()?;
        create_test_store(
            dir.path(),
            &[("BeatmapSet", set_record("set-1", "Title A", json!("m")).to_string())],
        )?;
        let blob = dir.path().join("files/a/ab").join(AUDIO_HASH);
        fs::create_dir_all(blob.parent().unwrap())?;
        fs::write(&blob, b"ID3 fake mp3")?;

        let sets = open_reader(&dir).beatmap_sets()?;
        let url = asset_url(&sets[0].beatmaps[0].audio_path);

        let store = ContentStore::new(dir.path());
        assert_eq!(AssetScheme::confined(&store).fetch(&url)?, b"ID3 fake mp3");
        assert_eq!(AssetScheme::unrestricted().fetch(&url)?, b"ID3 fake mp3");

        let outside = asset_url(dir.path().join("client.realm.sqlite"));
        assert!(AssetScheme::confined(&store).fetch(&outside).is_err());
        assert!(AssetScheme::unrestricted().fetch(&outside).is_ok());
        Ok(())
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn osumusic() -> Command {
        Command::new(env!("CARGO_BIN_EXE_osumusic"))
    }

    #[test]
    fn test_cli_help_displays_correctly() {
        let output = osumusic().arg("--help").output().expect("Failed to run help command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("osumusic"));
        assert!(stdout.contains("list"));
        assert!(stdout.contains("bridge"));
        assert!(stdout.contains("asset"));
    }

    #[test]
    fn test_list_json_against_store() -> Result<()> {
        let dir = TempDir::new()?;
        create_test_store(
            dir.path(),
            &[("BeatmapSet", set_record("set-1", "Title A", json!("m")).to_string())],
        )?;

        let output = osumusic()
            .args(["list", "--json", "--mode", "mania", "--osu-dir"])
            .arg(dir.path())
            .output()?;
        assert!(output.status.success());

        let listed: Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(listed[0]["id"], "set-1");
        Ok(())
    }

    #[test]
    fn test_list_without_database_is_empty_not_fatal() -> Result<()> {
        let dir = TempDir::new()?;
        let output = osumusic()
            .args(["list", "--osu-dir"])
            .arg(dir.path())
            .output()?;
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
        Ok(())
    }
}
