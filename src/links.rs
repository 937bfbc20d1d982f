//! External link targets for a selected difficulty.

use crate::model::{Beatmap, BeatmapSet};

const WEB_BASE: &str = "https://osu.ppy.sh";

/// Web page of a submitted difficulty.
pub fn beatmap_page(online_id: i64) -> String {
    format!("{WEB_BASE}/b/{online_id}")
}

/// Web search for "artist - title", used for unsubmitted maps.
pub fn search_page(artist: &str, title: &str) -> String {
    let query = format!("{artist} - {title}");
    format!("{WEB_BASE}/beatmapsets?q={}", urlencoding::encode(&query))
}

/// URI handled by an installed osu! client.
pub fn client_uri(online_id: i64) -> String {
    format!("osu://b/{online_id}")
}

/// Where clicking the mapper of `map` leads: its web page when it has an
/// online id, otherwise a search for the set.
pub fn mapper_link(set: &BeatmapSet, map: &Beatmap) -> String {
    if map.online_id > 0 {
        beatmap_page(map.online_id)
    } else {
        search_page(&set.artist, &set.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates() {
        assert_eq!(beatmap_page(129891), "https://osu.ppy.sh/b/129891");
        assert_eq!(client_uri(129891), "osu://b/129891");
        assert_eq!(
            search_page("Camellia", "Exit This Earth's Atomosphere"),
            "https://osu.ppy.sh/beatmapsets?q=Camellia%20-%20Exit%20This%20Earth%27s%20Atomosphere"
        );
    }

    #[test]
    fn test_mapper_link_falls_back_to_search() {
        let set = BeatmapSet {
            artist: "A".into(),
            title: "T".into(),
            ..Default::default()
        };
        let submitted = Beatmap { online_id: 42, ..Default::default() };
        let local = Beatmap { online_id: -1, ..Default::default() };
        assert_eq!(mapper_link(&set, &submitted), "https://osu.ppy.sh/b/42");
        assert_eq!(mapper_link(&set, &local), "https://osu.ppy.sh/beatmapsets?q=A%20-%20T");
    }
}
