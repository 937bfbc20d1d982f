//! # osu!music
//!
//! Command-line shell over the osu! library reader.
//!
//! ## Usage
//!
//! ```bash
//! # List mania songs
//! osumusic list
//!
//! # Search every mode's songs for an artist
//! osumusic list --mode osu --search "camellia"
//!
//! # Drive the bridge from a front end
//! osumusic bridge
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use path_absolutize::Absolutize;
use std::io::{self, Write};

use osumusic::assets::ContentStore;
use osumusic::bridge::{Bridge, Opener, SystemOpener};
use osumusic::browser::{format_time, Browser};
use osumusic::cli::{self, Command};
use osumusic::config::RuntimeConfig;
use osumusic::model::{BeatmapSet, Ruleset};
use osumusic::scheme::{self, AssetScheme};
use osumusic::{completion, db, links};

/// Main entry point.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug osumusic list` - Enable debug logging
/// - `RUST_LOG=osumusic::db=trace osumusic bridge` - Module-specific logging
///
/// Logs always go to stderr, so `bridge` and `asset` output stays clean.
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config = runtime_config(&args)?;
    debug!("Runtime config: {config:?}");

    match args.command {
        Command::List { mode, search, json } => {
            let mut browser = Browser::new(load_library(&config));
            browser.set_mode(mode.into());
            if let Some(query) = search {
                browser.set_query(query);
            }
            let visible = browser.visible();

            if json {
                serde_json::to_writer_pretty(io::stdout().lock(), &visible)
                    .context("Failed to write library as JSON")?;
                println!();
            } else {
                for set in &visible {
                    print_set_line(set, browser.mode());
                }
                info!("{} sets shown", visible.len());
            }
        }
        Command::Show { set_id, mode } => {
            let mut browser = Browser::new(load_library(&config));
            browser.set_mode(mode.into());
            browser.select_set(&set_id);
            let set = browser
                .selected_set()
                .ok_or_else(|| anyhow!("No beatmap set with id '{set_id}'"))?;

            println!("{}", set.display_name());
            if set.cover_path.is_empty() {
                println!("  cover: (none)");
            } else {
                println!("  cover: {}", scheme::asset_url(&set.cover_path));
            }
            for map in browser.difficulties() {
                println!(
                    "  {:>5.2}★  {:<24} {:>3.0} BPM  {}  by {}",
                    map.star_rating,
                    map.difficulty,
                    map.bpm,
                    format_time(map.total_length),
                    map.mapper
                );
                println!("         {}", links::mapper_link(set, map));
            }
        }
        Command::Bridge => {
            let bridge = Bridge::new(db::open_library(&config));
            info!("Bridge ready");
            let result = bridge.serve(io::stdin().lock(), io::stdout().lock());
            bridge.shutdown();
            result.context("Bridge I/O failed")?;
        }
        Command::Asset { url } => {
            let scheme = asset_scheme(&config);
            debug!("Fetching {url} (confined: {})", scheme.is_confined());
            let bytes = scheme.fetch(&url)?;
            let mut out = io::stdout().lock();
            out.write_all(&bytes).context("Failed to write asset to stdout")?;
            out.flush()?;
        }
        Command::Url { path } => {
            let path = path
                .absolutize()
                .with_context(|| format!("Cannot make {} absolute", path.display()))?;
            println!("{}", scheme::asset_url(&path));
        }
        Command::Open { set_id, client } => {
            let mut browser = Browser::new(load_library(&config));
            browser.select_set(&set_id);
            let set = browser
                .selected_set()
                .ok_or_else(|| anyhow!("No beatmap set with id '{set_id}'"))?;
            let map = browser
                .selected_beatmap()
                .ok_or_else(|| anyhow!("Set '{set_id}' has no difficulties"))?;

            let url = if client {
                if map.online_id <= 0 {
                    return Err(anyhow!("'{}' is not submitted; it has no client link", map.difficulty));
                }
                links::client_uri(map.online_id)
            } else {
                links::mapper_link(set, map)
            };
            SystemOpener
                .open(&url)
                .with_context(|| format!("Failed to open {url}"))?;
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(
                completion::shell_to_completion_shell(&shell),
                &mut cmd,
                &mut io::stdout(),
            );
        }
    }

    Ok(())
}

/// Merge CLI flags (and their environment fallbacks) over the defaults.
fn runtime_config(args: &cli::Args) -> Result<RuntimeConfig> {
    let config = match &args.osu_dir {
        Some(dir) => RuntimeConfig::with_osu_dir(dir),
        None => RuntimeConfig::new()?,
    };
    Ok(config
        .database_file(args.database.clone())
        .confine_assets(args.confine_assets))
}

fn load_library(config: &RuntimeConfig) -> Vec<BeatmapSet> {
    let bridge = Bridge::new(db::open_library(config));
    let sets = bridge.get_beatmaps();
    bridge.shutdown();
    sets
}

fn asset_scheme(config: &RuntimeConfig) -> AssetScheme {
    if config.confine_assets {
        AssetScheme::confined(&ContentStore::new(config.osu_dir()))
    } else {
        AssetScheme::unrestricted()
    }
}

fn print_set_line(set: &BeatmapSet, mode: Ruleset) {
    let stars: Vec<f64> = set
        .beatmaps
        .iter()
        .filter(|b| b.is_mode(mode))
        .map(|b| b.star_rating)
        .collect();
    let low = stars.iter().copied().fold(f64::INFINITY, f64::min);
    let high = stars.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let audio = if set.beatmaps.iter().any(|b| b.has_audio()) { "" } else { "  (no audio)" };

    println!(
        "{}  {}  [{} {}, {:.2}-{:.2}★]{}",
        set.id,
        set.display_name(),
        stars.len(),
        mode,
        low,
        high,
        audio
    );
}
