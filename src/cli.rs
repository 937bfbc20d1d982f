//! # Command-Line Interface Module
//!
//! Defines the osumusic command line with Clap derive macros.
//!
//! ## Commands
//!
//! - `list`: Print the library, optionally filtered by mode and search
//! - `show`: Difficulties and links of one set
//! - `bridge`: Serve the JSON-lines bridge on stdin/stdout
//! - `asset`: Write the bytes behind an `osumusic://` URL to stdout
//! - `url`: Build an `osumusic://` URL for a file
//! - `open`: Open a set's page in the browser or the osu! client
//!
//! ## Examples
//!
//! ```bash
//! osumusic list --mode mania --search camellia
//! osumusic bridge < requests.jsonl
//! osumusic --confine-assets asset "osumusic://%2Fhome%2Fme%2F.local%2Fshare%2Fosu%2Ffiles%2Fa%2Fab%2Fabc"
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::model::Ruleset;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Game modes as accepted on the command line
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Mode {
    Osu,
    Taiko,
    Catch,
    Mania,
}

impl From<Mode> for Ruleset {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Osu => Ruleset::Osu,
            Mode::Taiko => Ruleset::Taiko,
            Mode::Catch => Ruleset::Catch,
            Mode::Mania => Ruleset::Mania,
        }
    }
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "osumusic")]
#[command(about = "osu!music: browse and play the songs of a local osu! library")]
#[command(version)]
pub struct Args {
    /// osu! data directory (defaults to the platform data dir + "osu")
    #[arg(long, global = true, env = "OSUMUSIC_OSU_DIR", value_hint = clap::ValueHint::DirPath)]
    pub osu_dir: Option<PathBuf>,

    /// Database file to read instead of <osu-dir>/client.realm.sqlite
    #[arg(long, global = true, env = "OSUMUSIC_DATABASE", value_hint = clap::ValueHint::FilePath)]
    pub database: Option<PathBuf>,

    /// Only serve assets that live inside <osu-dir>/files
    #[arg(long, global = true)]
    pub confine_assets: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the songs in the osu! library
    ///
    /// Only sets with at least one difficulty in the chosen mode are shown.
    /// The search matches title, artist and mapper, case-insensitively.
    List {
        /// Game mode to list
        #[arg(long, value_enum, default_value = "mania")]
        mode: Mode,

        /// Search text
        #[arg(short, long)]
        search: Option<String>,

        /// Print the raw view records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the difficulties of one set, easiest first, with its links
    Show {
        /// Set id as printed by `list`
        set_id: String,

        /// Game mode for the difficulty list
        #[arg(long, value_enum, default_value = "mania")]
        mode: Mode,
    },

    /// Serve the JSON-lines bridge on stdin/stdout
    ///
    /// Each input line is a request such as {"id":1,"op":"get-beatmaps"};
    /// each output line is the matching reply. Logs go to stderr.
    Bridge,

    /// Write the file behind an osumusic:// URL to stdout
    Asset {
        /// URL of the form osumusic://<percent-encoded path>
        url: String,
    },

    /// Print the osumusic:// URL for a file path
    Url {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,
    },

    /// Open a set in the web browser
    Open {
        /// Set id as printed by `list`
        set_id: String,

        /// Open in the installed osu! client instead of the browser
        #[arg(long)]
        client: bool,
    },

    /// Generate shell completions
    ///
    /// Usage: osumusic completion bash > ~/.local/share/bash-completion/completions/osumusic
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}
