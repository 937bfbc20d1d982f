//! Music player over a local osu! library.
//!
//! osumusic reads the osu! client's document store read-only, flattens every
//! beatmap set into a small view model, and resolves each set's audio and
//! artwork to files in the client's content-addressed store.
//!
//! Core modules:
//! - [`db`] - Read-only library reader
//! - [`record`] - Defensive flattening of raw records
//! - [`assets`] - Hash to `files/a/ab/abc…` path resolution
//! - [`bridge`] - JSON-lines request/response bridge for front ends
//! - [`scheme`] - The `osumusic://` asset URL scheme
//!
//! ### Supporting Modules
//!
//! - [`browser`] - Selection, search and difficulty picking
//! - [`links`] - Web and client link targets
//! - [`config`] - Location of the osu! data directory
//! - [`cli`] / [`completion`] - Command line and shell completions
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use osumusic::{bridge::Bridge, config::RuntimeConfig, db};
//!
//! let config = RuntimeConfig::new()?;
//! let bridge = Bridge::new(db::open_library(&config));
//!
//! for set in bridge.get_beatmaps() {
//!     println!("{} ({} difficulties)", set.display_name(), set.beatmaps.len());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Library operations return the structured errors in [`error`]. The bridge
//! never surfaces them: a failed read is logged and answered with an empty
//! list, so a missing or broken database degrades to an empty library.

pub mod assets;
pub mod bridge;
pub mod browser;
pub mod cli;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod links;
pub mod model;
pub mod record;
pub mod scheme;
