//! Error types for osumusic
//!
//! Library code returns these structured errors; the binary and the bridge
//! wrap or swallow them with `anyhow` context. Every variant names the path or
//! URL involved so the log line alone is actionable.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the library reader.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The database file does not exist at the expected location
    #[error("osu! database not found at {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be opened as a document store
    #[error("failed to open osu! database at {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A query was attempted before `open` succeeded
    #[error("osu! database is not open")]
    NotOpen,

    /// The listing query itself failed
    #[error("beatmap query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Failures of the `osumusic://` asset scheme.
#[derive(Error, Debug)]
pub enum AssetError {
    /// URL does not start with the private scheme
    #[error("not an asset URL: '{0}'")]
    UnknownScheme(String),

    /// Percent-decoding produced invalid UTF-8
    #[error("could not decode asset URL '{url}': {reason}")]
    Decode { url: String, reason: String },

    /// Confined mode is on and the path escapes the content store
    #[error("asset {} is outside the content store", .0.display())]
    OutsideStore(PathBuf),

    /// Reading the file failed
    #[error("failed to read asset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while decoding a bridge request line.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Line is not a valid request object
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `op` is not one of the known operations
    #[error("unknown operation '{0}'")]
    UnknownOp(String),

    /// A required argument is absent
    #[error("operation '{op}' requires '{arg}'")]
    MissingArgument { op: String, arg: &'static str },
}
