//! # Configuration Module
//!
//! Locates the osu! data directory and the files osumusic reads from it.
//! Nothing here creates directories: the osu! client owns that tree and we only
//! ever read it.
//!
//! ## Data Location
//!
//! osu! keeps its data in the platform-standard data directory:
//! - Linux: `~/.local/share/osu/`
//! - macOS: `~/Library/Application Support/osu/`
//! - Windows: `%APPDATA%\osu\`
//!
//! Inside it, `client.realm.sqlite` is the document store the library is read
//! from and `files/` is the content-addressed blob store.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the document store inside the osu! directory.
pub const DATABASE_FILENAME: &str = "client.realm.sqlite";

/// Name of the content-addressed blob directory inside the osu! directory.
pub const FILES_DIRNAME: &str = "files";

/// Returns the platform-appropriate osu! data directory.
///
/// # Platform Behavior
///
/// - **Linux**: `~/.local/share/osu`
/// - **macOS**: `~/Library/Application Support/osu`
/// - **Windows**: `%APPDATA%\osu`
///
/// # Errors
///
/// Fails only when the platform data directory cannot be determined (no home
/// directory, unsupported platform). The directory is not required to exist.
///
/// # Examples
///
/// ```no_run
/// use osumusic::config::default_osu_dir;
///
/// let osu_dir = default_osu_dir()?;
/// println!("osu! data: {}", osu_dir.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn default_osu_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow!(
            "Could not determine system data directory. Pass --osu-dir or set OSUMUSIC_OSU_DIR."
        )
    })?;

    Ok(data_dir.join("osu"))
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Root of the osu! data directory
    pub osu_dir: PathBuf,
    /// Explicit database file; `None` means `<osu_dir>/client.realm.sqlite`
    pub database_file: Option<PathBuf>,
    /// Refuse to serve assets outside `<osu_dir>/files`
    pub confine_assets: bool,
}

impl RuntimeConfig {
    /// Configuration rooted at the platform default osu! directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_osu_dir(default_osu_dir()?))
    }

    /// Configuration rooted at an explicit osu! directory.
    pub fn with_osu_dir(osu_dir: impl Into<PathBuf>) -> Self {
        Self {
            osu_dir: osu_dir.into(),
            database_file: None,
            confine_assets: false,
        }
    }

    #[must_use]
    pub fn database_file(mut self, path: Option<PathBuf>) -> Self {
        self.database_file = path;
        self
    }

    #[must_use]
    pub fn confine_assets(mut self, confine: bool) -> Self {
        self.confine_assets = confine;
        self
    }

    /// Path of the document store to open.
    pub fn database_path(&self) -> PathBuf {
        match &self.database_file {
            Some(path) => path.clone(),
            None => self.osu_dir.join(DATABASE_FILENAME),
        }
    }

    /// Base directory of the content store.
    pub fn osu_dir(&self) -> &Path {
        &self.osu_dir
    }

    /// The `files/` directory holding the sharded blobs.
    pub fn files_dir(&self) -> PathBuf {
        self.osu_dir.join(FILES_DIRNAME)
    }
}
