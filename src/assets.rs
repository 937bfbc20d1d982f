//! Content-addressed asset lookup.
//!
//! osu! stores every blob under `files/<h[0]>/<h[0..2]>/<hash>`. The prefix
//! lengths are fixed by the client's on-disk layout; any other split points at
//! files that do not exist.

use std::path::PathBuf;

use crate::config::FILES_DIRNAME;

/// Shortest hash we attempt to resolve.
pub const MIN_HASH_LEN: usize = 3;

/// The blob store rooted at the osu! data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStore {
    base: PathBuf,
}

impl ContentStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn files_dir(&self) -> PathBuf {
        self.base.join(FILES_DIRNAME)
    }

    /// Sharded path of the blob with this hash, `None` for hashes shorter than
    /// [`MIN_HASH_LEN`].
    pub fn path_for(&self, hash: &str) -> Option<PathBuf> {
        if hash.chars().count() < MIN_HASH_LEN {
            return None;
        }
        let p1: String = hash.chars().take(1).collect();
        let p2: String = hash.chars().take(2).collect();

        Some(self.files_dir().join(p1).join(p2).join(hash))
    }

    /// View-model form of [`Self::path_for`]: an absent or unusable hash
    /// yields the empty string.
    pub fn resolve(&self, hash: Option<&str>) -> String {
        hash.and_then(|h| self.path_for(h))
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
