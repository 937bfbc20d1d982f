//! The `osumusic://` asset scheme.
//!
//! Presentation code refers to local audio and artwork as
//! `osumusic://<percent-encoded absolute path>`; this module turns such a URL
//! back into a path and its bytes.
//!
//! By default any path is served verbatim: the URLs are only ever built by
//! osumusic itself from resolved content-store paths. With confinement on,
//! the decoded path must sit inside the store's `files/` directory.

use log::debug;
use path_absolutize::Absolutize;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::ContentStore;
use crate::error::AssetError;

pub const SCHEME: &str = "osumusic";

/// Asset URL for a local path.
pub fn asset_url(path: impl AsRef<Path>) -> String {
    let path = path.as_ref().to_string_lossy();
    format!("{SCHEME}://{}", urlencoding::encode(&path))
}

/// Resolver for asset URLs.
#[derive(Debug, Clone)]
pub struct AssetScheme {
    root: Option<PathBuf>,
}

impl AssetScheme {
    /// Serves any path.
    pub fn unrestricted() -> Self {
        Self { root: None }
    }

    /// Serves only paths inside `store`'s `files/` directory.
    pub fn confined(store: &ContentStore) -> Self {
        Self {
            root: Some(store.files_dir()),
        }
    }

    pub fn is_confined(&self) -> bool {
        self.root.is_some()
    }

    /// Filesystem path named by `url`.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, AssetError> {
        let encoded = url
            .strip_prefix(SCHEME)
            .and_then(|rest| rest.strip_prefix("://"))
            .ok_or_else(|| AssetError::UnknownScheme(url.to_string()))?;
        let decoded = urlencoding::decode(encoded).map_err(|e| AssetError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let path = PathBuf::from(decoded.into_owned());

        if let Some(root) = &self.root {
            let candidate = absolute(&path);
            if !candidate.starts_with(&*absolute(root)) {
                return Err(AssetError::OutsideStore(path));
            }
        }

        Ok(path)
    }

    /// Bytes of the file named by `url`.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.resolve(url)?;
        debug!("Serving asset {}", path.display());
        fs::read(&path).map_err(|source| AssetError::Io { path, source })
    }
}

// `..` segments are collapsed lexically, so a confined check cannot be
// escaped through a traversal that points at a missing file.
fn absolute(path: &Path) -> Cow<'_, Path> {
    path.absolutize().unwrap_or(Cow::Borrowed(path))
}
