//! Read-only access to the osu! document store.
//!
//! The store is an SQLite file with a single `objects(class, body)` table,
//! one JSON document per object with its links inlined. The reader never
//! writes: the connection is opened with `SQLITE_OPEN_READ_ONLY` and the set
//! filter runs inside SQLite's JSON functions.

use log::{debug, info, warn};
use rayon::prelude::*;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use crate::assets::ContentStore;
use crate::config::RuntimeConfig;
use crate::error::LibraryError;
use crate::model::BeatmapSet;
use crate::record;

/// Live, non-deleted sets with at least one difficulty. `CASE` guards the
/// JSON functions so a row with a corrupt body is filtered out instead of
/// failing the whole statement.
const SELECT_SETS: &str = "SELECT body FROM objects
    WHERE class = 'BeatmapSet'
      AND CASE WHEN json_valid(body) THEN
            COALESCE(json_extract(body, '$.DeletePending'), 0) = 0
            AND COALESCE(json_array_length(body, '$.Beatmaps'), 0) > 0
          ELSE 0 END
    ORDER BY rowid";

/// Probe run at open time so a corrupt or foreign file fails there.
const PROBE_SCHEMA: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'objects'";

/// Owner of the database handle for the life of the process.
#[derive(Debug)]
pub struct LibraryReader {
    path: PathBuf,
    store: ContentStore,
    conn: Option<Connection>,
}

impl LibraryReader {
    /// A closed reader for the database at `path`, resolving assets against
    /// `store`.
    pub fn new(path: impl Into<PathBuf>, store: ContentStore) -> Self {
        Self {
            path: path.into(),
            store,
            conn: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Open the database read-only. A second call on an open reader does
    /// nothing.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::NotFound`] when no file exists at the path
    /// - [`LibraryError::Open`] when the file exists but is not a usable store
    pub fn open(&mut self) -> Result<(), LibraryError> {
        if self.conn.is_some() {
            debug!("Library already open: {}", self.path.display());
            return Ok(());
        }

        if !self.path.is_file() {
            return Err(LibraryError::NotFound(self.path.clone()));
        }

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| LibraryError::Open {
            path: self.path.clone(),
            source: e.into(),
        })?;

        // SQLite opens lazily; touch the schema now so a bad file is an
        // open error rather than a query error later.
        let tables: i64 = conn
            .query_row(PROBE_SCHEMA, [], |row| row.get(0))
            .map_err(|e| LibraryError::Open {
                path: self.path.clone(),
                source: e.into(),
            })?;
        if tables == 0 {
            return Err(LibraryError::Open {
                path: self.path.clone(),
                source: "no 'objects' table; not an osu! document store".into(),
            });
        }

        info!("Opened osu! library at {}", self.path.display());
        self.conn = Some(conn);
        Ok(())
    }

    /// Every live set, flattened into view records in store order.
    ///
    /// # Errors
    ///
    /// [`LibraryError::NotOpen`] before a successful [`Self::open`], or
    /// [`LibraryError::Query`] if SQLite rejects the statement. Individual
    /// malformed records never error; they are skipped or defaulted.
    pub fn beatmap_sets(&self) -> Result<Vec<BeatmapSet>, LibraryError> {
        let conn = self.conn.as_ref().ok_or(LibraryError::NotOpen)?;

        let mut stmt = conn.prepare_cached(SELECT_SETS)?;
        let bodies = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Query matched {} set records", bodies.len());

        let store = &self.store;
        let sets: Vec<BeatmapSet> = bodies
            .par_iter()
            .filter_map(|body| match serde_json::from_str(body) {
                Ok(value) => record::flatten_set(&value, store),
                Err(e) => {
                    warn!("Skipping unreadable set record: {e}");
                    None
                }
            })
            .collect();

        debug!("Flattened {} beatmap sets", sets.len());
        Ok(sets)
    }

    /// Release the handle. Safe on a reader that was never opened.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                warn!("Error while closing osu! library: {e}");
            }
            info!("Closed osu! library");
        }
    }
}

/// Build the reader described by `config` and try to open it.
///
/// A missing or unreadable database is logged and the reader is returned
/// closed; callers then see an empty library instead of failing to start.
pub fn open_library(config: &RuntimeConfig) -> LibraryReader {
    let mut reader = LibraryReader::new(config.database_path(), ContentStore::new(config.osu_dir()));
    match reader.open() {
        Ok(()) => {}
        Err(e @ LibraryError::NotFound(_)) => {
            warn!("{e}; is osu! installed? Continuing with an empty library");
        }
        Err(e) => {
            warn!("{e}; continuing with an empty library");
        }
    }
    reader
}

impl Drop for LibraryReader {
    fn drop(&mut self) {
        self.close();
    }
}
